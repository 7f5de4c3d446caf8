use std::env;

#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    pub api_token: Option<String>,
    pub api_base: Option<String>,
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        ReplicateConfig {
            api_token: None,
            api_base: None,
        }
    }
}

impl ReplicateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_token = env::var("REPLICATE_API_TOKEN")
            .ok()
            .or_else(|| env::var("REPLICATE_API_KEY").ok())
            .filter(|token| !token.trim().is_empty());
        let api_base = env::var("REPLICATE_API_BASE")
            .ok()
            .filter(|base| !base.trim().is_empty());

        ReplicateConfig {
            api_token,
            api_base,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }
}
