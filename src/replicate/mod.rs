pub mod generation_client;
pub mod materializer;

use crate::{
    config::ReplicateConfig,
    error::{ReplicateError, Result},
    models::GenerationRequest,
    storage::TempImageStore,
};
use std::sync::Arc;

pub use generation_client::GenerationClient;
pub use materializer::{ImageSlots, Materializer, OUTPUT_SLOTS};

pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";

#[derive(Clone)]
pub struct ReplicateClient {
    generation_client: GenerationClient,
    materializer: Materializer,
    store: Arc<TempImageStore>,
}

impl ReplicateClient {
    pub fn new(config: ReplicateConfig) -> Result<Self> {
        let api_token = config
            .api_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                ReplicateError::ConfigError("Replicate API token not configured".into())
            })?;

        let api_base = config
            .api_base
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let http = reqwest::Client::new();
        let store = Arc::new(TempImageStore::new());

        Ok(Self {
            generation_client: GenerationClient::new(http.clone(), api_base, api_token),
            materializer: Materializer::new(http, Arc::clone(&store)),
            store,
        })
    }

    pub fn generation(&self) -> &GenerationClient {
        &self.generation_client
    }

    pub fn materializer(&self) -> &Materializer {
        &self.materializer
    }

    pub fn store(&self) -> &Arc<TempImageStore> {
        &self.store
    }

    /// Run the full pipeline: submit the request, wait for the prediction,
    /// download every result URL, and persist each as a local temp file.
    ///
    /// Never returns an error. A failed remote call is logged and yields four
    /// empty slots; per-URL failures empty only their own slot.
    pub async fn generate_images(&self, request: GenerationRequest) -> ImageSlots {
        let format = request.output_format.unwrap_or_default();

        match self.generation_client.generate(request).await {
            Ok(urls) => self.materializer.materialize(&urls, format).await,
            Err(e) => {
                log::error!("Error generating image: {}", e);
                [None, None, None, None]
            }
        }
    }
}
