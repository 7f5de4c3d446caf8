use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded | PredictionStatus::Failed | PredictionStatus::Canceled
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictionUrls {
    #[serde(default)]
    pub get: Option<String>,
}

/// One unit of remote work as reported by the predictions endpoint.
///
/// `output` is kept as free-form JSON: depending on the model it is a single
/// URL string, an array of URL strings, or an object wrapping either.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
}

impl Prediction {
    /// Collect the image URLs from `output` in generation order.
    pub fn output_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        if let Some(output) = &self.output {
            collect_urls(output, &mut urls);
        }
        urls
    }

    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(value) => value.to_string(),
            None => format!("prediction {} ended without an error message", self.id),
        }
    }
}

fn collect_urls(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(url) => {
            let trimmed = url.trim();
            if trimmed.starts_with("http") && !out.iter().any(|existing| existing == trimmed) {
                out.push(trimmed.to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_urls(item, out);
            }
        }
        Value::Object(object) => {
            for key in ["url", "urls", "output"] {
                if let Some(inner) = object.get(key) {
                    collect_urls(inner, out);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_prediction() {
        let prediction: Prediction = serde_json::from_value(json!({
            "id": "p1",
            "status": "succeeded",
            "output": ["https://replicate.delivery/a.webp", "https://replicate.delivery/b.webp"],
            "error": null,
            "urls": { "get": "https://api.replicate.com/v1/predictions/p1" }
        }))
        .unwrap();

        assert_eq!(prediction.status, PredictionStatus::Succeeded);
        assert!(prediction.status.is_terminal());
        assert_eq!(
            prediction.output_urls(),
            vec![
                "https://replicate.delivery/a.webp".to_string(),
                "https://replicate.delivery/b.webp".to_string(),
            ]
        );
    }

    #[test]
    fn test_output_urls_from_string_and_nested_object() {
        let prediction: Prediction = serde_json::from_value(json!({
            "id": "p2",
            "status": "succeeded",
            "output": { "url": "https://replicate.delivery/only.webp" }
        }))
        .unwrap();
        assert_eq!(
            prediction.output_urls(),
            vec!["https://replicate.delivery/only.webp".to_string()]
        );
    }

    #[test]
    fn test_output_urls_ignores_non_urls_and_duplicates() {
        let prediction: Prediction = serde_json::from_value(json!({
            "id": "p3",
            "status": "succeeded",
            "output": ["https://x/1.png", "https://x/1.png", "not-a-url", 7]
        }))
        .unwrap();
        assert_eq!(prediction.output_urls(), vec!["https://x/1.png".to_string()]);
    }

    #[test]
    fn test_error_message() {
        let prediction: Prediction = serde_json::from_value(json!({
            "id": "p4",
            "status": "failed",
            "error": "NSFW content detected"
        }))
        .unwrap();
        assert_eq!(prediction.error_message(), "NSFW content detected");

        let prediction: Prediction = serde_json::from_value(json!({
            "id": "p5",
            "status": "canceled"
        }))
        .unwrap();
        assert!(prediction.error_message().contains("p5"));
    }

    #[test]
    fn test_non_terminal_statuses() {
        for status in ["starting", "processing"] {
            let prediction: Prediction = serde_json::from_value(json!({
                "id": "p6",
                "status": status
            }))
            .unwrap();
            assert!(!prediction.status.is_terminal());
        }
    }
}
