use crate::{
    error::{ReplicateError, Result},
    models::{GenerationRequest, Prediction, PredictionStatus, FLUX_DEV, FLUX_SCHNELL},
};
use reqwest::Client;
use serde_json::json;
use std::time::{Duration, Instant};

// Polling cadence is fixed; neither knob is exposed in configuration.
const POLL_INTERVAL: Duration = Duration::from_secs(1);
const POLL_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct GenerationClient {
    http: Client,
    api_base: String,
    api_token: String,
}

impl GenerationClient {
    pub fn new(http: Client, api_base: String, api_token: String) -> Self {
        Self {
            http,
            api_base,
            api_token,
        }
    }

    pub fn supported_models() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            (FLUX_DEV, "FLUX.1 [dev]", "Black Forest Labs"),
            (FLUX_SCHNELL, "FLUX.1 [schnell]", "Black Forest Labs"),
        ]
    }

    /// Submit the request to the model's predictions endpoint and block until
    /// the prediction reaches a terminal status. Returns the output image
    /// URLs in generation order; a succeeded prediction with no URLs yields
    /// an empty list, not an error.
    pub async fn generate(&self, request: GenerationRequest) -> Result<Vec<String>> {
        let model_id = request.model_id.as_deref().unwrap_or(FLUX_DEV).to_string();

        let input = serde_json::to_value(&request)
            .map_err(|e| ReplicateError::SerializationError(e.to_string()))?;

        log::info!("Generating image with model: {}", model_id);
        log::debug!("Generation input payload: {}", input);

        let endpoint = format!("{}/models/{}/predictions", self.api_base, model_id);
        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_token)
            .json(&json!({ "input": input }))
            .send()
            .await
            .map_err(|e| ReplicateError::HttpError(e.to_string()))?;

        let mut prediction = Self::parse_prediction(response).await?;
        let started = Instant::now();

        loop {
            match prediction.status {
                PredictionStatus::Succeeded => {
                    let urls = prediction.output_urls();
                    log::info!(
                        "Prediction {} succeeded with {} image URL(s)",
                        prediction.id,
                        urls.len()
                    );
                    return Ok(urls);
                }
                PredictionStatus::Failed | PredictionStatus::Canceled => {
                    return Err(ReplicateError::PredictionError(prediction.error_message()));
                }
                PredictionStatus::Starting | PredictionStatus::Processing => {}
            }

            if started.elapsed() >= POLL_TIMEOUT {
                return Err(ReplicateError::PredictionError(format!(
                    "prediction {} still {:?} after {}s",
                    prediction.id,
                    prediction.status,
                    POLL_TIMEOUT.as_secs()
                )));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
            prediction = self.poll(&prediction).await?;
        }
    }

    async fn poll(&self, prediction: &Prediction) -> Result<Prediction> {
        let poll_url = prediction
            .urls
            .as_ref()
            .and_then(|urls| urls.get.clone())
            .unwrap_or_else(|| format!("{}/predictions/{}", self.api_base, prediction.id));

        log::debug!("Polling prediction {} at {}", prediction.id, poll_url);

        let response = self
            .http
            .get(&poll_url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| ReplicateError::HttpError(e.to_string()))?;

        Self::parse_prediction(response).await
    }

    async fn parse_prediction(response: reqwest::Response) -> Result<Prediction> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReplicateError::ResponseError(format!(
                "prediction request failed ({}): {}",
                status, body
            )));
        }

        response
            .json::<Prediction>()
            .await
            .map_err(|e| ReplicateError::ResponseError(e.to_string()))
    }
}
