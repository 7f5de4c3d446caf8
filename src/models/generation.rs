use crate::error::{ReplicateError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const FLUX_DEV: &str = "black-forest-labs/flux-dev";
pub const FLUX_SCHNELL: &str = "black-forest-labs/flux-schnell";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "21:9")]
    Landscape21x9,
    #[serde(rename = "3:2")]
    Landscape3x2,
    #[serde(rename = "2:3")]
    Portrait2x3,
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[serde(rename = "5:4")]
    Landscape5x4,
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "9:21")]
    Portrait9x21,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Landscape21x9 => "21:9",
            AspectRatio::Landscape3x2 => "3:2",
            AspectRatio::Portrait2x3 => "2:3",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Landscape5x4 => "5:4",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Portrait9x21 => "9:21",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Webp,
    Jpg,
    Png,
}

impl Default for OutputFormat {
    fn default() -> Self {
        // The remote service renders webp when no format is requested.
        OutputFormat::Webp
    }
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            OutputFormat::Webp => "image/webp",
            OutputFormat::Jpg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }
}

/// Resolution budget accepted by the FLUX models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Megapixels {
    #[serde(rename = "1")]
    Full,
    #[serde(rename = "0.25")]
    Quarter,
}

impl Megapixels {
    pub fn as_str(&self) -> &'static str {
        match self {
            Megapixels::Full => "1",
            Megapixels::Quarter => "0.25",
        }
    }
}

/// Parameter payload for one generation call.
///
/// Only `prompt` is required; optional fields left unset are omitted from the
/// serialized payload entirely so the remote model's own defaults apply.
/// The prompt is passed through as given, empty strings included. `model_id`
/// selects the target model and never appears in the wire payload.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    #[serde(skip_serializing)]
    pub model_id: Option<String>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_outputs: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_steps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_quality: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_safety_checker: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_fast: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub megapixels: Option<Megapixels>,
}

impl GenerationRequest {
    /// Request against the fully tunable flux-dev model.
    pub fn new(prompt: impl Into<String>) -> Self {
        GenerationRequest {
            model_id: Some(FLUX_DEV.to_string()),
            prompt: prompt.into(),
            aspect_ratio: None,
            image: None,
            prompt_strength: None,
            num_outputs: None,
            num_inference_steps: None,
            guidance: None,
            seed: None,
            output_format: None,
            output_quality: None,
            disable_safety_checker: None,
            go_fast: None,
            megapixels: None,
        }
    }

    /// Request against flux-schnell, the fast variant with few exposed knobs.
    pub fn schnell(prompt: impl Into<String>) -> Self {
        let mut request = Self::new(prompt);
        request.model_id = Some(FLUX_SCHNELL.to_string());
        request
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: AspectRatio) -> Self {
        self.aspect_ratio = Some(aspect_ratio);
        self
    }

    /// Image reference for image-conditioned generation: a URL or a data URI.
    /// For local files see [`encode_image_file`].
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_prompt_strength(mut self, prompt_strength: f32) -> Self {
        self.prompt_strength = Some(prompt_strength);
        self
    }

    pub fn with_num_outputs(mut self, num_outputs: u8) -> Self {
        self.num_outputs = Some(num_outputs);
        self
    }

    pub fn with_steps(mut self, num_inference_steps: u32) -> Self {
        self.num_inference_steps = Some(num_inference_steps);
        self
    }

    pub fn with_guidance(mut self, guidance: f32) -> Self {
        self.guidance = Some(guidance);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = Some(output_format);
        self
    }

    pub fn with_output_quality(mut self, output_quality: u8) -> Self {
        self.output_quality = Some(output_quality);
        self
    }

    pub fn with_safety_checker_disabled(mut self, disabled: bool) -> Self {
        self.disable_safety_checker = Some(disabled);
        self
    }

    pub fn with_go_fast(mut self, go_fast: bool) -> Self {
        self.go_fast = Some(go_fast);
        self
    }

    pub fn with_megapixels(mut self, megapixels: Megapixels) -> Self {
        self.megapixels = Some(megapixels);
        self
    }
}

/// Read a local image file and wrap it as a base64 data URI suitable for the
/// `image` parameter. The media type is guessed from the file extension.
pub fn encode_image_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|_| {
        ReplicateError::RequestError(format!("Failed to open image file: {}", path.display()))
    })?;

    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    };

    Ok(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
}
