use fluxgen::{
    AspectRatio, GenerationClient, GenerationRequest, Megapixels, OutputFormat, ReplicateClient,
    ReplicateConfig,
};
use std::env;

const DEMO_PROMPT: &str =
    "black forest gateau cake spelling out the words \"FLUX DEV\", tasty, food photography, dynamic shot";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    fluxgen::logger::init_with_config(
        fluxgen::logger::LoggerConfig::development()
            .with_level(fluxgen::logger::LogLevel::Debug),
    )?;

    log::info!("🔍 Checking Replicate environment...");

    match env::var("REPLICATE_API_TOKEN") {
        Ok(token) => {
            log::info!("✅ Replicate API token found in environment");
            log::debug!("Token starts with: {}...", &token[..5.min(token.len())]);
        }
        Err(_) => {
            log::warn!("⚠️  REPLICATE_API_TOKEN not set, trying REPLICATE_API_KEY");
        }
    }

    log::info!("🔄 Creating Replicate client...");
    let client = match ReplicateClient::new(ReplicateConfig::from_env()) {
        Ok(client) => {
            log::info!("✅ Replicate client initialized successfully");
            client
        }
        Err(e) => {
            log::error!("❌ Failed to initialize Replicate client: {}", e);
            return Err(e.into());
        }
    };

    log::info!("🖼️  Available image generation models:");
    for (id, name, provider) in GenerationClient::supported_models() {
        log::info!("  {} - {} ({})", id, name, provider);
    }

    log::info!("🎨 Generating images...");

    let request = GenerationRequest::new(DEMO_PROMPT)
        .with_aspect_ratio(AspectRatio::Square)
        .with_num_outputs(2)
        .with_steps(28)
        .with_guidance(3.0)
        .with_output_format(OutputFormat::Webp)
        .with_output_quality(80)
        .with_go_fast(true)
        .with_megapixels(Megapixels::Full);

    let slots = {
        let _timer = fluxgen::logger::timer("image generation");
        client.generate_images(request).await
    };

    for (index, slot) in slots.iter().enumerate() {
        match slot {
            Some(path) => log::info!("🖼️  Slot {}: {}", index + 1, path.display()),
            None => log::info!("⬜ Slot {}: empty", index + 1),
        }
    }

    let removed = client.store().cleanup();
    log::info!("🧹 Removed {} temporary file(s)", removed);
    log::info!("🎉 Done!");

    Ok(())
}
