use crate::{
    error::{ReplicateError, Result},
    models::OutputFormat,
    storage::TempImageStore,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::{Client, StatusCode};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// The presentation contract is four display slots, always.
pub const OUTPUT_SLOTS: usize = 4;

/// Local file path per slot, `None` for an empty slot.
pub type ImageSlots = [Option<PathBuf>; OUTPUT_SLOTS];

#[derive(Clone)]
pub struct Materializer {
    http: Client,
    store: Arc<TempImageStore>,
}

impl Materializer {
    pub fn new(http: Client, store: Arc<TempImageStore>) -> Self {
        Self { http, store }
    }

    /// Download each URL, round-trip the bytes through an inline data URI,
    /// and persist them to a uniquely named `.png` temp file. Any per-URL
    /// failure (non-200 fetch, decode, write) is logged and becomes an empty
    /// slot; the other slots are unaffected. The result is always exactly
    /// four slots, whatever the input length.
    pub async fn materialize(&self, urls: &[String], format: OutputFormat) -> ImageSlots {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            let slot = match self.download(url).await {
                Some(bytes) => {
                    let data_uri = to_data_uri(&bytes, format);
                    match self.persist_data_uri(&data_uri) {
                        Ok(path) => {
                            log::debug!("Materialized {} as {}", url, path.display());
                            Some(path)
                        }
                        Err(e) => {
                            log::error!("Error creating temp file: {}", e);
                            None
                        }
                    }
                }
                None => None,
            };
            results.push(slot);
        }
        shape_slots(results)
    }

    /// Fetch one URL's bytes. Success is exactly status 200.
    async fn download(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Image download failed for {}: {}", url, e);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            log::warn!(
                "Image download for {} returned status {}",
                url,
                response.status()
            );
            return None;
        }

        match response.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                log::warn!("Failed reading image bytes from {}: {}", url, e);
                None
            }
        }
    }

    /// Split off the data-URI header, base64-decode the remainder, and write
    /// the bytes to a fresh temp file. The file keeps a `.png` suffix
    /// independent of the true format.
    fn persist_data_uri(&self, data_uri: &str) -> Result<PathBuf> {
        let payload = data_uri
            .split_once(',')
            .map(|(_, payload)| payload)
            .ok_or_else(|| ReplicateError::StorageError("malformed data URI".into()))?;

        let bytes = BASE64
            .decode(payload)
            .map_err(|e| ReplicateError::StorageError(e.to_string()))?;

        let mut file = tempfile::Builder::new()
            .prefix("fluxgen-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ReplicateError::StorageError(e.to_string()))?;
        file.write_all(&bytes)
            .map_err(|e| ReplicateError::StorageError(e.to_string()))?;

        let (_, path) = file
            .keep()
            .map_err(|e| ReplicateError::StorageError(e.to_string()))?;

        self.store.register(path.clone());
        Ok(path)
    }
}

/// Wrap raw image bytes as an inline base64 data URI. The media type follows
/// the requested output format; with none requested the remote default
/// (webp) applies.
pub fn to_data_uri(bytes: &[u8], format: OutputFormat) -> String {
    format!("data:{};base64,{}", format.mime(), BASE64.encode(bytes))
}

/// Pad with empty slots to four, then keep only the first four.
pub fn shape_slots(mut results: Vec<Option<PathBuf>>) -> ImageSlots {
    results.truncate(OUTPUT_SLOTS);
    while results.len() < OUTPUT_SLOTS {
        results.push(None);
    }

    let mut slots: ImageSlots = [None, None, None, None];
    for (slot, result) in slots.iter_mut().zip(results) {
        *slot = result;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3];

    fn materializer() -> (Materializer, Arc<TempImageStore>) {
        let store = Arc::new(TempImageStore::new());
        (
            Materializer::new(Client::new(), Arc::clone(&store)),
            store,
        )
    }

    async fn serve_image(server: &MockServer, route: &str, bytes: &[u8]) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_two_urls_fill_first_two_slots() {
        let server = MockServer::start().await;
        serve_image(&server, "/1.png", PNG_MAGIC).await;
        serve_image(&server, "/2.png", PNG_MAGIC).await;

        let (materializer, store) = materializer();
        let urls = vec![
            format!("{}/1.png", server.uri()),
            format!("{}/2.png", server.uri()),
        ];
        let slots = materializer
            .materialize(&urls, OutputFormat::default())
            .await;

        assert!(slots[0].is_some());
        assert!(slots[1].is_some());
        assert!(slots[2].is_none());
        assert!(slots[3].is_none());
        assert_eq!(store.cleanup(), 2);
    }

    #[tokio::test]
    async fn test_output_is_always_four_slots() {
        let server = MockServer::start().await;
        for index in 0..6 {
            serve_image(&server, &format!("/{}.png", index), PNG_MAGIC).await;
        }
        let (materializer, store) = materializer();

        for count in [0usize, 1, 2, 4, 6] {
            let urls: Vec<String> = (0..count)
                .map(|index| format!("{}/{}.png", server.uri(), index))
                .collect();
            let slots = materializer
                .materialize(&urls, OutputFormat::default())
                .await;
            assert_eq!(slots.len(), OUTPUT_SLOTS);
            let filled = slots.iter().filter(|slot| slot.is_some()).count();
            assert_eq!(filled, count.min(OUTPUT_SLOTS));
        }

        store.cleanup();
    }

    #[tokio::test]
    async fn test_urls_beyond_four_are_dropped() {
        let server = MockServer::start().await;
        for index in 0..5 {
            serve_image(&server, &format!("/{}.png", index), PNG_MAGIC).await;
        }

        let (materializer, store) = materializer();
        let urls: Vec<String> = (0..5)
            .map(|index| format!("{}/{}.png", server.uri(), index))
            .collect();
        let slots = materializer
            .materialize(&urls, OutputFormat::default())
            .await;

        assert!(slots.iter().all(|slot| slot.is_some()));
        // The fifth file was downloaded before shaping, so five are tracked.
        assert_eq!(store.tracked().len(), 5);
        store.cleanup();
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_other_slots_alone() {
        let server = MockServer::start().await;
        serve_image(&server, "/ok1.png", PNG_MAGIC).await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        serve_image(&server, "/ok2.png", PNG_MAGIC).await;

        let (materializer, store) = materializer();
        let urls = vec![
            format!("{}/ok1.png", server.uri()),
            format!("{}/missing.png", server.uri()),
            format!("{}/ok2.png", server.uri()),
        ];
        let slots = materializer
            .materialize(&urls, OutputFormat::default())
            .await;

        assert!(slots[0].is_some());
        assert!(slots[1].is_none());
        assert!(slots[2].is_some());
        assert!(slots[3].is_none());
        store.cleanup();
    }

    #[tokio::test]
    async fn test_round_trip_preserves_bytes() {
        let server = MockServer::start().await;
        serve_image(&server, "/image.png", PNG_MAGIC).await;

        let (materializer, store) = materializer();
        let urls = vec![format!("{}/image.png", server.uri())];
        let slots = materializer.materialize(&urls, OutputFormat::Png).await;

        let written = fs::read(slots[0].as_ref().unwrap()).unwrap();
        assert_eq!(written, PNG_MAGIC);
        store.cleanup();
    }

    #[tokio::test]
    async fn test_persisted_files_use_png_suffix() {
        let server = MockServer::start().await;
        serve_image(&server, "/image.webp", PNG_MAGIC).await;

        let (materializer, store) = materializer();
        let urls = vec![format!("{}/image.webp", server.uri())];
        let slots = materializer.materialize(&urls, OutputFormat::Webp).await;

        let path = slots[0].as_ref().unwrap();
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("png"));
        store.cleanup();
    }

    #[test]
    fn test_data_uri_label_follows_output_format() {
        assert!(to_data_uri(b"x", OutputFormat::Webp).starts_with("data:image/webp;base64,"));
        assert!(to_data_uri(b"x", OutputFormat::Jpg).starts_with("data:image/jpeg;base64,"));
        assert!(to_data_uri(b"x", OutputFormat::Png).starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_persist_rejects_malformed_data_uri() {
        let (materializer, _store) = materializer();
        assert!(materializer.persist_data_uri("no comma here").is_err());
        assert!(materializer
            .persist_data_uri("data:image/png;base64,!!!not-base64!!!")
            .is_err());
    }

    #[test]
    fn test_shape_slots_pads_and_truncates() {
        assert_eq!(shape_slots(Vec::new()), [None, None, None, None]);

        let one = shape_slots(vec![Some(PathBuf::from("/tmp/a.png"))]);
        assert_eq!(one[0].as_deref(), Some(std::path::Path::new("/tmp/a.png")));
        assert!(one[1..].iter().all(|slot| slot.is_none()));

        let five = shape_slots(vec![
            Some(PathBuf::from("/tmp/1.png")),
            None,
            Some(PathBuf::from("/tmp/3.png")),
            Some(PathBuf::from("/tmp/4.png")),
            Some(PathBuf::from("/tmp/5.png")),
        ]);
        assert_eq!(five.len(), OUTPUT_SLOTS);
        assert_eq!(
            five[3].as_deref(),
            Some(std::path::Path::new("/tmp/4.png"))
        );
    }
}
