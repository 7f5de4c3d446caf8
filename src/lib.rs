pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod replicate;
pub mod storage;

pub use config::ReplicateConfig;
pub use error::{ReplicateError, Result};
pub use models::*;
pub use replicate::{
    GenerationClient, ImageSlots, Materializer, ReplicateClient, OUTPUT_SLOTS,
};
pub use storage::TempImageStore;
