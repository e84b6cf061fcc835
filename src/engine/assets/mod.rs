// Asset management system
//
// Visuals are decoded off the main thread and handed back through
// `VisualSource::poll`. Every request is tagged by the caller so the game can
// tell a player model from a coin without the asset layer knowing either.

mod cache;
mod handle;
mod loader;
mod pending;
mod visual;

pub use cache::VisualCache;
pub use handle::AssetId;
pub use loader::{AssetLoader, AssetType};
pub use pending::PendingLoads;
pub use visual::{SheetLayout, Visual};

use std::sync::Arc;

/// Asset loading errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Failed to load asset: {0}")]
    LoadError(String),

    #[error("Failed to decode {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid animation sidecar {name}: {message}")]
    InvalidSheet { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A finished load, successful or not
#[derive(Debug)]
pub struct LoadOutcome<T> {
    /// Caller-supplied tag from the request
    pub tag: T,
    /// Asset name as requested
    pub name: String,
    pub result: Result<Arc<Visual>, AssetError>,
}

/// Asynchronous source of decoded visuals
pub trait VisualSource<T> {
    /// Queue a load of the named texture
    fn request(&mut self, tag: T, name: &str);

    /// Collect every load that finished since the last poll
    fn poll(&mut self) -> Vec<LoadOutcome<T>>;

    /// Forget all pending loads; their completions are dropped
    fn cancel_all(&mut self);

    /// Number of loads still running
    fn in_flight(&self) -> usize;
}
