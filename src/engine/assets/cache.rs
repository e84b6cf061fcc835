// Shared cache of decoded visuals

use super::{AssetId, Visual};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Decoded visuals keyed by id, shared between loader threads and the game
#[derive(Debug, Clone, Default)]
pub struct VisualCache {
    entries: Arc<Mutex<HashMap<AssetId, Arc<Visual>>>>,
}

impl VisualCache {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking loader thread cannot leave the map half-written, so a
    // poisoned lock is still safe to read.
    fn lock(&self) -> MutexGuard<'_, HashMap<AssetId, Arc<Visual>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, id: AssetId) -> Option<Arc<Visual>> {
        self.lock().get(&id).cloned()
    }

    /// Store a visual, returning the shared copy. An existing entry wins.
    pub fn insert(&self, visual: Visual) -> Arc<Visual> {
        self.lock()
            .entry(visual.id)
            .or_insert_with(|| Arc::new(visual))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn visual(name: &str, size: u32) -> Visual {
        Visual {
            id: AssetId::from_path(name),
            name: name.to_string(),
            image: RgbaImage::new(size, size),
            sheet: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = VisualCache::new();
        assert!(cache.get(AssetId::from_path("coin.png")).is_none());

        cache.insert(visual("coin.png", 2));
        assert!(cache.get(AssetId::from_path("coin.png")).is_some());
        assert!(cache.get(AssetId::from_path("road.png")).is_none());
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = VisualCache::new();
        cache.insert(visual("coin.png", 2));
        let shared = cache.insert(visual("coin.png", 8));

        assert_eq!(shared.width(), 2);
        let stored = cache.get(AssetId::from_path("coin.png")).unwrap();
        assert!(Arc::ptr_eq(&shared, &stored));
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = VisualCache::new();
        let other = cache.clone();
        other.insert(visual("obstacle.png", 1));
        assert!(cache.get(AssetId::from_path("obstacle.png")).is_some());
    }
}
