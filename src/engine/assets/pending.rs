// Background visual loading with cancellation
//
// Each request is stamped with the current generation. `cancel_all` bumps
// the generation; completions carrying an older stamp are dropped on poll,
// so a load that finishes late can never reach a session that has moved on.

use super::{AssetId, AssetLoader, LoadOutcome, Visual, VisualCache, VisualSource};
use log::{debug, error};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

struct Completed<T> {
    generation: u64,
    outcome: LoadOutcome<T>,
}

/// Thread-backed implementation of [`VisualSource`]
pub struct PendingLoads<T> {
    loader: AssetLoader,
    cache: VisualCache,
    generation: u64,
    sender: Sender<Completed<T>>,
    receiver: Receiver<Completed<T>>,
    /// Cache hits, resolved without a worker
    ready: VecDeque<LoadOutcome<T>>,
    in_flight: usize,
}

impl<T: Send + 'static> PendingLoads<T> {
    pub fn new<P: AsRef<Path>>(asset_path: P) -> Self {
        Self::with_cache(AssetLoader::new(asset_path), VisualCache::new())
    }

    pub fn with_cache(loader: AssetLoader, cache: VisualCache) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            loader,
            cache,
            generation: 0,
            sender,
            receiver,
            ready: VecDeque::new(),
            in_flight: 0,
        }
    }
}

impl<T: Send + 'static> VisualSource<T> for PendingLoads<T> {
    fn request(&mut self, tag: T, name: &str) {
        if let Some(visual) = self.cache.get(AssetId::from_path(name)) {
            self.ready.push_back(LoadOutcome {
                tag,
                name: name.to_string(),
                result: Ok(visual),
            });
            return;
        }

        let loader = self.loader.clone();
        let cache = self.cache.clone();
        let sender = self.sender.clone();
        let generation = self.generation;
        let owned_name = name.to_string();

        let spawned = thread::Builder::new()
            .name(format!("load-{}", name))
            .spawn(move || {
                let result = Visual::decode(&loader, &owned_name).map(|v| cache.insert(v));
                // The receiver only disappears with the owner; nothing to report then
                let _ = sender.send(Completed {
                    generation,
                    outcome: LoadOutcome {
                        tag,
                        name: owned_name,
                        result,
                    },
                });
            });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(e) => error!("Failed to start loader thread for {}: {}", name, e),
        }
    }

    fn poll(&mut self) -> Vec<LoadOutcome<T>> {
        let mut finished: Vec<LoadOutcome<T>> = self.ready.drain(..).collect();

        loop {
            match self.receiver.try_recv() {
                Ok(completed) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    if completed.generation != self.generation {
                        debug!(
                            "Discarding cancelled load of {}",
                            completed.outcome.name
                        );
                        continue;
                    }
                    finished.push(completed.outcome);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        finished
    }

    fn cancel_all(&mut self) {
        if self.in_flight > 0 || !self.ready.is_empty() {
            debug!(
                "Cancelling {} running and {} ready loads",
                self.in_flight,
                self.ready.len()
            );
        }
        self.generation += 1;
        self.ready.clear();
    }

    fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::AssetError;
    use image::RgbaImage;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "rusted-runner-pending-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(dir.join("textures")).unwrap();
        RgbaImage::new(2, 2)
            .save(dir.join("textures/coin.png"))
            .unwrap();
        dir
    }

    /// Poll until `count` outcomes arrived and nothing is left running
    fn wait_for(loads: &mut PendingLoads<u32>, count: usize) -> Vec<LoadOutcome<u32>> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outcomes = Vec::new();
        while Instant::now() < deadline {
            outcomes.extend(loads.poll());
            if outcomes.len() >= count && loads.in_flight() == 0 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        outcomes
    }

    #[test]
    fn test_load_completes_with_tag() {
        let dir = scratch_dir("complete");
        let mut loads = PendingLoads::new(&dir);

        loads.request(7, "coin.png");
        let outcomes = wait_for(&mut loads, 1);

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].tag, 7);
        assert!(outcomes[0].result.is_ok());
        assert!(loads.cache.get(AssetId::from_path("coin.png")).is_some());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_asset_reports_error() {
        let dir = scratch_dir("missing");
        let mut loads = PendingLoads::new(&dir);

        loads.request(1, "obstacle.png");
        let outcomes = wait_for(&mut loads, 1);

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            outcomes[0].result,
            Err(AssetError::NotFound(_))
        ));

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_cached_visual_resolves_without_worker() {
        let dir = scratch_dir("cached");
        let mut loads = PendingLoads::new(&dir);

        loads.request(1, "coin.png");
        wait_for(&mut loads, 1);

        loads.request(2, "coin.png");
        assert_eq!(loads.in_flight(), 0);
        let outcomes = loads.poll();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].tag, 2);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_cancelled_loads_are_dropped() {
        let dir = scratch_dir("cancel");
        let mut loads = PendingLoads::new(&dir);

        loads.request(1, "coin.png");
        loads.cancel_all();
        assert_eq!(loads.generation, 1);

        let outcomes = wait_for(&mut loads, 0);
        assert!(outcomes.is_empty());
        assert_eq!(loads.in_flight(), 0);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_cancel_drops_ready_cache_hits() {
        let dir = scratch_dir("cancel-ready");
        let mut loads = PendingLoads::new(&dir);
        loads.request(1, "coin.png");
        wait_for(&mut loads, 1);

        loads.request(2, "coin.png");
        loads.cancel_all();
        assert!(loads.poll().is_empty());

        let _ = std::fs::remove_dir_all(dir);
    }
}
