//! Preload pipeline
//!
//! Keeps at most one warmed-up "next" media resource alive. Preloading is
//! a best-effort optimization: nothing here has a failure path back into
//! the playback controller.

use std::path::PathBuf;

use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::playback::playlist::{MediaItem, Playlist};

/// Resource manager the preloader replaces handles through
pub trait PreloadBackend: Send {
    type Handle: Send;

    /// Start warming `item` in the background
    fn create(&mut self, item: &MediaItem) -> Self::Handle;

    /// Release a previously created handle
    fn release(&mut self, handle: Self::Handle);
}

struct PreloadSlot<H> {
    handle: H,
    index: usize,
}

/// Holds zero-or-one preloaded resource, always for the item following the
/// index it was last refreshed against.
pub struct Preloader<B: PreloadBackend> {
    backend: B,
    slot: Option<PreloadSlot<B::Handle>>,
}

impl<B: PreloadBackend> Preloader<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slot: None,
        }
    }

    /// Point the preload slot at the item after `index`.
    ///
    /// Releases the old handle before creating the new one, so at most one
    /// handle is ever live. Idempotent: repeated calls with the same index
    /// land in an equivalent state.
    pub fn refresh(&mut self, playlist: &Playlist, index: usize) {
        let next = playlist.next_index(index);

        if let Some(slot) = self.slot.take() {
            self.backend.release(slot.handle);
        }

        debug!("preloading [{}] {}", next, playlist.item(next));
        let handle = self.backend.create(playlist.item(next));
        self.slot = Some(PreloadSlot {
            handle,
            index: next,
        });
    }

    /// Index the held handle targets, if any
    pub fn target_index(&self) -> Option<usize> {
        self.slot.as_ref().map(|slot| slot.index)
    }
}

/// Backend that warms the OS page cache by reading the file in the
/// background. Releasing a handle aborts any read still in flight.
pub struct FilePrefetcher;

pub struct PrefetchHandle {
    task: JoinHandle<()>,
}

impl PreloadBackend for FilePrefetcher {
    type Handle = PrefetchHandle;

    fn create(&mut self, item: &MediaItem) -> PrefetchHandle {
        let path = PathBuf::from(item.as_str());
        let task = tokio::spawn(async move {
            match warm(&path).await {
                Ok(bytes) => debug!("prefetched {} ({} bytes)", path.display(), bytes),
                Err(e) => debug!("prefetch of {} failed: {}", path.display(), e),
            }
        });
        PrefetchHandle { task }
    }

    fn release(&mut self, handle: PrefetchHandle) {
        handle.task.abort();
    }
}

async fn warm(path: &std::path::Path) -> std::io::Result<u64> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut total = 0u64;
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        total += n as u64;
    }
    Ok(total)
}
