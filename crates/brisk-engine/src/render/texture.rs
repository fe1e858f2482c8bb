//! Texture handles and asynchronous image loading.
//!
//! Decoding runs on a worker thread; the decoded pixels are handed back over a
//! channel and uploaded by the render thread at the next `begin_frame`. Callers
//! hold a [`PendingTexture`] until then.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll, Waker};
use std::thread;

use crate::backend::TextureId;
use crate::error::TextureLoadError;

/// A GPU-resident texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Texture {
    pub(crate) id: TextureId,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Texture {
    #[inline]
    pub fn id(self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn width(self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(self) -> u32 {
        self.height
    }
}

/// Premultiplies straight RGBA8 pixels in place.
pub fn premultiply_rgba8(pixels: &mut [u8]) {
    for px in pixels.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

/// Decoded, premultiplied RGBA8 image waiting for upload.
#[derive(Debug)]
pub(crate) struct DecodedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

fn decode(path: &Path) -> Result<DecodedImage, TextureLoadError> {
    let io = |e: std::io::Error| TextureLoadError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let reader = image::ImageReader::open(path)
        .map_err(io)?
        .with_guessed_format()
        .map_err(io)?;

    let image = reader.decode().map_err(|e| match e {
        image::ImageError::IoError(e) => io(e),
        other => TextureLoadError::Decode {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    })?;

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixels = rgba.into_raw();
    premultiply_rgba8(&mut pixels);

    Ok(DecodedImage {
        path: path.to_path_buf(),
        width,
        height,
        pixels,
    })
}

#[derive(Debug)]
enum LoadState {
    Loading(Option<Waker>),
    Done(Result<Texture, TextureLoadError>),
    Taken,
}

#[derive(Debug, Clone)]
pub(crate) struct LoadSlot(Arc<Mutex<LoadState>>);

impl LoadSlot {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(LoadState::Loading(None))))
    }

    fn lock(&self) -> MutexGuard<'_, LoadState> {
        // The state is a plain enum; a panic elsewhere cannot leave it half-written.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn complete(&self, result: Result<Texture, TextureLoadError>) {
        let waker = match std::mem::replace(&mut *self.lock(), LoadState::Done(result)) {
            LoadState::Loading(waker) => waker,
            _ => None,
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    fn is_loading(&self) -> bool {
        matches!(*self.lock(), LoadState::Loading(_))
    }
}

/// Write side of one load.
///
/// Dropping it before [`complete`](Self::complete) resolves the load as
/// [`TextureLoadError::Abandoned`], including results still queued when the
/// loader is dropped.
#[derive(Debug)]
pub(crate) struct Completion {
    slot: LoadSlot,
    path: PathBuf,
}

impl Completion {
    pub(crate) fn complete(self, result: Result<Texture, TextureLoadError>) {
        self.slot.complete(result);
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.slot.is_loading() {
            let path = std::mem::take(&mut self.path);
            self.slot.complete(Err(TextureLoadError::Abandoned { path }));
        }
    }
}

/// Completion signal of [`Renderer::load_texture`](super::Renderer::load_texture).
///
/// Resolves once the image is decoded and uploaded, which happens at the first
/// `begin_frame` after decoding finishes. Await it, or poll with [`try_take`](Self::try_take).
#[derive(Debug)]
pub struct PendingTexture {
    slot: LoadSlot,
}

impl PendingTexture {
    /// Takes the result if the load has finished.
    pub fn try_take(&self) -> Option<Result<Texture, TextureLoadError>> {
        let mut state = self.slot.lock();
        match std::mem::replace(&mut *state, LoadState::Taken) {
            LoadState::Done(result) => Some(result),
            other => {
                *state = other;
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(*self.slot.lock(), LoadState::Done(_))
    }
}

impl Future for PendingTexture {
    type Output = Result<Texture, TextureLoadError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.slot.lock();
        match std::mem::replace(&mut *state, LoadState::Taken) {
            LoadState::Done(result) => Poll::Ready(result),
            LoadState::Loading(_) => {
                *state = LoadState::Loading(Some(cx.waker().clone()));
                Poll::Pending
            }
            LoadState::Taken => panic!("PendingTexture polled after completion"),
        }
    }
}

/// Result of one worker, sent back to the render thread.
#[derive(Debug)]
pub(crate) struct Decoded {
    pub completion: Completion,
    pub result: Result<DecodedImage, TextureLoadError>,
}

/// Spawns decode workers and collects their results.
#[derive(Debug)]
pub(crate) struct TextureLoader {
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
}

impl TextureLoader {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub(crate) fn load(&self, path: &Path) -> PendingTexture {
        let slot = LoadSlot::new();
        let pending = PendingTexture { slot: slot.clone() };
        let tx = self.tx.clone();
        let path = path.to_path_buf();
        let completion = Completion {
            slot: slot.clone(),
            path: path.clone(),
        };

        log::debug!("decoding texture {}", path.display());
        let spawned = thread::Builder::new()
            .name("texture-decode".into())
            .spawn({
                let path = path.clone();
                move || {
                    let result = decode(&path);
                    // A closed channel hands the result back; dropping it abandons the load.
                    let _ = tx.send(Decoded { completion, result });
                }
            });

        if let Err(e) = spawned {
            slot.complete(Err(TextureLoadError::Io {
                path,
                message: format!("failed to spawn decode worker: {e}"),
            }));
        }

        pending
    }

    /// Results that arrived since the last call; never blocks.
    pub(crate) fn finished(&self) -> impl Iterator<Item = Decoded> + '_ {
        self.rx.try_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_scales_color_by_alpha() {
        let mut px = [255, 128, 0, 128, 10, 20, 30, 255, 200, 200, 200, 0];
        premultiply_rgba8(&mut px);
        assert_eq!(px, [128, 64, 0, 128, 10, 20, 30, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn try_take_is_none_while_loading() {
        let slot = LoadSlot::new();
        let pending = PendingTexture { slot: slot.clone() };
        assert!(pending.try_take().is_none());
        assert!(!pending.is_finished());

        let tex = Texture {
            id: TextureId(9),
            width: 2,
            height: 2,
        };
        slot.complete(Ok(tex));
        assert!(pending.is_finished());
        assert_eq!(pending.try_take().unwrap().unwrap(), tex);
        assert!(pending.try_take().is_none());
    }

    fn completion_for(path: &str) -> (Completion, PendingTexture) {
        let slot = LoadSlot::new();
        let pending = PendingTexture { slot: slot.clone() };
        let completion = Completion {
            slot,
            path: PathBuf::from(path),
        };
        (completion, pending)
    }

    #[test]
    fn dropped_completion_abandons_the_load() {
        let (completion, pending) = completion_for("a.png");
        drop(completion);
        match pending.try_take() {
            Some(Err(TextureLoadError::Abandoned { path })) => assert_eq!(path, PathBuf::from("a.png")),
            other => panic!("expected Abandoned, got {other:?}"),
        }
    }

    #[test]
    fn completed_load_is_not_overwritten_on_drop() {
        let (completion, pending) = completion_for("b.png");
        let tex = Texture {
            id: TextureId(3),
            width: 1,
            height: 1,
        };
        completion.complete(Ok(tex));
        assert_eq!(pending.try_take().unwrap().unwrap(), tex);
    }

    #[test]
    fn results_queued_when_the_loader_drops_are_abandoned() {
        let loader = TextureLoader::new();
        let (completion, pending) = completion_for("queued.png");
        loader
            .tx
            .send(Decoded {
                completion,
                result: Err(TextureLoadError::Decode {
                    path: PathBuf::from("queued.png"),
                    message: "bad".into(),
                }),
            })
            .unwrap();
        drop(loader);
        assert!(matches!(pending.try_take(), Some(Err(TextureLoadError::Abandoned { .. }))));
    }

    #[test]
    fn results_sent_after_the_loader_drops_are_abandoned() {
        let loader = TextureLoader::new();
        let tx = loader.tx.clone();
        drop(loader);

        let (completion, pending) = completion_for("late.png");
        let err = tx
            .send(Decoded {
                completion,
                result: Err(TextureLoadError::Io {
                    path: PathBuf::from("late.png"),
                    message: "gone".into(),
                }),
            })
            .unwrap_err();
        drop(err);
        assert!(matches!(pending.try_take(), Some(Err(TextureLoadError::Abandoned { .. }))));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = decode(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, TextureLoadError::Io { .. }));
    }
}
