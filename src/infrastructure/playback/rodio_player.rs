//! Rodio-based player adapter
//!
//! `rodio::OutputStream` is not `Send`, so each prepared player keeps its
//! stream alive on a small output thread and only holds the `Send` handle.
//! Completion is detected by a watcher thread polling the sink.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::debug;

use crate::application::ports::{CompletionListener, MediaPlayer, NativeError};

const COMPLETION_POLL: Duration = Duration::from_millis(50);

/// Output device kept open for the lifetime of a prepared player
struct OutputGuard {
    /// Dropping this ends the output thread, which drops the stream
    _shutdown: std_mpsc::Sender<()>,
    handle: OutputStreamHandle,
}

impl OutputGuard {
    fn open() -> Result<Self, NativeError> {
        let (shutdown_tx, shutdown_rx) = std_mpsc::channel::<()>();
        let (ready_tx, ready_rx) = std_mpsc::channel();

        std::thread::spawn(move || match OutputStream::try_default() {
            Ok((stream, handle)) => {
                let _ = ready_tx.send(Ok(handle));
                // Blocks until every sender is dropped
                let _ = shutdown_rx.recv();
                drop(stream);
            }
            Err(e) => {
                let _ = ready_tx.send(Err(NativeError::Device(e.to_string())));
            }
        });

        let handle = ready_rx
            .recv()
            .map_err(|_| NativeError::Device("Audio output thread exited".into()))??;
        Ok(Self {
            _shutdown: shutdown_tx,
            handle,
        })
    }
}

#[derive(Default)]
struct PlayerInner {
    source: Option<PathBuf>,
    output: Option<OutputGuard>,
    sink: Option<Sink>,
    duration_ms: u64,
    listener: Option<CompletionListener>,
    watching: bool,
    stopped: bool,
    released: bool,
}

impl PlayerInner {
    fn sink(&self) -> Result<&Sink, NativeError> {
        self.sink
            .as_ref()
            .ok_or_else(|| NativeError::IllegalState("player is not prepared".into()))
    }
}

/// Player handle backed by a rodio sink
#[derive(Clone, Default)]
pub struct RodioPlayer {
    inner: Arc<StdMutex<PlayerInner>>,
}

impl RodioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, PlayerInner>, NativeError> {
        self.inner
            .lock()
            .map_err(|_| NativeError::IllegalState("player state poisoned".into()))
    }

    /// Open the output device, decode the source and queue it paused
    fn open_sink(path: &Path) -> Result<(OutputGuard, Sink, u64), NativeError> {
        let file =
            File::open(path).map_err(|e| NativeError::Io(format!("{}: {}", path.display(), e)))?;
        let decoder = Decoder::new(BufReader::new(file))
            .map_err(|e| NativeError::Io(format!("{}: {}", path.display(), e)))?;
        let duration_ms = duration_ms_or_zero(decoder.total_duration(), path);

        let output = OutputGuard::open()?;
        let sink =
            Sink::try_new(&output.handle).map_err(|e| NativeError::Device(e.to_string()))?;
        sink.pause();
        sink.append(decoder);

        Ok((output, sink, duration_ms))
    }

    /// Fire the completion listener once the started sink drains
    fn spawn_completion_watcher(&self) {
        let inner = Arc::clone(&self.inner);
        std::thread::spawn(move || loop {
            std::thread::sleep(COMPLETION_POLL);
            let listener = {
                let Ok(mut state) = inner.lock() else {
                    return;
                };
                if state.released || state.stopped {
                    return;
                }
                let drained = match &state.sink {
                    Some(sink) => sink.empty(),
                    None => return,
                };
                if !drained {
                    continue;
                }
                state.stopped = true;
                state.listener.take()
            };
            if let Some(listener) = listener {
                listener();
            }
            return;
        });
    }
}

#[async_trait]
impl MediaPlayer for RodioPlayer {
    fn set_data_source(&self, path: &Path) -> Result<(), NativeError> {
        File::open(path).map_err(|e| NativeError::Io(format!("{}: {}", path.display(), e)))?;
        let mut state = self.lock()?;
        if state.released {
            return Err(NativeError::IllegalState("player was released".into()));
        }
        state.source = Some(path.to_path_buf());
        Ok(())
    }

    fn set_completion_listener(&self, listener: CompletionListener) {
        if let Ok(mut state) = self.inner.lock() {
            state.listener = Some(listener);
        }
    }

    async fn prepare(&self) -> Result<(), NativeError> {
        let source = self
            .lock()?
            .source
            .clone()
            .ok_or_else(|| NativeError::IllegalState("no data source set".into()))?;

        let (output, sink, duration_ms) =
            tokio::task::spawn_blocking(move || Self::open_sink(&source))
                .await
                .map_err(|e| NativeError::Device(format!("Prepare task error: {}", e)))??;

        let mut state = self.lock()?;
        if state.released {
            // Released while decoding; output and sink drop here
            debug!("Player released during prepare");
            return Ok(());
        }
        state.output = Some(output);
        state.sink = Some(sink);
        state.duration_ms = duration_ms;
        Ok(())
    }

    fn start(&self) -> Result<(), NativeError> {
        let spawn_watcher = {
            let mut state = self.lock()?;
            state.sink()?.play();
            !std::mem::replace(&mut state.watching, true)
        };
        if spawn_watcher {
            self.spawn_completion_watcher();
        }
        Ok(())
    }

    fn pause(&self) -> Result<(), NativeError> {
        self.lock()?.sink()?.pause();
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.lock()
            .ok()
            .and_then(|state| {
                state
                    .sink
                    .as_ref()
                    .map(|sink| !sink.is_paused() && !sink.empty())
            })
            .unwrap_or(false)
    }

    fn current_position_ms(&self) -> u64 {
        self.lock()
            .ok()
            .and_then(|state| state.sink.as_ref().map(|s| s.get_pos().as_millis() as u64))
            .unwrap_or(0)
    }

    fn duration_ms(&self) -> u64 {
        self.lock().map(|state| state.duration_ms).unwrap_or(0)
    }

    fn seek_to_ms(&self, position_ms: u64) -> Result<(), NativeError> {
        let state = self.lock()?;
        let target = match state.duration_ms {
            0 => position_ms,
            duration => position_ms.min(duration),
        };
        state
            .sink()?
            .try_seek(Duration::from_millis(target))
            .map_err(|e| NativeError::Unsupported(e.to_string()))
    }

    fn stop(&self) -> Result<(), NativeError> {
        let mut state = self.lock()?;
        state.stopped = true;
        if let Some(sink) = &state.sink {
            sink.stop();
        }
        Ok(())
    }

    fn release(&self) -> Result<(), NativeError> {
        let mut state = self.lock()?;
        if state.released {
            return Ok(());
        }
        state.released = true;
        state.listener = None;
        if let Some(sink) = state.sink.take() {
            sink.stop();
        }
        state.output = None;
        Ok(())
    }
}

/// Reported duration; 0 when the decoder cannot tell the length up front
fn duration_ms_or_zero(total: Option<Duration>, path: &Path) -> u64 {
    match total {
        Some(total) => total.as_millis() as u64,
        None => {
            debug!(
                "Duration of {} is unknown; progress events will report 0",
                path.display()
            );
            0
        }
    }
}
