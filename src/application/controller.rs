//! Media session controller use case
//!
//! Owns at most one recorder handle and one player handle, plus the
//! position timer that reports playback progress while a player is live.
//! Every operation resolves with a status string or rejects with a
//! [`SessionError`] tagged by the operation name.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::ports::{
    EventEmitter, MediaBackend, MediaPlayer, MediaRecorder, NativeError, RecorderInfo,
};
use crate::domain::config::SessionSettings;
use crate::domain::error::{Operation, PlayError, RecordError, SessionError};
use crate::domain::media::{MediaPath, PlaybackEvent, PLAYBACK_EVENT};
use crate::domain::session::{PlayerState, RecorderState, SessionStatus};

pub const RECORDER_NULL: &str = "recorder is null.";
pub const RECORDER_STOPPED: &str = "recorder stopped.";
pub const PLAYER_NULL: &str = "mediaPlayer is null.";
pub const PLAYER_ALREADY_RUNNING: &str = "Player is already running. Stop it first.";
pub const PLAYER_ALREADY_PLAYING: &str = "mediaPlayer is already running.";
pub const PLAYER_RELEASED_DURING_PREPARE: &str = "player was released before it was prepared.";
pub const PLAYER_RESUMED: &str = "player resumed.";
pub const RESUME_PLAYER: &str = "resume player";
pub const PAUSE_PLAYER: &str = "pause player";
pub const SEEK_PLAYER: &str = "seek player";
pub const STOPPED_PLAYER: &str = "stopped player";

/// Playback position (ms) above which a non-playing player counts as paused
const PAUSED_POSITION_THRESHOLD_MS: u64 = 1;

/// Live player plus the tasks bound to it
struct PlayerSlot {
    /// Liveness token; callbacks carrying another value are stale
    generation: u64,
    handle: Arc<dyn MediaPlayer>,
    prepared: bool,
    completion_task: JoinHandle<()>,
}

#[derive(Default)]
struct Session {
    recorder: Option<Arc<dyn MediaRecorder>>,
    player: Option<PlayerSlot>,
    timer: Option<JoinHandle<()>>,
}

impl Session {
    fn live_player(&self, generation: u64) -> Option<&PlayerSlot> {
        self.player
            .as_ref()
            .filter(|slot| slot.generation == generation)
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            debug!("Position timer cancelled");
        }
    }
}

struct Inner<B, E> {
    backend: B,
    emitter: E,
    settings: SessionSettings,
    session: Mutex<Session>,
    generations: AtomicU64,
}

/// Media session controller.
///
/// Cheap to clone; clones share the same session.
pub struct MediaSessionController<B, E> {
    inner: Arc<Inner<B, E>>,
}

impl<B, E> Clone for MediaSessionController<B, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B, E> MediaSessionController<B, E>
where
    B: MediaBackend,
    E: EventEmitter,
{
    /// Create a controller with no live handles
    pub fn new(backend: B, emitter: E, settings: SessionSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                emitter,
                settings,
                session: Mutex::new(Session::default()),
                generations: AtomicU64::new(0),
            }),
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }

    /// Start recording to `path` (or the default location for `DEFAULT`).
    ///
    /// Resolves with the `file://` URI of the target.
    pub async fn start_record(&self, path: &str) -> Result<String, SessionError> {
        let op = Operation::StartRecord;
        let target = MediaPath::parse(path);
        let output = target.resolve(&self.inner.settings.default_path);

        let mut session = self.inner.session.lock().await;
        let (recorder, fresh) = match &session.recorder {
            Some(recorder) => (Arc::clone(recorder), false),
            None => {
                let recorder = self
                    .inner
                    .backend
                    .create_recorder(&output, &self.inner.settings.recorder)
                    .map_err(|e| record_error(op, e))?;
                recorder.set_info_listener(Arc::new(log_recorder_info));
                session.recorder = Some(Arc::clone(&recorder));
                (recorder, true)
            }
        };

        let started = match recorder.prepare().await {
            Ok(()) => recorder.start().await,
            Err(e) => Err(e),
        };

        if let Err(e) = started {
            error!("Failed to start recording to {}: {}", output.display(), e);
            if fresh {
                session.recorder = None;
                if let Err(release_err) = recorder.release().await {
                    warn!("Failed to release recorder after start failure: {}", release_err);
                }
            }
            return Err(record_error(op, e));
        }

        info!("Recording to {}", output.display());
        Ok(target.file_uri(&self.inner.settings.default_path))
    }

    /// Stop and release the recorder.
    ///
    /// The handle is cleared even when the native stop or release fails.
    pub async fn stop_record(&self) -> Result<String, SessionError> {
        let op = Operation::StopRecord;
        let mut session = self.inner.session.lock().await;
        let recorder = session
            .recorder
            .take()
            .ok_or_else(|| RecordError::new(op, RECORDER_NULL))?;
        drop(session);

        let stopped = recorder.stop().await;
        let released = recorder.release().await;

        if let Err(e) = stopped.and(released) {
            error!("Failed to stop recorder: {}", e);
            return Err(record_error(op, e));
        }

        info!("Recorder stopped");
        Ok(RECORDER_STOPPED.to_string())
    }

    /// Start playing `path` (or the default location for `DEFAULT`).
    ///
    /// A paused player is resumed in place. Otherwise a new player is
    /// prepared; the call settles once preparation finishes.
    pub async fn start_play(&self, path: &str) -> Result<String, SessionError> {
        match self.begin_play(path).await? {
            PlayStart::Resumed(value) => Ok(value),
            PlayStart::Preparing(pending) => pending.finish().await,
        }
    }

    /// First half of [`start_play`](Self::start_play): everything up to the
    /// preparation wait, done under the session lock.
    ///
    /// Callers that serialize requests can settle the returned
    /// [`PendingPlay`] elsewhere and move on to the next request.
    pub async fn begin_play(&self, path: &str) -> Result<PlayStart<B, E>, SessionError> {
        let op = Operation::StartPlay;
        let target = MediaPath::parse(path);
        let source = target.resolve(&self.inner.settings.default_path);
        let mut session = self.inner.session.lock().await;

        if let Some(slot) = &session.player {
            let player = &slot.handle;
            let paused = slot.prepared
                && !player.is_playing()
                && player.current_position_ms() > PAUSED_POSITION_THRESHOLD_MS;
            if paused {
                player.start().map_err(|e| play_error(op, e))?;
                info!("Player resumed");
                return Ok(PlayStart::Resumed(PLAYER_RESUMED.to_string()));
            }
            warn!("Player is already running");
            return Err(PlayError::new(op, PLAYER_ALREADY_RUNNING).into());
        }

        let generation = self.inner.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let player = self.inner.backend.create_player();

        if let Err(e) = player.set_data_source(&source) {
            error!("Failed to set data source {}: {}", source.display(), e);
            release_quietly(player.as_ref());
            return Err(play_error(op, e));
        }

        let (done_tx, done_rx) = mpsc::unbounded_channel();
        player.set_completion_listener(Arc::new(move || {
            let _ = done_tx.send(());
        }));
        let completion_task = self.spawn_completion_watch(generation, done_rx);

        session.player = Some(PlayerSlot {
            generation,
            handle: Arc::clone(&player),
            prepared: false,
            completion_task,
        });
        debug!("Player {} preparing {}", generation, source.display());

        Ok(PlayStart::Preparing(PendingPlay {
            controller: self.clone(),
            generation,
            player,
            target,
            source,
        }))
    }

    /// Resume a paused player
    pub async fn resume(&self) -> Result<String, SessionError> {
        let op = Operation::Resume;
        let session = self.inner.session.lock().await;
        let slot = session
            .player
            .as_ref()
            .ok_or_else(|| PlayError::new(op, PLAYER_NULL))?;
        let player = &slot.handle;

        if player.is_playing() {
            return Err(PlayError::new(op, PLAYER_ALREADY_PLAYING).into());
        }

        player
            .seek_to_ms(player.current_position_ms())
            .and_then(|()| player.start())
            .map_err(|e| {
                error!("Failed to resume player: {}", e);
                play_error(op, e)
            })?;

        Ok(RESUME_PLAYER.to_string())
    }

    pub async fn pause_play(&self) -> Result<String, SessionError> {
        let op = Operation::PausePlay;
        let session = self.inner.session.lock().await;
        let slot = session
            .player
            .as_ref()
            .ok_or_else(|| PlayError::new(op, PLAYER_NULL))?;

        slot.handle.pause().map_err(|e| {
            error!("Failed to pause player: {}", e);
            play_error(op, e)
        })?;

        Ok(PAUSE_PLAYER.to_string())
    }

    /// Seek to `seconds` from the start (negative values clamp to 0)
    pub async fn seek_to(&self, seconds: i64) -> Result<String, SessionError> {
        let op = Operation::SeekTo;
        let session = self.inner.session.lock().await;
        let slot = session
            .player
            .as_ref()
            .ok_or_else(|| PlayError::new(op, PLAYER_NULL))?;

        let millis = seconds_to_millis(seconds);
        slot.handle
            .seek_to_ms(millis)
            .map_err(|e| play_error(op, e))?;

        debug!("Seeked to {}ms", millis);
        Ok(SEEK_PLAYER.to_string())
    }

    /// Release the player. The position timer is cancelled even when
    /// there is no player.
    pub async fn stop_play(&self) -> Result<String, SessionError> {
        let op = Operation::StopPlay;
        let mut session = self.inner.session.lock().await;
        session.cancel_timer();

        let slot = session
            .player
            .take()
            .ok_or_else(|| PlayError::new(op, PLAYER_NULL))?;
        slot.completion_task.abort();

        slot.handle.release().map_err(|e| {
            error!("Failed to release player: {}", e);
            play_error(op, e)
        })?;

        info!("Player {} stopped", slot.generation);
        Ok(STOPPED_PLAYER.to_string())
    }

    pub async fn status(&self) -> SessionStatus {
        let session = self.inner.session.lock().await;
        let recorder = if session.recorder.is_some() {
            RecorderState::Active
        } else {
            RecorderState::Absent
        };
        let player = match &session.player {
            None => PlayerState::Absent,
            Some(slot) if !slot.prepared => PlayerState::Preparing,
            Some(slot) if slot.handle.is_playing() => PlayerState::Playing,
            Some(_) => PlayerState::Paused,
        };
        SessionStatus { recorder, player }
    }

    pub async fn recorder_state(&self) -> RecorderState {
        self.status().await.recorder
    }

    pub async fn player_state(&self) -> PlayerState {
        self.status().await.player
    }

    /// Check if a position timer is armed
    pub async fn has_position_timer(&self) -> bool {
        let session = self.inner.session.lock().await;
        session
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Release every live handle. Native failures are logged.
    pub async fn shutdown(&self) {
        let mut session = self.inner.session.lock().await;
        session.cancel_timer();
        discard_player(&mut session);

        if let Some(recorder) = session.recorder.take() {
            if let Err(e) = recorder.stop().await {
                warn!("Failed to stop recorder during shutdown: {}", e);
            }
            if let Err(e) = recorder.release().await {
                warn!("Failed to release recorder during shutdown: {}", e);
            }
        }
        debug!("Session shut down");
    }

    fn spawn_completion_watch(
        &self,
        generation: u64,
        mut done_rx: mpsc::UnboundedReceiver<()>,
    ) -> JoinHandle<()> {
        let inner = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            if done_rx.recv().await.is_some() {
                if let Some(inner) = inner.upgrade() {
                    inner.finish_playback(generation).await;
                }
            }
        })
    }

    fn spawn_position_timer(&self, generation: u64) -> JoinHandle<()> {
        let inner: Weak<Inner<B, E>> = Arc::downgrade(&self.inner);
        let period = self.inner.settings.playback.progress_interval();
        let while_paused = self.inner.settings.playback.progress_while_paused;

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                let session = inner.session.lock().await;
                let Some(slot) = session.live_player(generation) else {
                    break;
                };
                let player = &slot.handle;
                if !while_paused && !player.is_playing() {
                    continue;
                }
                let event =
                    PlaybackEvent::progress(player.duration_ms(), player.current_position_ms());
                inner.emitter.emit(PLAYBACK_EVENT, &event);
            }
        })
    }
}

/// Outcome of [`MediaSessionController::begin_play`]
pub enum PlayStart<B, E> {
    /// A paused player was resumed; nothing left to wait for
    Resumed(String),
    /// A new player is live and still has to be prepared
    Preparing(PendingPlay<B, E>),
}

/// Player created by `begin_play` whose preparation has not run yet
pub struct PendingPlay<B, E> {
    controller: MediaSessionController<B, E>,
    generation: u64,
    player: Arc<dyn MediaPlayer>,
    target: MediaPath,
    source: PathBuf,
}

impl<B, E> PendingPlay<B, E>
where
    B: MediaBackend,
    E: EventEmitter,
{
    /// Wait for preparation, then start playback and the position timer
    pub async fn finish(self) -> Result<String, SessionError> {
        let op = Operation::StartPlay;
        let inner = &self.controller.inner;

        // Not holding the lock: stop_play may release this player meanwhile
        let prepared = self.player.prepare().await;

        let mut session = inner.session.lock().await;
        if session.live_player(self.generation).is_none() {
            debug!("Player {} was released before preparation finished", self.generation);
            return Err(PlayError::new(op, PLAYER_RELEASED_DURING_PREPARE).into());
        }

        if let Err(e) = prepared.and_then(|()| self.player.start()) {
            error!("Failed to start playback of {}: {}", self.source.display(), e);
            discard_player(&mut session);
            return Err(play_error(op, e));
        }

        if let Some(slot) = session.player.as_mut() {
            slot.prepared = true;
        }
        session.cancel_timer();
        session.timer = Some(self.controller.spawn_position_timer(self.generation));

        info!("Playing {}", self.source.display());
        Ok(self.target.playback_value(&inner.settings.default_path))
    }
}

impl<B, E> Inner<B, E>
where
    B: MediaBackend,
    E: EventEmitter,
{
    /// Natural end of playback: final event, then teardown
    async fn finish_playback(&self, generation: u64) {
        let mut session = self.session.lock().await;
        if session.live_player(generation).is_none() {
            debug!("Ignoring completion from stale player {}", generation);
            return;
        }
        let Some(slot) = session.player.take() else {
            return;
        };

        let duration = slot.handle.duration_ms();
        self.emitter
            .emit(PLAYBACK_EVENT, &PlaybackEvent::finished(duration));
        session.cancel_timer();

        if let Err(e) = slot.handle.stop() {
            warn!("Failed to stop completed player: {}", e);
        }
        release_quietly(slot.handle.as_ref());
        info!("Playback completed ({}ms)", duration);
    }
}

/// Drop the current player slot, releasing the native handle
fn discard_player(session: &mut Session) {
    if let Some(slot) = session.player.take() {
        slot.completion_task.abort();
        release_quietly(slot.handle.as_ref());
    }
}

fn release_quietly(player: &dyn MediaPlayer) {
    if let Err(e) = player.release() {
        warn!("Failed to release player: {}", e);
    }
}

fn log_recorder_info(info: RecorderInfo) {
    match info {
        RecorderInfo::Unknown(extra) => debug!("Recorder info: unknown ({})", extra),
        RecorderInfo::MaxDurationReached => info!("Recorder info: {}", info),
        RecorderInfo::MaxFileSizeReached => info!("Recorder info: {}", info),
    }
}

fn seconds_to_millis(seconds: i64) -> u64 {
    (seconds.max(0) as u64).saturating_mul(1000)
}

fn record_error(op: Operation, e: NativeError) -> SessionError {
    RecordError::new(op, e.to_string()).into()
}

fn play_error(op: Operation, e: NativeError) -> SessionError {
    PlayError::new(op, e.to_string()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{CompletionListener, InfoListener};
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use crate::domain::config::RecorderSettings;

    #[derive(Default)]
    struct FakePlayerState {
        source: Option<PathBuf>,
        prepared: bool,
        playing: bool,
        position_ms: u64,
        listener: Option<CompletionListener>,
        released: bool,
        seeks: Vec<u64>,
    }

    #[derive(Default)]
    struct FakePlayer {
        state: StdMutex<FakePlayerState>,
    }

    impl FakePlayer {
        fn complete(&self) {
            let listener = {
                let mut state = self.state.lock().unwrap();
                state.playing = false;
                state.listener.clone()
            };
            if let Some(listener) = listener {
                listener();
            }
        }
    }

    #[async_trait]
    impl MediaPlayer for FakePlayer {
        fn set_data_source(&self, path: &Path) -> Result<(), NativeError> {
            if path.to_string_lossy().contains("missing") {
                return Err(NativeError::Io(format!("{}: not found", path.display())));
            }
            self.state.lock().unwrap().source = Some(path.to_path_buf());
            Ok(())
        }

        fn set_completion_listener(&self, listener: CompletionListener) {
            self.state.lock().unwrap().listener = Some(listener);
        }

        async fn prepare(&self) -> Result<(), NativeError> {
            self.state.lock().unwrap().prepared = true;
            Ok(())
        }

        fn start(&self) -> Result<(), NativeError> {
            let mut state = self.state.lock().unwrap();
            if !state.prepared {
                return Err(NativeError::IllegalState("not prepared".into()));
            }
            state.playing = true;
            Ok(())
        }

        fn pause(&self) -> Result<(), NativeError> {
            self.state.lock().unwrap().playing = false;
            Ok(())
        }

        fn is_playing(&self) -> bool {
            self.state.lock().unwrap().playing
        }

        fn current_position_ms(&self) -> u64 {
            self.state.lock().unwrap().position_ms
        }

        fn duration_ms(&self) -> u64 {
            3000
        }

        fn seek_to_ms(&self, position_ms: u64) -> Result<(), NativeError> {
            let mut state = self.state.lock().unwrap();
            state.position_ms = position_ms;
            state.seeks.push(position_ms);
            Ok(())
        }

        fn stop(&self) -> Result<(), NativeError> {
            self.state.lock().unwrap().playing = false;
            Ok(())
        }

        fn release(&self) -> Result<(), NativeError> {
            self.state.lock().unwrap().released = true;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeRecorder {
        started: StdMutex<bool>,
    }

    #[async_trait]
    impl MediaRecorder for FakeRecorder {
        fn set_info_listener(&self, _listener: InfoListener) {}

        async fn prepare(&self) -> Result<(), NativeError> {
            if *self.started.lock().unwrap() {
                return Err(NativeError::IllegalState("recorder already started".into()));
            }
            Ok(())
        }

        async fn start(&self) -> Result<(), NativeError> {
            *self.started.lock().unwrap() = true;
            Ok(())
        }

        async fn stop(&self) -> Result<(), NativeError> {
            Ok(())
        }

        async fn release(&self) -> Result<(), NativeError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        players: StdMutex<Vec<Arc<FakePlayer>>>,
        outputs: StdMutex<Vec<PathBuf>>,
    }

    impl FakeBackend {
        fn player(&self, index: usize) -> Arc<FakePlayer> {
            Arc::clone(&self.players.lock().unwrap()[index])
        }
    }

    impl MediaBackend for Arc<FakeBackend> {
        fn create_recorder(
            &self,
            output: &Path,
            _settings: &RecorderSettings,
        ) -> Result<Arc<dyn MediaRecorder>, NativeError> {
            self.outputs.lock().unwrap().push(output.to_path_buf());
            Ok(Arc::new(FakeRecorder::default()))
        }

        fn create_player(&self) -> Arc<dyn MediaPlayer> {
            let player = Arc::new(FakePlayer::default());
            self.players.lock().unwrap().push(Arc::clone(&player));
            player
        }
    }

    #[derive(Default)]
    struct CollectingEmitter {
        events: StdMutex<Vec<(String, PlaybackEvent)>>,
    }

    impl EventEmitter for Arc<CollectingEmitter> {
        fn emit(&self, name: &str, event: &PlaybackEvent) {
            self.events
                .lock()
                .unwrap()
                .push((name.to_string(), *event));
        }
    }

    type TestController = MediaSessionController<Arc<FakeBackend>, Arc<CollectingEmitter>>;

    fn controller() -> (TestController, Arc<FakeBackend>, Arc<CollectingEmitter>) {
        let backend = Arc::new(FakeBackend::default());
        let emitter = Arc::new(CollectingEmitter::default());
        let controller = MediaSessionController::new(
            Arc::clone(&backend),
            Arc::clone(&emitter),
            SessionSettings::with_default_path("/data/sound.wav"),
        );
        (controller, backend, emitter)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test]
    async fn start_record_resolves_file_uri() {
        let (controller, backend, _) = controller();
        let uri = controller.start_record("DEFAULT").await.unwrap();
        assert_eq!(uri, "file:///data/sound.wav");
        assert_eq!(
            backend.outputs.lock().unwrap().as_slice(),
            [PathBuf::from("/data/sound.wav")]
        );
        assert_eq!(controller.recorder_state().await, RecorderState::Active);
    }

    #[tokio::test]
    async fn start_record_twice_rejects_and_keeps_recorder() {
        let (controller, _, _) = controller();
        controller.start_record("/tmp/a.wav").await.unwrap();
        let err = controller.start_record("/tmp/a.wav").await.unwrap_err();
        assert_eq!(err.code(), "startRecord");
        assert_eq!(controller.recorder_state().await, RecorderState::Active);
    }

    #[tokio::test]
    async fn stop_record_without_recorder_rejects() {
        let (controller, _, _) = controller();
        let err = controller.stop_record().await.unwrap_err();
        assert_eq!(err.code(), "stopRecord");
        assert_eq!(err.message(), RECORDER_NULL);
    }

    #[tokio::test]
    async fn stop_record_clears_handle() {
        let (controller, _, _) = controller();
        controller.start_record("DEFAULT").await.unwrap();
        assert_eq!(controller.stop_record().await.unwrap(), RECORDER_STOPPED);
        assert_eq!(controller.recorder_state().await, RecorderState::Absent);
    }

    #[tokio::test]
    async fn player_operations_without_player_reject() {
        let (controller, _, _) = controller();
        for (result, code) in [
            (controller.resume().await, "resume"),
            (controller.pause_play().await, "pausePlay"),
            (controller.seek_to(5).await, "seekTo"),
            (controller.stop_play().await, "stopPlay"),
        ] {
            let err = result.unwrap_err();
            assert_eq!(err.code(), code);
            assert_eq!(err.message(), PLAYER_NULL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_play_arms_timer() {
        let (controller, _, emitter) = controller();
        let value = controller.start_play("/music/a.wav").await.unwrap();
        assert_eq!(value, "/music/a.wav");
        assert_eq!(controller.player_state().await, PlayerState::Playing);
        assert!(controller.has_position_timer().await);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let events = emitter.events.lock().unwrap().clone();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|(name, _)| name == PLAYBACK_EVENT));
        assert!(events.iter().all(|(_, e)| !e.is_finished()));
    }

    #[tokio::test]
    async fn start_play_default_resolves_uri() {
        let (controller, backend, _) = controller();
        let value = controller.start_play("DEFAULT").await.unwrap();
        assert_eq!(value, "file:///data/sound.wav");
        let player = backend.player(0);
        let source = player.state.lock().unwrap().source.clone();
        assert_eq!(source, Some(PathBuf::from("/data/sound.wav")));
    }

    #[tokio::test]
    async fn start_play_while_playing_rejects() {
        let (controller, backend, _) = controller();
        controller.start_play("/a.wav").await.unwrap();
        let err = controller.start_play("/a.wav").await.unwrap_err();
        assert_eq!(err.message(), PLAYER_ALREADY_RUNNING);
        assert_eq!(backend.players.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn start_play_while_paused_resumes_in_place() {
        let (controller, backend, _) = controller();
        controller.start_play("/a.wav").await.unwrap();
        controller.seek_to(2).await.unwrap();
        controller.pause_play().await.unwrap();
        assert_eq!(controller.player_state().await, PlayerState::Paused);

        let value = controller.start_play("/a.wav").await.unwrap();
        assert_eq!(value, PLAYER_RESUMED);
        assert_eq!(backend.players.lock().unwrap().len(), 1);
        assert_eq!(controller.player_state().await, PlayerState::Playing);
    }

    #[tokio::test]
    async fn seek_converts_seconds_to_millis() {
        let (controller, backend, _) = controller();
        controller.start_play("/a.wav").await.unwrap();
        assert_eq!(controller.seek_to(5).await.unwrap(), SEEK_PLAYER);
        controller.seek_to(-3).await.unwrap();
        let seeks = backend.player(0).state.lock().unwrap().seeks.clone();
        assert_eq!(seeks, vec![5000, 0]);
    }

    #[tokio::test]
    async fn resume_rejects_when_playing() {
        let (controller, _, _) = controller();
        controller.start_play("/a.wav").await.unwrap();
        let err = controller.resume().await.unwrap_err();
        assert_eq!(err.message(), PLAYER_ALREADY_PLAYING);

        controller.pause_play().await.unwrap();
        assert_eq!(controller.resume().await.unwrap(), RESUME_PLAYER);
    }

    #[tokio::test]
    async fn completion_emits_final_event_and_clears_player() {
        let (controller, backend, emitter) = controller();
        controller.start_play("/a.wav").await.unwrap();
        settle().await;

        backend.player(0).complete();
        settle().await;

        let events = emitter.events.lock().unwrap().clone();
        let finished: Vec<_> = events.iter().filter(|(_, e)| e.is_finished()).collect();
        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].1.current_position, 3000);
        assert!(backend.player(0).state.lock().unwrap().released);
        assert_eq!(controller.player_state().await, PlayerState::Absent);
        assert!(!controller.has_position_timer().await);

        controller.start_play("/a.wav").await.unwrap();
        assert_eq!(controller.player_state().await, PlayerState::Playing);
    }

    #[tokio::test]
    async fn stale_completion_is_ignored() {
        let (controller, backend, emitter) = controller();
        controller.start_play("/a.wav").await.unwrap();
        let first = backend.player(0);
        controller.stop_play().await.unwrap();
        controller.start_play("/b.wav").await.unwrap();

        first.complete();
        settle().await;

        assert_eq!(controller.player_state().await, PlayerState::Playing);
        let events = emitter.events.lock().unwrap().clone();
        assert!(events.iter().all(|(_, e)| !e.is_finished()));
    }

    #[tokio::test]
    async fn missing_source_rejects_start_play() {
        let (controller, _, _) = controller();
        let err = controller.start_play("/missing.wav").await.unwrap_err();
        assert_eq!(err.code(), "startPlay");
        assert!(err.message().contains("not found"));
        assert_eq!(controller.player_state().await, PlayerState::Absent);
    }

    #[tokio::test]
    async fn stop_play_cancels_timer() {
        let (controller, backend, _) = controller();
        controller.start_play("/a.wav").await.unwrap();
        assert_eq!(controller.stop_play().await.unwrap(), STOPPED_PLAYER);
        assert!(!controller.has_position_timer().await);
        assert!(backend.player(0).state.lock().unwrap().released);
    }

    #[test]
    fn seconds_clamp_and_scale() {
        assert_eq!(seconds_to_millis(5), 5000);
        assert_eq!(seconds_to_millis(-1), 0);
        assert_eq!(seconds_to_millis(i64::MAX), u64::MAX);
    }
}
