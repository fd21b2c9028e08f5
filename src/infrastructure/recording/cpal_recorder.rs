//! Microphone recorder using cpal, writing 16-bit PCM WAV via hound
//!
//! The cpal stream is not `Send`, so it is built and owned by a dedicated
//! capture thread. The WAV writer is shared with the stream callback and
//! finalized on stop.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use hound::{WavSpec, WavWriter};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::application::ports::{InfoListener, MediaRecorder, NativeError, RecorderInfo};
use crate::domain::config::RecorderSettings;

type Writer = WavWriter<BufWriter<File>>;

const BITS_PER_SAMPLE: u16 = 16;
const WAV_HEADER_BYTES: u64 = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Prepared,
    Recording,
    Stopped,
    Released,
}

/// Capture format negotiated with the input device during `prepare`
#[derive(Debug, Clone)]
struct CaptureFormat {
    config: StreamConfig,
    sample_format: SampleFormat,
    /// Channels written to the file (device channels are mixed down)
    output_channels: u16,
}

/// Limits expressed in written samples, checked from the stream callback
#[derive(Debug, Clone, Copy)]
struct SampleBudget {
    max_duration: Option<u64>,
    max_file_size: Option<u64>,
}

impl SampleBudget {
    fn new(settings: &RecorderSettings, format: &CaptureFormat) -> Self {
        let per_second =
            u64::from(format.config.sample_rate.0) * u64::from(format.output_channels);
        let bytes_per_sample = u64::from(BITS_PER_SAMPLE / 8);
        Self {
            max_duration: settings
                .max_duration
                .map(|d| d.as_millis().saturating_mul(per_second) / 1000),
            max_file_size: settings
                .max_file_size
                .map(|s| s.as_bytes().saturating_sub(WAV_HEADER_BYTES) / bytes_per_sample),
        }
    }

    fn exceeded(&self, written: u64) -> Option<RecorderInfo> {
        if self.max_duration.is_some_and(|limit| written >= limit) {
            return Some(RecorderInfo::MaxDurationReached);
        }
        if self.max_file_size.is_some_and(|limit| written >= limit) {
            return Some(RecorderInfo::MaxFileSizeReached);
        }
        None
    }
}

/// State shared between the handle and the stream callback
struct Capture {
    writer: StdMutex<Option<Writer>>,
    written: StdMutex<u64>,
    is_recording: AtomicBool,
    listener: StdMutex<Option<InfoListener>>,
}

impl Capture {
    fn write(&self, samples: &[i16], budget: &SampleBudget) {
        if !self.is_recording.load(Ordering::SeqCst) {
            return;
        }

        let reached = {
            let Ok(mut writer) = self.writer.lock() else {
                return;
            };
            let Some(writer) = writer.as_mut() else {
                return;
            };
            let Ok(mut written) = self.written.lock() else {
                return;
            };
            let mut reached = None;
            for &sample in samples {
                if let Some(info) = budget.exceeded(*written) {
                    reached = Some(info);
                    break;
                }
                if let Err(e) = writer.write_sample(sample) {
                    warn!("Failed to write sample: {}", e);
                    break;
                }
                *written += 1;
            }
            reached
        };

        if let Some(info) = reached {
            // Only the first callback past the limit reports it
            if self.is_recording.swap(false, Ordering::SeqCst) {
                debug!("Recorder limit reached: {}", info);
                self.notify(info);
            }
        }
    }

    fn notify(&self, info: RecorderInfo) {
        let listener = self.listener.lock().ok().and_then(|l| l.clone());
        if let Some(listener) = listener {
            listener(info);
        }
    }

    fn finalize(&self) -> Result<(), NativeError> {
        let writer = self
            .writer
            .lock()
            .map_err(|_| NativeError::IllegalState("recorder state poisoned".into()))?
            .take();
        match writer {
            Some(writer) => writer
                .finalize()
                .map_err(|e| NativeError::Io(format!("Failed to finalize WAV file: {}", e))),
            None => Ok(()),
        }
    }
}

/// Recorder handle for one output file
pub struct CpalRecorder {
    output: PathBuf,
    settings: RecorderSettings,
    phase: StdMutex<Phase>,
    format: StdMutex<Option<CaptureFormat>>,
    capture: Arc<Capture>,
    capture_thread: StdMutex<Option<std::thread::JoinHandle<()>>>,
}

impl CpalRecorder {
    pub fn new(output: impl Into<PathBuf>, settings: RecorderSettings) -> Self {
        Self {
            output: output.into(),
            settings,
            phase: StdMutex::new(Phase::Idle),
            format: StdMutex::new(None),
            capture: Arc::new(Capture {
                writer: StdMutex::new(None),
                written: StdMutex::new(0),
                is_recording: AtomicBool::new(false),
                listener: StdMutex::new(None),
            }),
            capture_thread: StdMutex::new(None),
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    fn phase(&self) -> Result<Phase, NativeError> {
        self.phase
            .lock()
            .map(|p| *p)
            .map_err(|_| NativeError::IllegalState("recorder state poisoned".into()))
    }

    fn set_phase(&self, phase: Phase) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
    }

    fn expect_phase(&self, expected: Phase, call: &str) -> Result<(), NativeError> {
        let phase = self.phase()?;
        if phase != expected {
            return Err(NativeError::IllegalState(format!(
                "{} called in state {:?}",
                call, phase
            )));
        }
        Ok(())
    }

    fn get_input_device() -> Result<cpal::Device, NativeError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or_else(|| NativeError::Device("No audio input device available".into()))
    }

    /// Pick an input configuration, preferring the requested sample rate
    /// and the fewest channels
    fn get_input_config(
        device: &cpal::Device,
        settings: &RecorderSettings,
    ) -> Result<CaptureFormat, NativeError> {
        let target_rate = settings.sample_rate;
        let supported_configs = device
            .supported_input_configs()
            .map_err(|e| NativeError::Device(format!("Failed to get configs: {}", e)))?;

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;
        for config in supported_configs {
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let includes_target = config.min_sample_rate().0 <= target_rate
                && config.max_sample_rate().0 >= target_rate;

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let current_includes = current.min_sample_rate().0 <= target_rate
                        && current.max_sample_rate().0 >= target_rate;
                    (includes_target && !current_includes)
                        || (includes_target == current_includes
                            && config.channels() < current.channels())
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config
            .ok_or_else(|| NativeError::Unsupported("No suitable input config found".into()))?;

        let sample_rate = if config_range.min_sample_rate().0 <= target_rate
            && config_range.max_sample_rate().0 >= target_rate
        {
            SampleRate(target_rate)
        } else {
            config_range.max_sample_rate()
        };

        let device_channels = config_range.channels();
        Ok(CaptureFormat {
            config: StreamConfig {
                channels: device_channels,
                sample_rate,
                buffer_size: cpal::BufferSize::Default,
            },
            sample_format: config_range.sample_format(),
            output_channels: settings.channels.clamp(1, device_channels.max(1)),
        })
    }

    /// Fold interleaved device frames down to `output_channels`.
    ///
    /// Output channel `o` is the average of every device channel `c` with
    /// `c % output_channels == o`.
    fn mix_down(samples: &[i16], channels: u16, output_channels: u16) -> Vec<i16> {
        if output_channels == 0 || channels <= output_channels {
            return samples.to_vec();
        }

        let out = output_channels as usize;
        let mut mixed = Vec::with_capacity(samples.len() / channels as usize * out);
        for frame in samples.chunks(channels as usize) {
            for o in 0..out {
                let (sum, count) = frame
                    .iter()
                    .skip(o)
                    .step_by(out)
                    .fold((0i32, 0i32), |(sum, count), &s| (sum + s as i32, count + 1));
                mixed.push(if count == 0 { 0 } else { (sum / count) as i16 });
            }
        }
        mixed
    }

    fn to_i16(samples: &[f32]) -> Vec<i16> {
        samples
            .iter()
            .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .collect()
    }

    /// Body of the capture thread: build the stream, report the outcome,
    /// then keep the stream alive until capture stops
    fn run_capture(
        capture: Arc<Capture>,
        format: CaptureFormat,
        budget: SampleBudget,
        ready: oneshot::Sender<Result<(), NativeError>>,
    ) {
        let device = match Self::get_input_device() {
            Ok(device) => device,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        let channels = format.config.channels;
        let output_channels = format.output_channels;
        let on_error = |err: cpal::StreamError| warn!("Audio stream error: {}", err);

        let stream_result = match format.sample_format {
            SampleFormat::I16 => {
                let capture = Arc::clone(&capture);
                device.build_input_stream(
                    &format.config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        let mixed = Self::mix_down(data, channels, output_channels);
                        capture.write(&mixed, &budget);
                    },
                    on_error,
                    None,
                )
            }
            SampleFormat::F32 => {
                let capture = Arc::clone(&capture);
                device.build_input_stream(
                    &format.config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let mixed = Self::mix_down(&Self::to_i16(data), channels, output_channels);
                        capture.write(&mixed, &budget);
                    },
                    on_error,
                    None,
                )
            }
            other => {
                let _ = ready.send(Err(NativeError::Unsupported(format!(
                    "Unsupported sample format {:?}",
                    other
                ))));
                return;
            }
        };

        let stream = match stream_result {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready.send(Err(NativeError::Device(e.to_string())));
                return;
            }
        };

        capture.is_recording.store(true, Ordering::SeqCst);
        if let Err(e) = stream.play() {
            capture.is_recording.store(false, Ordering::SeqCst);
            let _ = ready.send(Err(NativeError::Device(e.to_string())));
            return;
        }
        let _ = ready.send(Ok(()));

        while capture.is_recording.load(Ordering::SeqCst) {
            std::thread::sleep(std::time::Duration::from_millis(50));
        }
        drop(stream);
    }

    async fn join_capture_thread(&self) {
        let handle = self.capture_thread.lock().ok().and_then(|mut h| h.take());
        if let Some(handle) = handle {
            let joined = tokio::task::spawn_blocking(move || handle.join()).await;
            if !matches!(joined, Ok(Ok(()))) {
                warn!("Capture thread did not exit cleanly");
            }
        }
    }
}

#[async_trait]
impl MediaRecorder for CpalRecorder {
    fn set_info_listener(&self, listener: InfoListener) {
        if let Ok(mut current) = self.capture.listener.lock() {
            *current = Some(listener);
        }
    }

    async fn prepare(&self) -> Result<(), NativeError> {
        self.expect_phase(Phase::Idle, "prepare")?;

        let device = Self::get_input_device()?;
        let format = Self::get_input_config(&device, &self.settings)?;

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                NativeError::Io(format!("{}: {}", parent.display(), e))
            })?;
        }

        let spec = WavSpec {
            channels: format.output_channels,
            sample_rate: format.config.sample_rate.0,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: hound::SampleFormat::Int,
        };
        let writer = WavWriter::create(&self.output, spec)
            .map_err(|e| NativeError::Io(format!("{}: {}", self.output.display(), e)))?;

        if let Ok(mut slot) = self.capture.writer.lock() {
            *slot = Some(writer);
        }
        if let Ok(mut slot) = self.format.lock() {
            *slot = Some(format);
        }
        self.set_phase(Phase::Prepared);
        debug!(
            "Recorder prepared: {} Hz, {} channel(s) -> {}",
            spec.sample_rate,
            spec.channels,
            self.output.display()
        );
        Ok(())
    }

    async fn start(&self) -> Result<(), NativeError> {
        self.expect_phase(Phase::Prepared, "start")?;

        let format = self
            .format
            .lock()
            .ok()
            .and_then(|f| f.clone())
            .ok_or_else(|| NativeError::IllegalState("start called before prepare".into()))?;
        let budget = SampleBudget::new(&self.settings, &format);

        let (ready_tx, ready_rx) = oneshot::channel();
        let capture = Arc::clone(&self.capture);
        let handle = std::thread::spawn(move || {
            CpalRecorder::run_capture(capture, format, budget, ready_tx);
        });
        if let Ok(mut slot) = self.capture_thread.lock() {
            *slot = Some(handle);
        }

        ready_rx
            .await
            .map_err(|_| NativeError::Device("Capture thread exited before starting".into()))??;

        self.set_phase(Phase::Recording);
        Ok(())
    }

    async fn stop(&self) -> Result<(), NativeError> {
        self.expect_phase(Phase::Recording, "stop")?;

        self.capture.is_recording.store(false, Ordering::SeqCst);
        self.join_capture_thread().await;
        self.set_phase(Phase::Stopped);

        let written = self.capture.written.lock().map(|w| *w).unwrap_or(0);
        self.capture.finalize()?;
        if written == 0 {
            return Err(NativeError::IllegalState("No audio data captured".into()));
        }
        Ok(())
    }

    async fn release(&self) -> Result<(), NativeError> {
        if self.phase()? == Phase::Released {
            return Ok(());
        }

        self.capture.is_recording.store(false, Ordering::SeqCst);
        self.join_capture_thread().await;
        self.set_phase(Phase::Released);

        // Keep whatever was captured readable
        self.capture.finalize()
    }
}
