use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::engine::chunks::ChunkAssembler;
use crate::engine::countdown::{Countdown, TickCallback, ZeroCallback};
use crate::engine::photo;
use crate::engine::recorder::{CeilingCallback, ClipRecorder, StopOutcome};
use crate::models::artifact::{MediaArtifact, MediaKind};
use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::models::media::{MediaDeviceInfo, MediaSample, StreamConstraints, VideoFrame};
use crate::models::mode::CaptureMode;
use crate::models::state::{FlowState, RecordingState};
use crate::session::preview::PreviewStage;
use crate::storage::download;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::device_provider::{DeviceProvider, SampleCallback};

/// Delay before a closed session's state is wound back to `Capturing`,
/// giving the closing transition time to finish before state is cleared.
pub const RESET_DELAY: Duration = Duration::from_millis(300);

/// Internal mutable session state, protected by `parking_lot::Mutex`.
struct ModalInner {
    flow: FlowState,
    mode: CaptureMode,
    open: bool,
    permission_blocked: bool,
    preview: Option<PreviewStage>,
    recorder: ClipRecorder,
    countdown: Countdown,
    /// Bumped on every reset schedule and every open; stale reset threads
    /// compare against it and bail out instead of clobbering a new session.
    reset_generation: u64,
}

impl ModalInner {
    fn new() -> Self {
        Self {
            flow: FlowState::Capturing,
            mode: CaptureMode::Photo,
            open: false,
            permission_blocked: false,
            preview: None,
            recorder: ClipRecorder::new(),
            countdown: Countdown::new(),
            reset_generation: 0,
        }
    }
}

/// Capture modal orchestrator.
///
/// Generic over the environment's media-device backend via `DeviceProvider`.
/// Owns the three-state flow machine (capturing → previewing → complete),
/// the mode controller, both capture engines, and the preview stage, and
/// relays accepted artifacts outward through `CaptureDelegate`: exactly
/// once per accepted capture, never on retake or cancel.
///
/// The device handle is exclusively owned by the active session: every
/// reacquisition (mode switch, retake) releases the prior handle first, and
/// every exit path (preview transition, close, drop) releases it too.
pub struct CaptureModal<D: DeviceProvider + 'static> {
    config: CaptureConfig,
    provider: Arc<Mutex<D>>,
    inner: Arc<Mutex<ModalInner>>,
    delegate: Option<Arc<dyn CaptureDelegate>>,

    // Shared with the device callback; never lock `inner` from there.
    latest_frame: Arc<Mutex<Option<VideoFrame>>>,
    assembler: Arc<Mutex<ChunkAssembler>>,
    recording_live: Arc<AtomicBool>,
}

impl<D: DeviceProvider + 'static> CaptureModal<D> {
    pub fn new(provider: D, config: CaptureConfig) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let inner = ModalInner::new();
        let assembler = inner.recorder.assembler();

        Ok(Self {
            config,
            provider: Arc::new(Mutex::new(provider)),
            inner: Arc::new(Mutex::new(inner)),
            delegate: None,
            latest_frame: Arc::new(Mutex::new(None)),
            assembler,
            recording_live: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Install the event delegate. Call before `open`.
    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn flow_state(&self) -> FlowState {
        self.inner.lock().flow
    }

    pub fn mode(&self) -> CaptureMode {
        self.inner.lock().mode
    }

    pub fn recording_state(&self) -> RecordingState {
        self.inner.lock().recorder.state()
    }

    pub fn countdown_remaining(&self) -> u32 {
        self.inner.lock().countdown.remaining()
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    /// Whether the last acquisition was refused by the environment. The
    /// session stays blocked until closed; a later `open` may retry.
    pub fn is_permission_blocked(&self) -> bool {
        self.inner.lock().permission_blocked
    }

    /// The artifact currently held by the preview stage, if any.
    pub fn artifact(&self) -> Option<MediaArtifact> {
        self.inner.lock().preview.as_ref().map(|p| p.artifact().clone())
    }

    pub fn device_info(&self) -> MediaDeviceInfo {
        self.provider.lock().device_info()
    }

    #[cfg(test)]
    pub(crate) fn set_recording_ceiling(&mut self, ceiling: Duration) {
        self.inner.lock().recorder.set_ceiling(ceiling);
    }

    /// Open the modal: reset to a fresh `Capturing` session and acquire the
    /// device for the current mode.
    ///
    /// On `PermissionDenied` the modal stays open in a blocked state with
    /// `close` as the only meaningful action; the error is returned and
    /// also reported through the delegate.
    pub fn open(&mut self) -> Result<(), CaptureError> {
        {
            let mut inner = self.inner.lock();
            if inner.open {
                return Err(CaptureError::InvalidState("modal is already open".into()));
            }
            inner.reset_generation += 1;
            inner.flow = FlowState::Capturing;
            inner.preview = None;
            inner.permission_blocked = false;
            inner.open = true;
        }
        self.notify_flow(FlowState::Capturing);
        self.acquire_current_mode()
    }

    /// Switch between photo and video capture.
    ///
    /// Rejected while recording. Releases the active handle and re-acquires
    /// with the new mode's track constraints; a pending countdown is
    /// cancelled because it belongs to the outgoing mode.
    pub fn set_mode(&mut self, mode: CaptureMode) -> Result<(), CaptureError> {
        {
            let mut inner = self.inner.lock();
            if !inner.open {
                return Err(CaptureError::InvalidState("modal is not open".into()));
            }
            if !inner.flow.is_capturing() {
                return Err(CaptureError::InvalidState(
                    "mode can only change while capturing".into(),
                ));
            }
            if inner.recorder.is_recording() {
                return Err(CaptureError::InvalidState(
                    "cannot switch mode while recording".into(),
                ));
            }
            if inner.mode == mode {
                return Ok(());
            }
            inner.mode = mode;
            inner.countdown.cancel();
        }

        self.release_device();
        self.acquire_current_mode()
    }

    /// Arm the photo countdown. At zero the most recent frame is grabbed
    /// and encoded; if the handle was released in the meantime the grab is
    /// skipped silently.
    pub fn arm_countdown(&mut self) -> Result<(), CaptureError> {
        {
            let inner = self.inner.lock();
            if !inner.open || !inner.flow.is_capturing() {
                return Err(CaptureError::InvalidState(
                    "countdown requires an open capturing session".into(),
                ));
            }
            if inner.mode != CaptureMode::Photo {
                return Err(CaptureError::InvalidState(
                    "countdown is only armed in photo mode".into(),
                ));
            }
        }
        if !self.provider.lock().is_active() {
            return Err(CaptureError::DeviceNotAvailable);
        }

        let on_tick: TickCallback = {
            let delegate = self.delegate.clone();
            Arc::new(move |left| {
                if let Some(ref d) = delegate {
                    d.on_countdown_tick(left);
                }
            })
        };

        let on_zero: ZeroCallback = {
            let inner = Arc::clone(&self.inner);
            let provider = Arc::clone(&self.provider);
            let latest_frame = Arc::clone(&self.latest_frame);
            let delegate = self.delegate.clone();
            let quality = self.config.jpeg_quality;
            Arc::new(move || {
                Self::grab_photo(&inner, &provider, &latest_frame, &delegate, quality);
            })
        };

        self.inner
            .lock()
            .countdown
            .arm(self.config.countdown_secs, on_tick, on_zero)
    }

    /// Start accumulating a video clip. Auto-stops at the recording ceiling
    /// if `stop_recording` is never called.
    pub fn start_recording(&mut self) -> Result<(), CaptureError> {
        {
            let inner = self.inner.lock();
            if !inner.open || !inner.flow.is_capturing() {
                return Err(CaptureError::InvalidState(
                    "recording requires an open capturing session".into(),
                ));
            }
            if inner.mode != CaptureMode::Video {
                return Err(CaptureError::InvalidState(
                    "recording is only available in video mode".into(),
                ));
            }
        }
        if !self.provider.lock().is_active() {
            return Err(CaptureError::DeviceNotAvailable);
        }

        let on_ceiling: CeilingCallback = {
            let inner = Arc::clone(&self.inner);
            let provider = Arc::clone(&self.provider);
            let latest_frame = Arc::clone(&self.latest_frame);
            let delegate = self.delegate.clone();
            let recording_live = Arc::clone(&self.recording_live);
            Arc::new(move || {
                Self::finish_recording(&inner, &provider, &latest_frame, &delegate, &recording_live);
            })
        };

        self.inner.lock().recorder.start(on_ceiling)?;
        self.recording_live.store(true, Ordering::SeqCst);

        if let Err(e) = self.provider.lock().start_recorder() {
            self.recording_live.store(false, Ordering::SeqCst);
            let _ = self.inner.lock().recorder.stop();
            self.notify_error(&e);
            return Err(e);
        }

        self.notify_recording(RecordingState::Recording);
        Ok(())
    }

    /// Stop the recording and move to preview. A no-op when idle.
    pub fn stop_recording(&mut self) {
        Self::finish_recording(
            &self.inner,
            &self.provider,
            &self.latest_frame,
            &self.delegate,
            &self.recording_live,
        );
    }

    /// Accept the previewed artifact: emits it through the delegate exactly
    /// once, completes the flow, and closes the modal.
    pub fn accept(&mut self) -> Result<(), CaptureError> {
        let artifact = {
            let mut inner = self.inner.lock();
            if !inner.open {
                return Err(CaptureError::InvalidState("modal is not open".into()));
            }
            if !inner.flow.is_previewing() {
                return Err(CaptureError::InvalidState(
                    "no previewed capture to accept".into(),
                ));
            }
            let artifact = inner
                .preview
                .as_ref()
                .map(|p| p.artifact().clone())
                .ok_or_else(|| CaptureError::InvalidState("preview holds no artifact".into()))?;
            inner.flow = FlowState::Complete;
            artifact
        };

        if let Some(ref d) = self.delegate {
            d.on_media_captured(&artifact);
        }
        self.notify_flow(FlowState::Complete);
        self.close_modal();
        Ok(())
    }

    /// Discard the previewed artifact and return to capturing with a fresh
    /// acquisition for the current mode.
    pub fn retake(&mut self) -> Result<(), CaptureError> {
        {
            let mut inner = self.inner.lock();
            if !inner.open {
                return Err(CaptureError::InvalidState("modal is not open".into()));
            }
            if !inner.flow.is_previewing() {
                return Err(CaptureError::InvalidState(
                    "no previewed capture to retake".into(),
                ));
            }
            inner.preview = None;
            inner.flow = FlowState::Capturing;
        }
        self.notify_flow(FlowState::Capturing);
        self.acquire_current_mode()
    }

    /// Close the modal from any state, discarding any pending capture.
    /// Idempotent; never emits an artifact.
    pub fn close(&mut self) {
        self.close_modal();
    }

    /// Alias for `close`: the preview stage's cancel action closes the
    /// whole modal.
    pub fn cancel(&mut self) {
        self.close_modal();
    }

    /// Export the previewed artifact to the configured output directory.
    /// Best-effort: a failure leaves session state untouched.
    pub fn download(&self) -> Result<PathBuf, CaptureError> {
        let artifact = self
            .artifact()
            .ok_or_else(|| CaptureError::InvalidState("no artifact to download".into()))?;
        download::export_artifact(&artifact, &self.config.output_directory, &self.config.app_name)
    }

    /// Toggle preview playback (video artifacts only).
    pub fn toggle_playback(&mut self) -> Result<bool, CaptureError> {
        let mut inner = self.inner.lock();
        let preview = inner
            .preview
            .as_mut()
            .ok_or_else(|| CaptureError::InvalidState("no preview to control".into()))?;
        Ok(preview.toggle_playback())
    }

    /// Toggle preview mute.
    pub fn toggle_mute(&mut self) -> Result<bool, CaptureError> {
        let mut inner = self.inner.lock();
        let preview = inner
            .preview
            .as_mut()
            .ok_or_else(|| CaptureError::InvalidState("no preview to control".into()))?;
        Ok(preview.toggle_mute())
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().preview.as_ref().map(|p| p.is_playing()).unwrap_or(false)
    }

    pub fn is_muted(&self) -> bool {
        self.inner.lock().preview.as_ref().map(|p| p.is_muted()).unwrap_or(false)
    }

    // --- Internal helpers ---

    /// The callback handed to the provider. Touches only the frame cache
    /// and the chunk accumulator, never the session mutex, so a delivery
    /// thread can never deadlock against a session transition.
    fn sample_callback(&self) -> SampleCallback {
        let latest_frame = Arc::clone(&self.latest_frame);
        let assembler = Arc::clone(&self.assembler);
        let recording_live = Arc::clone(&self.recording_live);

        Arc::new(move |sample| match sample {
            MediaSample::Frame(frame) => {
                *latest_frame.lock() = Some(frame);
            }
            MediaSample::Chunk(data) => {
                if recording_live.load(Ordering::SeqCst) {
                    assembler.lock().push(data);
                }
            }
        })
    }

    fn acquire_current_mode(&self) -> Result<(), CaptureError> {
        if !self.provider.lock().is_available() {
            let e = CaptureError::DeviceNotAvailable;
            self.notify_error(&e);
            return Err(e);
        }

        let mode = self.inner.lock().mode;
        let callback = self.sample_callback();
        let result = self
            .provider
            .lock()
            .acquire(StreamConstraints::for_mode(mode), callback);

        if let Err(e) = result {
            if e == CaptureError::PermissionDenied {
                self.inner.lock().permission_blocked = true;
            }
            log::error!("device acquisition failed: {}", e);
            self.notify_error(&e);
            return Err(e);
        }
        Ok(())
    }

    fn release_device(&self) {
        if let Err(e) = self.provider.lock().release() {
            log::warn!("device release failed: {}", e);
        }
        *self.latest_frame.lock() = None;
    }

    /// Countdown-at-zero path. Skips silently when the frame cache is empty
    /// or the handle is gone; a released device mid-countdown is a defined
    /// no-op, not an error.
    fn grab_photo(
        inner: &Arc<Mutex<ModalInner>>,
        provider: &Arc<Mutex<D>>,
        latest_frame: &Arc<Mutex<Option<VideoFrame>>>,
        delegate: &Option<Arc<dyn CaptureDelegate>>,
        quality: u8,
    ) {
        let frame = latest_frame.lock().clone();
        let Some(frame) = frame else {
            log::debug!("countdown reached zero with no live frame, skipping grab");
            return;
        };
        if !provider.lock().is_active() {
            log::debug!("countdown reached zero after device release, skipping grab");
            return;
        }

        match photo::encode_frame(&frame, quality) {
            Ok(artifact) => Self::enter_preview(inner, provider, latest_frame, delegate, artifact),
            Err(e) => {
                log::error!("photo encoding failed: {}", e);
                if let Some(d) = delegate {
                    d.on_error(&e);
                }
            }
        }
    }

    /// Shared stop path for explicit stops and the ceiling watchdog.
    fn finish_recording(
        inner: &Arc<Mutex<ModalInner>>,
        provider: &Arc<Mutex<D>>,
        latest_frame: &Arc<Mutex<Option<VideoFrame>>>,
        delegate: &Option<Arc<dyn CaptureDelegate>>,
        recording_live: &Arc<AtomicBool>,
    ) {
        let outcome = {
            let mut guard = inner.lock();
            if guard.recorder.state().is_idle() {
                return;
            }
            // Let the provider flush its final chunk before the gate drops.
            let _ = provider.lock().stop_recorder();
            recording_live.store(false, Ordering::SeqCst);
            guard.recorder.stop()
        };

        if let Some(d) = delegate {
            d.on_recording_changed(&RecordingState::Idle);
        }

        match outcome {
            StopOutcome::Clip { data, duration_secs } => {
                let artifact = MediaArtifact::new(MediaKind::Video, data, Some(duration_secs));
                Self::enter_preview(inner, provider, latest_frame, delegate, artifact);
            }
            StopOutcome::Empty => {
                log::warn!("recording stopped with no chunks, nothing to preview");
                let e = CaptureError::EncodingFailed("recording produced no data".into());
                if let Some(d) = delegate {
                    d.on_error(&e);
                }
            }
            StopOutcome::AlreadyIdle => {}
        }
    }

    /// Capturing → Previewing. Releases the device handle (the live feed
    /// ends the moment an artifact is under review) and bails out if the
    /// session moved on while the artifact was being assembled.
    fn enter_preview(
        inner: &Arc<Mutex<ModalInner>>,
        provider: &Arc<Mutex<D>>,
        latest_frame: &Arc<Mutex<Option<VideoFrame>>>,
        delegate: &Option<Arc<dyn CaptureDelegate>>,
        artifact: MediaArtifact,
    ) {
        {
            let mut guard = inner.lock();
            if !guard.open || !guard.flow.is_capturing() {
                log::debug!("capture finished after session moved on, discarding artifact");
                return;
            }
            guard.preview = Some(PreviewStage::new(artifact));
            guard.flow = FlowState::Previewing;
        }

        if let Err(e) = provider.lock().release() {
            log::warn!("device release failed: {}", e);
        }
        *latest_frame.lock() = None;

        if let Some(d) = delegate {
            d.on_flow_changed(&FlowState::Previewing);
        }
    }

    fn close_modal(&mut self) {
        let was_recording = {
            let mut inner = self.inner.lock();
            inner.countdown.cancel();
            if inner.recorder.is_recording() {
                let _ = self.provider.lock().stop_recorder();
                self.recording_live.store(false, Ordering::SeqCst);
                let _ = inner.recorder.stop();
                true
            } else {
                false
            }
        };
        if was_recording {
            self.notify_recording(RecordingState::Idle);
        }

        self.release_device();
        self.inner.lock().open = false;
        self.schedule_reset();
    }

    /// Wind the session back to a fresh `Capturing` after `RESET_DELAY`.
    fn schedule_reset(&self) {
        let my_gen = {
            let mut inner = self.inner.lock();
            inner.reset_generation += 1;
            inner.reset_generation
        };

        let inner = Arc::clone(&self.inner);
        let delegate = self.delegate.clone();

        let spawned = thread::Builder::new().name("modal-reset".into()).spawn(move || {
            thread::sleep(RESET_DELAY);
            {
                let mut guard = inner.lock();
                if guard.reset_generation != my_gen {
                    return;
                }
                guard.flow = FlowState::Capturing;
                guard.preview = None;
                guard.permission_blocked = false;
            }
            if let Some(d) = delegate {
                d.on_flow_changed(&FlowState::Capturing);
            }
        });
        if let Err(e) = spawned {
            log::error!("failed to spawn reset thread: {}", e);
        }
    }

    fn notify_flow(&self, state: FlowState) {
        if let Some(ref d) = self.delegate {
            d.on_flow_changed(&state);
        }
    }

    fn notify_recording(&self, state: RecordingState) {
        if let Some(ref d) = self.delegate {
            d.on_recording_changed(&state);
        }
    }

    fn notify_error(&self, error: &CaptureError) {
        if let Some(ref d) = self.delegate {
            d.on_error(error);
        }
    }
}

impl<D: DeviceProvider + 'static> Drop for CaptureModal<D> {
    fn drop(&mut self) {
        {
            let mut inner = self.inner.lock();
            inner.countdown.cancel();
            inner.reset_generation += 1;
            if inner.recorder.is_recording() {
                let _ = self.provider.lock().stop_recorder();
                self.recording_live.store(false, Ordering::SeqCst);
                let _ = inner.recorder.stop();
            }
        }
        let _ = self.provider.lock().release();
    }
}
