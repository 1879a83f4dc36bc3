//! Video clip recorder.
//!
//! Tracks the idle/recording state, owns the chunk accumulator shared with
//! the device callback, and arms a ceiling watchdog that forces a stop when
//! a recording runs too long. The ceiling bounds artifact size and is not
//! user-configurable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::engine::chunks::ChunkAssembler;
use crate::models::error::CaptureError;
use crate::models::state::RecordingState;

/// Hard maximum recording duration before forced auto-stop.
pub const RECORDING_CEILING: Duration = Duration::from_secs(30);

/// Invoked on the watchdog thread when a recording hits the ceiling and has
/// not been stopped. The callee is expected to run the normal stop path.
pub type CeilingCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Result of stopping the recorder.
#[derive(Debug, PartialEq)]
pub enum StopOutcome {
    /// Stop called while already idle; nothing happened.
    AlreadyIdle,
    /// Recording ended but no chunks arrived; no artifact can be assembled.
    Empty,
    /// Recording ended with data; chunks concatenated in arrival order.
    Clip { data: Vec<u8>, duration_secs: f64 },
}

pub struct ClipRecorder {
    state: RecordingState,
    assembler: Arc<Mutex<ChunkAssembler>>,
    started_at: Option<Instant>,
    generation: Arc<AtomicU64>,
    ceiling: Duration,
}

impl ClipRecorder {
    pub fn new() -> Self {
        Self {
            state: RecordingState::Idle,
            assembler: Arc::new(Mutex::new(ChunkAssembler::new())),
            started_at: None,
            generation: Arc::new(AtomicU64::new(0)),
            ceiling: RECORDING_CEILING,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_ceiling(&mut self, ceiling: Duration) {
        self.ceiling = ceiling;
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state.is_recording()
    }

    /// The accumulator the device callback writes chunks into.
    pub fn assembler(&self) -> Arc<Mutex<ChunkAssembler>> {
        Arc::clone(&self.assembler)
    }

    /// Elapsed time of the in-progress recording.
    pub fn elapsed(&self) -> Duration {
        self.started_at.map(|t| t.elapsed()).unwrap_or(Duration::ZERO)
    }

    /// Begin a recording: clears stale chunks, transitions to `Recording`,
    /// and arms the ceiling watchdog.
    pub fn start(&mut self, on_ceiling: CeilingCallback) -> Result<(), CaptureError> {
        if self.state.is_recording() {
            return Err(CaptureError::InvalidState("recording already in progress".into()));
        }

        self.assembler.lock().clear();
        self.state = RecordingState::Recording;
        self.started_at = Some(Instant::now());

        let my_gen = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let ceiling = self.ceiling;

        thread::Builder::new()
            .name("recording-ceiling".into())
            .spawn(move || {
                thread::sleep(ceiling);
                if generation.load(Ordering::SeqCst) == my_gen {
                    log::debug!("recording ceiling of {:?} reached, forcing stop", ceiling);
                    on_ceiling();
                }
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn ceiling thread: {}", e)))?;

        Ok(())
    }

    /// Stop the recording and flush accumulated chunks.
    ///
    /// Idempotent: stopping an idle recorder reports `AlreadyIdle` and has
    /// no further effect.
    pub fn stop(&mut self) -> StopOutcome {
        if self.state.is_idle() {
            return StopOutcome::AlreadyIdle;
        }

        // Invalidate the watchdog before anything else so a concurrent
        // ceiling firing cannot double-stop.
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state = RecordingState::Idle;
        let duration_secs = self
            .started_at
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        match self.assembler.lock().finish() {
            Some(data) => StopOutcome::Clip { data, duration_secs },
            None => StopOutcome::Empty,
        }
    }
}

impl Default for ClipRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ClipRecorder {
    fn drop(&mut self) {
        // Detach any live watchdog.
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn noop_ceiling() -> CeilingCallback {
        Arc::new(|| {})
    }

    #[test]
    fn clip_preserves_chunk_arrival_order() {
        let mut recorder = ClipRecorder::new();
        recorder.start(noop_ceiling()).unwrap();
        assert!(recorder.is_recording());

        let assembler = recorder.assembler();
        assembler.lock().push(b"A".to_vec());
        assembler.lock().push(b"B".to_vec());
        assembler.lock().push(b"C".to_vec());

        match recorder.stop() {
            StopOutcome::Clip { data, duration_secs } => {
                assert_eq!(data, b"ABC".to_vec());
                assert!(duration_secs >= 0.0);
            }
            other => panic!("expected clip, got {:?}", other),
        }
        assert!(recorder.state().is_idle());
    }

    #[test]
    fn double_stop_is_idempotent() {
        let mut recorder = ClipRecorder::new();
        recorder.start(noop_ceiling()).unwrap();
        recorder.assembler().lock().push(vec![1]);

        assert!(matches!(recorder.stop(), StopOutcome::Clip { .. }));
        assert_eq!(recorder.stop(), StopOutcome::AlreadyIdle);
    }

    #[test]
    fn stop_without_chunks_reports_empty() {
        let mut recorder = ClipRecorder::new();
        recorder.start(noop_ceiling()).unwrap();

        assert_eq!(recorder.stop(), StopOutcome::Empty);
    }

    #[test]
    fn starting_twice_is_rejected() {
        let mut recorder = ClipRecorder::new();
        recorder.start(noop_ceiling()).unwrap();

        let err = recorder.start(noop_ceiling()).unwrap_err();
        assert!(matches!(err, CaptureError::InvalidState(_)));

        recorder.stop();
    }

    #[test]
    fn start_clears_stale_chunks() {
        let mut recorder = ClipRecorder::new();
        recorder.assembler().lock().push(b"stale".to_vec());

        recorder.start(noop_ceiling()).unwrap();
        recorder.assembler().lock().push(b"fresh".to_vec());

        match recorder.stop() {
            StopOutcome::Clip { data, .. } => assert_eq!(data, b"fresh".to_vec()),
            other => panic!("expected clip, got {:?}", other),
        }
    }

    #[test]
    fn ceiling_fires_when_recording_overruns() {
        let fired = Arc::new(AtomicU32::new(0));
        let fired_cb = Arc::clone(&fired);

        let mut recorder = ClipRecorder::new();
        recorder.set_ceiling(Duration::from_millis(50));
        recorder
            .start(Arc::new(move || {
                fired_cb.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        thread::sleep(Duration::from_millis(200));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn explicit_stop_disarms_the_ceiling() {
        let fired = Arc::new(AtomicU32::new(0));
        let fired_cb = Arc::clone(&fired);

        let mut recorder = ClipRecorder::new();
        recorder.set_ceiling(Duration::from_millis(50));
        recorder
            .start(Arc::new(move || {
                fired_cb.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        recorder.assembler().lock().push(vec![7]);
        assert!(matches!(recorder.stop(), StopOutcome::Clip { .. }));

        thread::sleep(Duration::from_millis(200));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
