//! Synthetic camera device.
//!
//! Generates an animated test-pattern video stream on a dedicated thread
//! and delivers it through the core `SampleCallback`. While the recorder is
//! engaged, every frame is additionally wrapped into an opaque chunk record
//! so the full capture pipeline can run without hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use media_capture_core::{
    CaptureError, DeviceProvider, MediaDeviceInfo, MediaSample, SampleCallback,
    StreamConstraints, VideoFrame,
};

use crate::permissions::{check_camera_permission, PermissionPolicy};

/// Magic prefix of a chunk record emitted by the synthetic recorder.
pub const CHUNK_MAGIC: &[u8; 4] = b"VFRM";

/// Configuration for a synthetic camera.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticCameraConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub permission: PermissionPolicy,
}

impl Default for SyntheticCameraConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            fps: 30,
            permission: PermissionPolicy::Granted,
        }
    }
}

/// Test-pattern camera implementing `DeviceProvider`.
///
/// Frames are produced on a named thread for the lifetime of an
/// acquisition; `release` stops the thread and joins it, so no frame can be
/// delivered after release returns.
pub struct SyntheticCamera {
    config: SyntheticCameraConfig,
    running: Arc<AtomicBool>,
    recording: Arc<AtomicBool>,
    frame_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl SyntheticCamera {
    pub fn new(config: SyntheticCameraConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            recording: Arc::new(AtomicBool::new(false)),
            frame_handle: Mutex::new(None),
        }
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new(SyntheticCameraConfig::default())
    }
}

impl DeviceProvider for SyntheticCamera {
    fn is_available(&self) -> bool {
        true
    }

    fn acquire(
        &mut self,
        constraints: StreamConstraints,
        callback: SampleCallback,
    ) -> Result<(), CaptureError> {
        check_camera_permission(self.config.permission)?;

        if self.running.load(Ordering::SeqCst) {
            return Err(CaptureError::InvalidState(
                "camera already acquired".into(),
            ));
        }

        log::debug!(
            "synthetic camera acquired ({}x{} @ {} fps, audio: {})",
            self.config.width,
            self.config.height,
            self.config.fps,
            constraints.audio
        );

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let recording = Arc::clone(&self.recording);
        let width = self.config.width;
        let height = self.config.height;
        let interval = Duration::from_millis(1000 / self.config.fps.max(1) as u64);

        let handle = thread::Builder::new()
            .name("synthetic-frame-loop".into())
            .spawn(move || {
                let mut sequence: u64 = 0;
                while running.load(Ordering::SeqCst) {
                    thread::sleep(interval);
                    if !running.load(Ordering::SeqCst) {
                        break;
                    }

                    let frame = test_pattern_frame(width, height, sequence);
                    if recording.load(Ordering::SeqCst) {
                        callback(MediaSample::Chunk(chunk_record(&frame)));
                    }
                    callback(MediaSample::Frame(frame));
                    sequence += 1;
                }
            })
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn frame thread: {}", e)))?;

        *self.frame_handle.lock() = Some(handle);
        Ok(())
    }

    fn release(&mut self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::SeqCst);
        self.recording.store(false, Ordering::SeqCst);
        if let Some(handle) = self.frame_handle.lock().take() {
            let _ = handle.join();
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn start_recorder(&mut self) -> Result<(), CaptureError> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(CaptureError::InvalidState(
                "recorder needs an active stream".into(),
            ));
        }
        self.recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop_recorder(&mut self) -> Result<(), CaptureError> {
        self.recording.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn device_info(&self) -> MediaDeviceInfo {
        MediaDeviceInfo {
            id: "synthetic-0".into(),
            name: "Synthetic Camera".into(),
            is_default: true,
            has_audio: true,
        }
    }
}

impl Drop for SyntheticCamera {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// Animated gradient test pattern. The sequence number shifts the gradient
/// so consecutive frames differ visibly.
fn test_pattern_frame(width: u32, height: u32, sequence: u64) -> VideoFrame {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    let shift = (sequence % 256) as u32;
    for y in 0..height {
        for x in 0..width {
            let r = ((x + shift) % 256) as u8;
            let g = ((y + shift) % 256) as u8;
            let b = ((x + y) % 256) as u8;
            pixels.extend_from_slice(&[r, g, b, 0xFF]);
        }
    }
    VideoFrame {
        width,
        height,
        pixels,
        sequence,
    }
}

/// Wrap a frame into an opaque chunk record:
///
/// ```text
/// [0..4]   "VFRM"
/// [4..12]  frame sequence (u64 LE)
/// [12..16] payload length (u32 LE)
/// [16..]   payload (raw RGBA pixels)
/// ```
///
/// Concatenated records form the assembled clip, so decoding a clip is a
/// matter of walking the records in order.
fn chunk_record(frame: &VideoFrame) -> Vec<u8> {
    let mut record = Vec::with_capacity(16 + frame.pixels.len());
    record.extend_from_slice(CHUNK_MAGIC);
    record.extend_from_slice(&frame.sequence.to_le_bytes());
    record.extend_from_slice(&(frame.pixels.len() as u32).to_le_bytes());
    record.extend_from_slice(&frame.pixels);
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_config() -> SyntheticCameraConfig {
        SyntheticCameraConfig {
            width: 8,
            height: 8,
            fps: 100,
            permission: PermissionPolicy::Granted,
        }
    }

    fn collecting_callback() -> (SampleCallback, Arc<Mutex<Vec<MediaSample>>>) {
        let samples = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&samples);
        let callback: SampleCallback = Arc::new(move |sample| sink.lock().push(sample));
        (callback, samples)
    }

    #[test]
    fn delivers_frames_in_sequence_until_release() {
        let mut camera = SyntheticCamera::new(tiny_config());
        let (callback, samples) = collecting_callback();

        camera.acquire(StreamConstraints { video: true, audio: false }, callback).unwrap();
        assert!(camera.is_active());

        thread::sleep(Duration::from_millis(120));
        camera.release().unwrap();
        assert!(!camera.is_active());

        let delivered = samples.lock();
        assert!(delivered.len() >= 2);

        let mut last_seq = None;
        for sample in delivered.iter() {
            match sample {
                MediaSample::Frame(frame) => {
                    assert_eq!(frame.width, 8);
                    assert_eq!(frame.pixels.len(), frame.expected_len());
                    if let Some(prev) = last_seq {
                        assert!(frame.sequence > prev);
                    }
                    last_seq = Some(frame.sequence);
                }
                MediaSample::Chunk(_) => panic!("no chunks without an engaged recorder"),
            }
        }
    }

    #[test]
    fn no_samples_after_release_returns() {
        let mut camera = SyntheticCamera::new(tiny_config());
        let (callback, samples) = collecting_callback();

        camera.acquire(StreamConstraints { video: true, audio: false }, callback).unwrap();
        thread::sleep(Duration::from_millis(60));
        camera.release().unwrap();

        let count = samples.lock().len();
        thread::sleep(Duration::from_millis(60));
        assert_eq!(samples.lock().len(), count);
    }

    #[test]
    fn denied_permission_refuses_acquisition() {
        let mut camera = SyntheticCamera::new(SyntheticCameraConfig {
            permission: PermissionPolicy::Denied,
            ..tiny_config()
        });
        let (callback, _) = collecting_callback();

        let err = camera
            .acquire(StreamConstraints { video: true, audio: true }, callback)
            .unwrap_err();
        assert_eq!(err, CaptureError::PermissionDenied);
        assert!(!camera.is_active());
    }

    #[test]
    fn double_acquire_is_rejected() {
        let mut camera = SyntheticCamera::new(tiny_config());
        let (callback, _) = collecting_callback();

        camera.acquire(StreamConstraints { video: true, audio: false }, Arc::clone(&callback)).unwrap();
        let err = camera
            .acquire(StreamConstraints { video: true, audio: false }, callback)
            .unwrap_err();
        assert!(matches!(err, CaptureError::InvalidState(_)));

        camera.release().unwrap();
    }

    #[test]
    fn release_is_idempotent() {
        let mut camera = SyntheticCamera::new(tiny_config());
        let (callback, _) = collecting_callback();

        camera.acquire(StreamConstraints { video: true, audio: false }, callback).unwrap();
        camera.release().unwrap();
        camera.release().unwrap();
        assert!(!camera.is_active());
    }

    #[test]
    fn chunks_flow_only_while_recorder_engaged() {
        let mut camera = SyntheticCamera::new(tiny_config());
        let (callback, samples) = collecting_callback();

        camera.acquire(StreamConstraints { video: true, audio: true }, callback).unwrap();

        camera.start_recorder().unwrap();
        thread::sleep(Duration::from_millis(80));
        camera.stop_recorder().unwrap();
        // Let any in-flight frame iteration drain before snapshotting.
        thread::sleep(Duration::from_millis(50));
        let chunks_while_recording: Vec<Vec<u8>> = samples
            .lock()
            .iter()
            .filter_map(|s| match s {
                MediaSample::Chunk(data) => Some(data.clone()),
                _ => None,
            })
            .collect();

        thread::sleep(Duration::from_millis(80));
        camera.release().unwrap();

        assert!(!chunks_while_recording.is_empty());
        for chunk in &chunks_while_recording {
            assert_eq!(&chunk[0..4], CHUNK_MAGIC);
            let len = u32::from_le_bytes([chunk[12], chunk[13], chunk[14], chunk[15]]) as usize;
            assert_eq!(chunk.len(), 16 + len);
        }

        // Recorder disengaged: chunk count stopped growing.
        let total_chunks = samples
            .lock()
            .iter()
            .filter(|s| matches!(s, MediaSample::Chunk(_)))
            .count();
        assert_eq!(total_chunks, chunks_while_recording.len());
    }

    #[test]
    fn drives_the_full_capture_modal_pipeline() {
        use media_capture_core::{CaptureConfig, CaptureModal, CaptureMode, MediaKind};

        let camera = SyntheticCamera::new(tiny_config());
        let config = CaptureConfig {
            countdown_secs: 1,
            ..Default::default()
        };
        let mut modal = CaptureModal::new(camera, config).unwrap();

        // Photo path: live frames feed the countdown grab.
        modal.open().unwrap();
        thread::sleep(Duration::from_millis(60));
        modal.arm_countdown().unwrap();
        thread::sleep(Duration::from_millis(1400));

        assert!(modal.flow_state().is_previewing());
        let photo = modal.artifact().expect("photo artifact");
        assert_eq!(photo.kind, MediaKind::Image);
        assert_eq!(&photo.data[0..2], &[0xFF, 0xD8]);

        // Video path after a retake: recorded chunks assemble into a clip.
        modal.retake().unwrap();
        modal.set_mode(CaptureMode::Video).unwrap();
        modal.start_recording().unwrap();
        thread::sleep(Duration::from_millis(120));
        modal.stop_recording();

        assert!(modal.flow_state().is_previewing());
        let clip = modal.artifact().expect("clip artifact");
        assert_eq!(clip.kind, MediaKind::Video);
        assert_eq!(&clip.data[0..4], CHUNK_MAGIC);

        modal.close();
    }

    #[test]
    fn recorder_requires_active_stream() {
        let mut camera = SyntheticCamera::new(tiny_config());
        assert!(matches!(
            camera.start_recorder(),
            Err(CaptureError::InvalidState(_))
        ));
    }
}
