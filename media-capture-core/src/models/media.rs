use serde::{Deserialize, Serialize};

use crate::models::mode::CaptureMode;

/// One decoded frame from a live video stream.
///
/// Pixels are tightly packed RGBA8, row-major, `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Monotonic sequence number assigned by the producing device.
    pub sequence: u64,
}

impl VideoFrame {
    /// Byte length expected for the declared dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// A sample delivered by a device provider while a stream is live.
///
/// Frames flow for the whole lifetime of an acquisition; chunks flow only
/// between `start_recorder` and `stop_recorder`. Chunk payloads are opaque
/// encoded fragments; arrival order is the only ordering contract, and the
/// assembled clip is their exact concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSample {
    Frame(VideoFrame),
    Chunk(Vec<u8>),
}

/// A media input device available for capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDeviceInfo {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    /// Whether the device can supply an audio track in addition to video.
    pub has_audio: bool,
}

/// Track requirements for an acquisition, mirroring the environment's
/// media-device request shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub video: bool,
    pub audio: bool,
}

impl StreamConstraints {
    /// Constraints for a capture mode: video always, audio only when the
    /// mode records sound.
    pub fn for_mode(mode: CaptureMode) -> Self {
        Self {
            video: true,
            audio: mode.requires_audio(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mode::CaptureMode;

    #[test]
    fn photo_constraints_have_no_audio() {
        let c = StreamConstraints::for_mode(CaptureMode::Photo);
        assert!(c.video);
        assert!(!c.audio);
    }

    #[test]
    fn video_constraints_request_audio() {
        let c = StreamConstraints::for_mode(CaptureMode::Video);
        assert!(c.video);
        assert!(c.audio);
    }
}
