use serde::{Deserialize, Serialize};

/// Capture mode selected in the modal.
///
/// Modes are mutually exclusive. Switching invalidates the active device
/// handle because the audio-track requirement differs per mode, so the
/// session releases and re-acquires on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    Photo,
    Video,
}

impl CaptureMode {
    /// Whether this mode needs an audio track alongside video.
    pub fn requires_audio(&self) -> bool {
        matches!(self, Self::Video)
    }
}
