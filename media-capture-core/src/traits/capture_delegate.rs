use crate::models::artifact::MediaArtifact;
use crate::models::error::CaptureError;
use crate::models::state::{FlowState, RecordingState};

/// Event delegate for capture modal notifications.
///
/// All methods are called from timer or device-callback threads, not the UI
/// thread. Implementations should marshal to the UI thread if needed.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the modal flow state changes.
    fn on_flow_changed(&self, state: &FlowState);

    /// Called once per second while a photo countdown is armed, with the
    /// remaining seconds (the final call reports 0).
    fn on_countdown_tick(&self, remaining: u32);

    /// Called when the recorder transitions between idle and recording.
    fn on_recording_changed(&self, state: &RecordingState);

    /// Called exactly once per accepted capture with the finished artifact.
    /// Never called on retake or cancel.
    fn on_media_captured(&self, artifact: &MediaArtifact);

    /// Called when an error occurs during the session.
    fn on_error(&self, error: &CaptureError);
}
