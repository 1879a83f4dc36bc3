use crate::models::artifact::{MediaArtifact, MediaKind};

/// Preview/decision stage holding the pending artifact.
///
/// Playback state is local to the preview and never persisted; the decision
/// actions (accept, retake, cancel, download) live on the modal.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewStage {
    artifact: MediaArtifact,
    playing: bool,
    muted: bool,
}

impl PreviewStage {
    pub fn new(artifact: MediaArtifact) -> Self {
        Self {
            artifact,
            playing: false,
            muted: false,
        }
    }

    pub fn artifact(&self) -> &MediaArtifact {
        &self.artifact
    }

    pub fn into_artifact(self) -> MediaArtifact {
        self.artifact
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Toggle playback. Only meaningful for video artifacts; a still image
    /// never enters the playing state.
    pub fn toggle_playback(&mut self) -> bool {
        if self.artifact.kind == MediaKind::Video {
            self.playing = !self.playing;
        }
        self.playing
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_preview() -> PreviewStage {
        PreviewStage::new(MediaArtifact::new(MediaKind::Video, vec![1, 2, 3], Some(2.0)))
    }

    #[test]
    fn starts_paused_and_unmuted() {
        let preview = video_preview();
        assert!(!preview.is_playing());
        assert!(!preview.is_muted());
    }

    #[test]
    fn playback_toggles_for_video() {
        let mut preview = video_preview();
        assert!(preview.toggle_playback());
        assert!(!preview.toggle_playback());
    }

    #[test]
    fn playback_is_a_no_op_for_images() {
        let mut preview =
            PreviewStage::new(MediaArtifact::new(MediaKind::Image, vec![9], None));
        assert!(!preview.toggle_playback());
        assert!(!preview.is_playing());
    }

    #[test]
    fn mute_toggles_for_any_kind() {
        let mut preview = video_preview();
        assert!(preview.toggle_mute());
        assert!(!preview.toggle_mute());
    }
}
