/// Modal flow state machine.
///
/// State transitions:
/// ```text
/// capturing → previewing → complete
///     ↑           |            |
///     └── retake ─┘            |
///     └──── (delayed reset) ───┘
/// ```
///
/// `Capturing` is the initial state of every modal session. `Complete` is
/// terminal per accepted capture; a short delayed reset returns the modal to
/// `Capturing` so the next open starts clean. Cancel/close from any state
/// also lands back in `Capturing` after the same delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Capturing,
    Previewing,
    Complete,
}

impl FlowState {
    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing)
    }

    pub fn is_previewing(&self) -> bool {
        matches!(self, Self::Previewing)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Video recorder state.
///
/// Transitions to `Recording` only while mode = video with an active device
/// handle, and back to `Idle` on explicit stop or at the recording ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    Idle,
    Recording,
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }
}
