//! # media-capture-core
//!
//! Platform-agnostic media capture core library.
//!
//! Provides the capture modal state machine, photo and video capture
//! engines, preview/decision stage, and artifact export. Environment
//! backends (cameras, virtual test sources) implement the `DeviceProvider`
//! trait and plug into the generic `CaptureModal`.
//!
//! ## Architecture
//!
//! ```text
//! media-capture-core (this crate)
//! ├── traits/    ← DeviceProvider, CaptureDelegate
//! ├── models/    ← CaptureError, CaptureMode, FlowState, MediaArtifact, CaptureConfig, etc.
//! ├── engine/    ← Countdown, photo encoding, ClipRecorder, ChunkAssembler
//! ├── session/   ← CaptureModal (orchestrator), PreviewStage
//! └── storage/   ← artifact download/export, metadata sidecars
//! ```

pub mod engine;
pub mod models;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use engine::chunks::ChunkAssembler;
pub use engine::countdown::Countdown;
pub use engine::recorder::{ClipRecorder, StopOutcome, RECORDING_CEILING};
pub use models::artifact::{ArtifactMetadata, MediaArtifact, MediaKind};
pub use models::config::CaptureConfig;
pub use models::error::CaptureError;
pub use models::media::{MediaDeviceInfo, MediaSample, StreamConstraints, VideoFrame};
pub use models::mode::CaptureMode;
pub use models::state::{FlowState, RecordingState};
pub use session::modal::{CaptureModal, RESET_DELAY};
pub use session::preview::PreviewStage;
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::device_provider::{DeviceProvider, SampleCallback};
