//! # media-capture-virtual
//!
//! Synthetic camera backend for media-capture-kit.
//!
//! Provides:
//! - `SyntheticCamera` — animated test-pattern device implementing the core
//!   `DeviceProvider` trait, with chunked recording support
//! - `permissions` — simulated camera privacy gate
//!
//! ## Usage
//! ```ignore
//! use media_capture_core::{CaptureConfig, CaptureModal};
//! use media_capture_virtual::SyntheticCamera;
//!
//! let camera = SyntheticCamera::default();
//! let mut modal = CaptureModal::new(camera, CaptureConfig::default())?;
//! modal.open()?;
//! ```

pub mod permissions;
pub mod synthetic_camera;

pub use permissions::PermissionPolicy;
pub use synthetic_camera::{SyntheticCamera, SyntheticCameraConfig, CHUNK_MAGIC};
