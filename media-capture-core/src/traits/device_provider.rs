use std::sync::Arc;

use crate::models::error::CaptureError;
use crate::models::media::{MediaDeviceInfo, MediaSample, StreamConstraints};

/// Callback invoked when a media sample is available.
///
/// Frames arrive for the whole lifetime of an acquisition; chunks arrive
/// only while the provider's recorder is engaged. The callback fires on the
/// provider's delivery thread — keep processing minimal.
pub type SampleCallback = Arc<dyn Fn(MediaSample) + Send + Sync + 'static>;

/// Interface for environment-specific media input devices.
///
/// The provider owns the underlying hardware tracks. Callers must hold at
/// most one live acquisition and release it before (or immediately after)
/// requesting another; reacquisition without release risks orphaned
/// hardware locks.
pub trait DeviceProvider: Send + Sync {
    /// Whether this device is currently available for acquisition.
    fn is_available(&self) -> bool;

    /// Acquire the device with the given track constraints, delivering
    /// samples via `callback` until released.
    ///
    /// Fails with `CaptureError::PermissionDenied` when the environment
    /// refuses access; the caller surfaces a blocked state and does not
    /// retry automatically.
    fn acquire(
        &mut self,
        constraints: StreamConstraints,
        callback: SampleCallback,
    ) -> Result<(), CaptureError>;

    /// Stop all underlying tracks and release the device.
    ///
    /// Idempotent; called on every exit path (mode switch, preview
    /// transition, close, teardown).
    fn release(&mut self) -> Result<(), CaptureError>;

    /// Whether an acquisition is currently live.
    fn is_active(&self) -> bool;

    /// Begin delivering encoded chunks alongside frames.
    fn start_recorder(&mut self) -> Result<(), CaptureError>;

    /// Stop chunk delivery. Idempotent.
    fn stop_recorder(&mut self) -> Result<(), CaptureError>;

    /// Information about the device backing this provider.
    fn device_info(&self) -> MediaDeviceInfo;
}
