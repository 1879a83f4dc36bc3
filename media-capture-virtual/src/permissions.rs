//! Simulated camera privacy gate.
//!
//! Real camera backends sit behind an environment permission boundary
//! (browser prompts, OS privacy settings). The virtual backend reproduces
//! that boundary with an explicit policy so consumers can exercise both the
//! granted and the blocked path deterministically.

use media_capture_core::CaptureError;

/// Outcome the environment would return for a camera access request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionPolicy {
    #[default]
    Granted,
    Denied,
}

impl PermissionPolicy {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Check camera access against the configured policy.
///
/// Denial maps to `CaptureError::PermissionDenied`, which callers surface
/// as a blocked state rather than retrying.
pub fn check_camera_permission(policy: PermissionPolicy) -> Result<(), CaptureError> {
    if policy.is_granted() {
        Ok(())
    } else {
        Err(CaptureError::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_policy_passes() {
        assert!(check_camera_permission(PermissionPolicy::Granted).is_ok());
    }

    #[test]
    fn denied_policy_maps_to_permission_error() {
        assert_eq!(
            check_camera_permission(PermissionPolicy::Denied),
            Err(CaptureError::PermissionDenied)
        );
    }
}
