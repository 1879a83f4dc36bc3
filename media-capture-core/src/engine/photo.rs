//! Photo frame grab encoding.
//!
//! Turns the most recent live-preview frame into a still-image artifact at
//! the frame's native resolution. JPEG output at high quality; the artifact
//! is directly displayable without further processing.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, RgbaImage};

use crate::models::artifact::{MediaArtifact, MediaKind};
use crate::models::error::CaptureError;
use crate::models::media::VideoFrame;

/// Encode a grabbed frame into an image artifact.
pub fn encode_frame(frame: &VideoFrame, quality: u8) -> Result<MediaArtifact, CaptureError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CaptureError::EncodingFailed("frame has zero dimensions".into()));
    }
    if frame.pixels.len() != frame.expected_len() {
        return Err(CaptureError::EncodingFailed(format!(
            "frame byte length {} does not match {}x{} RGBA",
            frame.pixels.len(),
            frame.width,
            frame.height
        )));
    }

    let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.pixels.clone())
        .ok_or_else(|| CaptureError::EncodingFailed("frame buffer rejected".into()))?;

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();

    let mut encoded = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(Cursor::new(&mut encoded), quality);
    encoder
        .encode(rgb.as_raw(), frame.width, frame.height, ExtendedColorType::Rgb8)
        .map_err(|e| CaptureError::EncodingFailed(format!("jpeg encode failed: {}", e)))?;

    log::debug!(
        "encoded {}x{} frame into {} byte jpeg",
        frame.width,
        frame.height,
        encoded.len()
    );

    Ok(MediaArtifact::new(MediaKind::Image, encoded, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32) -> VideoFrame {
        VideoFrame {
            width,
            height,
            pixels: vec![0x80; (width * height * 4) as usize],
            sequence: 1,
        }
    }

    #[test]
    fn encodes_jpeg_with_soi_marker() {
        let artifact = encode_frame(&solid_frame(16, 8), 92).unwrap();

        assert_eq!(artifact.kind, MediaKind::Image);
        assert!(artifact.duration_secs.is_none());
        // JPEG start-of-image marker.
        assert_eq!(&artifact.data[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn rejects_zero_dimensions() {
        let frame = VideoFrame {
            width: 0,
            height: 8,
            pixels: Vec::new(),
            sequence: 0,
        };
        assert!(matches!(
            encode_frame(&frame, 92),
            Err(CaptureError::EncodingFailed(_))
        ));
    }

    #[test]
    fn rejects_mismatched_buffer_length() {
        let frame = VideoFrame {
            width: 4,
            height: 4,
            pixels: vec![0; 10],
            sequence: 0,
        };
        assert!(matches!(
            encode_frame(&frame, 92),
            Err(CaptureError::EncodingFailed(_))
        ));
    }
}
