use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Kind tag carried by every captured artifact.
///
/// String forms (`"image"` / `"video"`) are the outward contract used in
/// references, metadata, and download filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    /// File extension used when an artifact of this kind is exported.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Video => "webm",
        }
    }
}

/// A captured still image or assembled video clip.
///
/// Produced once per successful capture and immutable from then on; a
/// retake discards the artifact and produces a new one, never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaArtifact {
    pub id: String,
    /// URL-like handle handed to consumers: `media://{kind}/{id}`.
    pub reference: String,
    pub kind: MediaKind,
    pub data: Vec<u8>,
    /// SHA-256 hex digest of `data`.
    pub checksum: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// Clip length for video artifacts; `None` for stills.
    pub duration_secs: Option<f64>,
}

impl MediaArtifact {
    pub fn new(kind: MediaKind, data: Vec<u8>, duration_secs: Option<f64>) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let reference = format!("media://{}/{}", kind.as_str(), id);
        let checksum = sha256_hex(&data);
        Self {
            id,
            reference,
            kind,
            data,
            checksum,
            created_at: chrono::Utc::now().to_rfc3339(),
            duration_secs,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Metadata stored alongside an exported artifact.
///
/// Serializable for the JSON sidecar written next to downloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub id: String,
    pub kind: MediaKind,
    pub reference: String,
    pub byte_len: usize,
    pub checksum: String,
    pub created_at: String,
    pub duration_secs: Option<f64>,
    pub file_path: String,
}

impl ArtifactMetadata {
    pub fn for_export(artifact: &MediaArtifact, file_path: &str) -> Self {
        Self {
            id: artifact.id.clone(),
            kind: artifact.kind,
            reference: artifact.reference.clone(),
            byte_len: artifact.data.len(),
            checksum: artifact.checksum.clone(),
            created_at: artifact.created_at.clone(),
            duration_secs: artifact.duration_secs,
            file_path: file_path.to_string(),
        }
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
