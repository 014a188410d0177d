use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a file by its MIME type. Anything not `image/*` is treated as video,
    /// since the upload picker only accepts images and videos.
    pub fn from_mime(mime: &str) -> Self {
        if mime.trim().to_ascii_lowercase().starts_with("image/") {
            MediaKind::Image
        } else {
            MediaKind::Video
        }
    }
}

/// A media attachment on a service request. The locator is opaque to the board
/// (in the browser it is an object URL for the selected file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub locator: String,
}

impl MediaItem {
    pub fn new(kind: MediaKind, locator: impl Into<String>) -> Self {
        Self {
            kind,
            locator: locator.into(),
        }
    }

    pub fn from_mime(mime: &str, locator: impl Into<String>) -> Self {
        Self::new(MediaKind::from_mime(mime), locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_mime_prefix() {
        assert_eq!(MediaKind::from_mime("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("IMAGE/JPEG"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime(""), MediaKind::Video);
    }
}
