//! Accepted product image types.

use core::fmt;

/// An image content type the catalog accepts for product uploads.
///
/// Only PNG and JPEG are allowed. `image/jpg` is not a registered MIME type
/// but some clients send it, so it is accepted and keeps its own extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Png,
    Jpeg,
    Jpg,
}

impl ImageType {
    /// Look up an allowed image type by its MIME type.
    ///
    /// Returns `None` for anything outside the allow-list.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/jpg" => Some(Self::Jpg),
            _ => None,
        }
    }

    /// File extension used for stored files, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Jpg => "jpg",
        }
    }

    /// Canonical MIME type string.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Jpg => "image/jpg",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert_eq!(ImageType::from_mime("image/png"), Some(ImageType::Png));
        assert_eq!(ImageType::from_mime("image/jpeg"), Some(ImageType::Jpeg));
        assert_eq!(ImageType::from_mime("image/jpg"), Some(ImageType::Jpg));
        assert_eq!(ImageType::from_mime("IMAGE/PNG"), Some(ImageType::Png));
    }

    #[test]
    fn test_rejects_other_types() {
        assert_eq!(ImageType::from_mime("image/gif"), None);
        assert_eq!(ImageType::from_mime("image/svg+xml"), None);
        assert_eq!(ImageType::from_mime("application/pdf"), None);
        assert_eq!(ImageType::from_mime(""), None);
    }

    #[test]
    fn test_extension_matches_mime() {
        for ty in [ImageType::Png, ImageType::Jpeg, ImageType::Jpg] {
            assert_eq!(ImageType::from_mime(ty.mime()), Some(ty));
            assert!(ty.mime().ends_with(ty.extension()));
        }
    }
}
