//! Product image uploads.
//!
//! Reads `multipart/form-data` bodies, checks every file against the image
//! allow-list, and writes accepted files to the upload directory, which is
//! served back under [`UPLOADS_ROUTE`].
//!
//! Stored files are named `<original-name-with-spaces-as-dashes>-<unix-millis>.<ext>`,
//! e.g. `blue shirt.png` uploaded as PNG becomes `blue-shirt.png-1718000000000.png`.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use chrono::Utc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use url::Url;

use catalog_core::ImageType;

/// URL prefix under which uploaded files are served.
pub const UPLOADS_ROUTE: &str = "/public/uploads";

/// Maximum number of gallery images in one request.
pub const MAX_GALLERY_IMAGES: usize = 10;

/// Errors that can occur while receiving or storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    /// No file was attached under the expected field.
    #[error("no image in the request")]
    NoImage,

    /// More files than the route accepts.
    #[error("at most {max} image(s) may be attached")]
    TooManyFiles { max: usize },

    /// A file was attached under a field the route does not accept.
    #[error("unexpected file field: {0}")]
    UnexpectedField(String),

    /// The file's content type is outside the allow-list.
    #[error("invalid image type: {0}")]
    InvalidType(String),

    /// The multipart body could not be read.
    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    /// The request origin cannot be turned into an upload URL.
    #[error("invalid request origin: {0}")]
    InvalidOrigin(String),

    /// Writing the file failed.
    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Whether the error was caused by the client rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// An accepted image, held in memory until it is stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    original_name: String,
    image_type: ImageType,
    bytes: Bytes,
}

impl ImageUpload {
    /// Accept a file if its content type is on the allow-list.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::InvalidType` for any other content type.
    pub fn new(
        original_name: &str,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> Result<Self, UploadError> {
        let content_type = content_type.unwrap_or_default();
        let image_type = ImageType::from_mime(content_type)
            .ok_or_else(|| UploadError::InvalidType(content_type.to_owned()))?;

        Ok(Self {
            original_name: original_name.to_owned(),
            image_type,
            bytes,
        })
    }

    /// The detected image type.
    #[must_use]
    pub const fn image_type(&self) -> ImageType {
        self.image_type
    }

    /// File name to store this upload under for the given timestamp.
    ///
    /// Only the last path component of the client-supplied name is used.
    #[must_use]
    pub fn stored_file_name(&self, unix_millis: i64) -> String {
        let base = Path::new(&self.original_name)
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.is_empty())
            .unwrap_or("image");
        let base = base.split(' ').collect::<Vec<_>>().join("-");

        format!("{base}-{unix_millis}.{}", self.image_type.extension())
    }
}

/// Text fields and image files read from one multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<ImageUpload>,
}

impl UploadForm {
    /// Read a multipart body, accepting files only under `file_field`.
    ///
    /// Every file is checked against the allow-list as it is read; nothing is
    /// written to disk here.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnexpectedField` for files under any other field,
    /// `UploadError::TooManyFiles` past `max_files`, `UploadError::InvalidType`
    /// for disallowed content types, and `UploadError::Multipart` for
    /// malformed bodies.
    pub async fn read(
        mut multipart: Multipart,
        file_field: &str,
        max_files: usize,
    ) -> Result<Self, UploadError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();

            let Some(file_name) = field.file_name().map(str::to_owned) else {
                let value = field.text().await?;
                form.fields.insert(name, value);
                continue;
            };

            if name != file_field {
                return Err(UploadError::UnexpectedField(name));
            }
            if form.files.len() == max_files {
                return Err(UploadError::TooManyFiles { max: max_files });
            }

            let content_type = field.content_type().map(str::to_owned);
            let bytes = field.bytes().await?;
            form.files
                .push(ImageUpload::new(&file_name, content_type.as_deref(), bytes)?);
        }

        Ok(form)
    }

    /// Value of a text field, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Directory that accepted uploads are written to.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create a store writing into `dir`. The directory is created on first use.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The upload directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write one upload and return its stored file name.
    ///
    /// If the generated name is taken (two uploads of the same file within one
    /// millisecond), the timestamp is bumped until a free name is found.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` if the directory or file cannot be written.
    pub async fn save(&self, upload: &ImageUpload) -> Result<String, UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let mut unix_millis = Utc::now().timestamp_millis();
        loop {
            let file_name = upload.stored_file_name(unix_millis);
            let path = self.dir.join(&file_name);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(&upload.bytes).await?;
                    file.flush().await?;
                    tracing::info!(
                        file = %file_name,
                        bytes = upload.bytes.len(),
                        content_type = %upload.image_type,
                        "Stored upload"
                    );
                    return Ok(file_name);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => unix_millis += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Write several uploads in order and return their stored file names.
    ///
    /// Files written before a failure are left in place.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Io` on the first failed write.
    pub async fn save_all(&self, uploads: &[ImageUpload]) -> Result<Vec<String>, UploadError> {
        let mut names = Vec::with_capacity(uploads.len());
        for upload in uploads {
            names.push(self.save(upload).await?);
        }
        Ok(names)
    }
}

/// Absolute URL of a stored upload, e.g. `http://host:3000/public/uploads/a.png-1.png`.
///
/// The file name is percent-encoded as a single path segment, so client
/// names containing `#`, `?` or `%` still point at the stored file.
///
/// # Errors
///
/// Returns `UploadError::InvalidOrigin` if `origin` is not an absolute
/// http(s) URL.
pub fn public_url(origin: &str, file_name: &str) -> Result<String, UploadError> {
    let invalid = || UploadError::InvalidOrigin(origin.to_owned());

    let mut url = Url::parse(origin).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|()| invalid())?
        .pop_if_empty()
        .extend(UPLOADS_ROUTE.split('/').filter(|segment| !segment.is_empty()))
        .push(file_name);

    Ok(url.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn png(name: &str) -> ImageUpload {
        ImageUpload::new(name, Some("image/png"), Bytes::from_static(b"\x89PNG")).unwrap()
    }

    #[test]
    fn test_stored_file_name_replaces_spaces() {
        let upload = png("blue shirt front.png");
        assert_eq!(
            upload.stored_file_name(1_718_000_000_000),
            "blue-shirt-front.png-1718000000000.png"
        );
    }

    #[test]
    fn test_stored_file_name_uses_mime_extension() {
        let upload =
            ImageUpload::new("photo.JPG", Some("image/jpeg"), Bytes::from_static(b"jpg")).unwrap();
        assert_eq!(upload.stored_file_name(5), "photo.JPG-5.jpeg");
    }

    #[test]
    fn test_stored_file_name_strips_directories() {
        let upload = png("../../etc/evil.png");
        assert_eq!(upload.stored_file_name(1), "evil.png-1.png");

        let upload = png("");
        assert_eq!(upload.stored_file_name(1), "image-1.png");
    }

    #[test]
    fn test_disallowed_type_is_rejected() {
        let result = ImageUpload::new("a.gif", Some("image/gif"), Bytes::new());
        assert!(matches!(result, Err(UploadError::InvalidType(t)) if t == "image/gif"));

        let result = ImageUpload::new("a.png", None, Bytes::new());
        assert!(matches!(result, Err(UploadError::InvalidType(_))));
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            public_url("http://localhost:3000", "a.png-1.png").unwrap(),
            "http://localhost:3000/public/uploads/a.png-1.png"
        );
        assert_eq!(
            public_url("https://shop.example/", "b.jpg-2.jpg").unwrap(),
            "https://shop.example/public/uploads/b.jpg-2.jpg"
        );
    }

    #[test]
    fn test_public_url_encodes_reserved_characters() {
        assert_eq!(
            public_url("http://shop.test:3000", "shirt-#1?.png-7.png").unwrap(),
            "http://shop.test:3000/public/uploads/shirt-%231%3F.png-7.png"
        );
        assert_eq!(
            public_url("http://shop.test", "100%-cotton.png-7.png").unwrap(),
            "http://shop.test/public/uploads/100%25-cotton.png-7.png"
        );
    }

    #[test]
    fn test_public_url_rejects_bad_origin() {
        assert!(matches!(
            public_url("not a url", "a.png-1.png"),
            Err(UploadError::InvalidOrigin(_))
        ));
    }

    #[test]
    fn test_client_errors() {
        assert!(UploadError::NoImage.is_client_error());
        assert!(UploadError::TooManyFiles { max: 10 }.is_client_error());
        assert!(!UploadError::Io(std::io::Error::other("disk full")).is_client_error());
    }

    #[tokio::test]
    async fn test_save_writes_file_and_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"));
        let upload = png("same.png");

        let first = store.save(&upload).await.unwrap();
        let second = store.save(&upload).await.unwrap();
        assert_ne!(first, second);

        let written = std::fs::read(store.dir().join(&first)).unwrap();
        assert_eq!(written, b"\x89PNG");
        assert!(first.starts_with("same.png-"));
        assert!(first.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_save_all_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path());
        let names = store
            .save_all(&[png("one.png"), png("two.png")])
            .await
            .unwrap();

        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("one.png-"));
        assert!(names[1].starts_with("two.png-"));
    }
}
