//! [`Storage`] of uploaded media files.

use std::{
    io,
    path::{Component, Path, PathBuf},
};

use axum::body::Bytes;
use derive_more::{Display, Error, From};
use uuid::Uuid;
use xxhash_rust::xxh3;

use crate::config;

/// Kind of a stored media file.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum MediaKind {
    /// Image file.
    #[display("image")]
    Image,

    /// Video file.
    #[display("video")]
    Video,
}

impl MediaKind {
    /// Returns the MIME type prefix of files of this [`MediaKind`].
    const fn mime_prefix(self) -> &'static str {
        match self {
            Self::Image => "image/",
            Self::Video => "video/",
        }
    }

    /// Returns the directory files of this [`MediaKind`] are stored in.
    const fn dir(self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
        }
    }
}

/// File uploaded by a client.
#[derive(Clone, Debug)]
pub struct Upload {
    /// Original name of the file, if provided.
    pub file_name: Option<String>,

    /// Declared MIME type of the file, if provided.
    pub content_type: Option<String>,

    /// Contents of the file.
    pub bytes: Bytes,
}

/// File put into a [`Storage`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stored {
    /// Public URL the file is served by.
    pub url: String,

    /// Size of the file in bytes.
    pub size: u64,

    /// Original name of the file.
    pub name: String,
}

/// Local directory storing uploaded media files.
///
/// Every upload gets its own file, named by its content hash and a random
/// suffix, so a file always belongs to exactly one media record.
#[derive(Clone, Debug)]
pub struct Storage {
    /// Root directory of this [`Storage`].
    dir: PathBuf,

    /// URL prefix the files of this [`Storage`] are served under.
    public_url: String,

    /// Maximum size of an image in bytes.
    max_image_size: u64,

    /// Maximum size of a video in bytes.
    max_video_size: u64,
}

impl Storage {
    /// Creates a new [`Storage`] with the provided configuration.
    #[must_use]
    pub fn new(conf: config::Media) -> Self {
        let config::Media {
            dir,
            public_url,
            max_image_size,
            max_video_size,
        } = conf;
        Self {
            dir,
            public_url: public_url.trim_end_matches('/').to_owned(),
            max_image_size,
            max_video_size,
        }
    }

    /// Returns the root directory of this [`Storage`].
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the URL prefix the files are served under.
    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    /// Creates the directories of this [`Storage`], if missing.
    ///
    /// # Errors
    ///
    /// If failed to create a directory.
    pub async fn init(&self) -> io::Result<()> {
        for kind in [MediaKind::Image, MediaKind::Video] {
            tokio::fs::create_dir_all(self.dir.join(kind.dir())).await?;
        }
        Ok(())
    }

    /// Checks whether the provided [`Upload`] is acceptable as a file of the
    /// provided [`MediaKind`].
    ///
    /// # Errors
    ///
    /// If the [`Upload`] is too large or has a wrong MIME type.
    pub fn check(
        &self,
        kind: MediaKind,
        upload: &Upload,
    ) -> Result<(), StoreError> {
        let max = match kind {
            MediaKind::Image => self.max_image_size,
            MediaKind::Video => self.max_video_size,
        };
        let name = upload.file_name.clone().unwrap_or_default();

        if upload.bytes.len() as u64 > max {
            return Err(StoreError::TooLarge { name, kind, max });
        }
        let mime_ok = upload
            .content_type
            .as_deref()
            .is_some_and(|t| t.starts_with(kind.mime_prefix()));
        if !mime_ok {
            return Err(StoreError::UnsupportedType { name, kind });
        }
        Ok(())
    }

    /// Puts the provided [`Upload`] into this [`Storage`].
    ///
    /// # Errors
    ///
    /// If the [`Upload`] is not acceptable, or failed to write it.
    pub async fn store(
        &self,
        kind: MediaKind,
        upload: &Upload,
    ) -> Result<Stored, StoreError> {
        self.check(kind, upload)?;

        let hash = xxh3::xxh3_128(&upload.bytes);
        let file = format!(
            "{hash:032x}-{}{}",
            Uuid::new_v4().simple(),
            extension(upload.file_name.as_deref().unwrap_or_default()),
        );
        let path = self.dir.join(kind.dir()).join(&file);

        tokio::fs::create_dir_all(self.dir.join(kind.dir())).await?;
        tokio::fs::write(&path, &upload.bytes).await?;
        tracing::debug!("stored new {kind} `{}`", path.display());

        Ok(Stored {
            url: format!("{}/{}/{file}", self.public_url, kind.dir()),
            size: upload.bytes.len() as u64,
            name: upload.file_name.clone().unwrap_or_else(|| file.clone()),
        })
    }

    /// Resolves the provided public `url` into a path inside this
    /// [`Storage`].
    ///
    /// [`None`] is returned if the `url` doesn't point into this [`Storage`].
    #[must_use]
    pub fn path_of(&self, url: &str) -> Option<PathBuf> {
        let rest = url.strip_prefix(&self.public_url)?.strip_prefix('/')?;
        let (dir, file) = rest.split_once('/')?;
        if ![MediaKind::Image, MediaKind::Video]
            .iter()
            .any(|k| k.dir() == dir)
        {
            return None;
        }
        let mut components = Path::new(file).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {
                Some(self.dir.join(dir).join(file))
            }
            _ => None,
        }
    }

    /// Removes the file served by the provided public `url`.
    ///
    /// Returns `false` if there was no such file.
    ///
    /// # Errors
    ///
    /// If failed to remove the file.
    pub async fn remove(&self, url: &str) -> io::Result<bool> {
        let Some(path) = self.path_of(url) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("removed `{}`", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Returns the normalized extension (with a leading dot) of the provided file
/// `name`, or an empty string if it has no sane one.
fn extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= 8
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Error of putting a file into a [`Storage`].
#[derive(Debug, Display, Error, From)]
pub enum StoreError {
    /// File exceeds the size limit.
    #[display("`{name}` exceeds the {kind} limit of {max} bytes")]
    #[from(ignore)]
    TooLarge {
        /// Original name of the file.
        name: String,

        /// [`MediaKind`] of the file.
        kind: MediaKind,

        /// Maximum allowed size in bytes.
        max: u64,
    },

    /// File has an unexpected MIME type.
    #[display("`{name}` is not an {kind} file")]
    #[from(ignore)]
    UnsupportedType {
        /// Original name of the file.
        name: String,

        /// Expected [`MediaKind`].
        kind: MediaKind,
    },

    /// I/O error.
    #[display("I/O operation failed: {_0}")]
    Io(io::Error),
}

#[cfg(test)]
mod spec {
    use std::path::PathBuf;

    use axum::body::Bytes;

    use crate::config;

    use super::{extension, MediaKind, Storage, StoreError, Upload};

    fn storage(name: &str) -> Storage {
        Storage::new(config::Media {
            dir: std::env::temp_dir().join(format!(
                "storage-{name}-{}",
                std::process::id(),
            )),
            public_url: "/media/".into(),
            max_image_size: 16,
            max_video_size: 32,
        })
    }

    fn image(name: &str, bytes: &'static [u8]) -> Upload {
        Upload {
            file_name: Some(name.into()),
            content_type: Some("image/png".into()),
            bytes: Bytes::from_static(bytes),
        }
    }

    #[tokio::test]
    async fn identical_uploads_get_own_files() {
        let storage = storage("own");

        let a = storage
            .store(MediaKind::Image, &image("a.PNG", b"same"))
            .await
            .unwrap();
        let b = storage
            .store(MediaKind::Image, &image("b.png", b"same"))
            .await
            .unwrap();
        let c = storage
            .store(MediaKind::Image, &image("c.png", b"other"))
            .await
            .unwrap();

        assert_ne!(a.url, b.url);
        assert_ne!(a.url, c.url);
        assert!(a.url.starts_with("/media/images/"));
        assert!(a.url.ends_with(".png"));
        assert_eq!(a.name, "a.PNG");
        assert_eq!(a.size, 4);

        assert!(storage.remove(&a.url).await.unwrap());
        assert!(!storage.remove(&a.url).await.unwrap());
        let kept = storage.path_of(&b.url).unwrap();
        assert_eq!(tokio::fs::read(&kept).await.unwrap(), b"same");

        assert!(storage.remove(&b.url).await.unwrap());
        assert!(storage.remove(&c.url).await.unwrap());
    }

    #[test]
    fn rejects_oversized_and_mistyped() {
        let storage = storage("check");

        assert!(matches!(
            storage.check(
                MediaKind::Image,
                &image("big.png", b"01234567890123456789"),
            ),
            Err(StoreError::TooLarge { max: 16, .. }),
        ));
        assert!(matches!(
            storage.check(MediaKind::Video, &image("clip.png", b"x")),
            Err(StoreError::UnsupportedType {
                kind: MediaKind::Video,
                ..
            }),
        ));
        assert!(storage
            .check(MediaKind::Image, &image("ok.png", b"x"))
            .is_ok());
    }

    #[test]
    fn resolves_only_own_paths() {
        let storage = storage("paths");
        let root = storage.dir().to_owned();

        assert_eq!(
            storage.path_of("/media/images/abc.png"),
            Some(root.join("images").join("abc.png")),
        );
        assert_eq!(storage.path_of("/media/images/../secret"), None);
        assert_eq!(storage.path_of("/media/docs/abc.png"), None);
        assert_eq!(storage.path_of("https://cdn.example.com/a.png"), None);
        assert_eq!(storage.path_of("/media/videos/"), None::<PathBuf>);
    }

    #[test]
    fn normalizes_extension() {
        assert_eq!(extension("photo.JPG"), ".jpg");
        assert_eq!(extension("clip.mp4"), ".mp4");
        assert_eq!(extension("noext"), "");
        assert_eq!(extension("weird.p$g"), "");
    }
}
