//! [`File`] definitions.

/// File selected for an upload.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct File {
    /// Name of this [`File`].
    pub name: String,

    /// MIME type of this [`File`], if known.
    pub content_type: Option<String>,

    /// Contents of this [`File`].
    pub bytes: Vec<u8>,
}

impl File {
    /// Creates a new [`File`].
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: Some(content_type.into()),
            bytes: bytes.into(),
        }
    }

    /// Returns the size of this [`File`] in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}
