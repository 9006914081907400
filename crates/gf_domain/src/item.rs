use crate::encoding::{ContentForm, Encoding};
use crate::error::{DomainError, Result};
use std::fmt;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

/// Content that has not been read into memory yet.
pub struct ContentStream(Box<dyn Read + Send>);

impl ContentStream {
    pub fn new<R: Read + Send + 'static>(reader: R) -> Self {
        Self(Box::new(reader))
    }

    /// A stream over bytes already in memory, mostly useful for fixtures.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(Cursor::new(bytes.into()))
    }

    /// Drain the stream into a buffer.
    pub fn read_to_end(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.0.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

impl Read for ContentStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContentStream(..)")
    }
}

/// The three-state content slot of an item.
#[derive(Debug, Default)]
pub enum Contents {
    #[default]
    Null,
    Buffer(Vec<u8>),
    Stream(ContentStream),
}

impl Contents {
    pub fn form(&self) -> Option<ContentForm> {
        match self {
            Self::Null => None,
            Self::Buffer(_) => Some(ContentForm::Buffer),
            Self::Stream(_) => Some(ContentForm::Stream),
        }
    }
}

impl From<Vec<u8>> for Contents {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffer(bytes)
    }
}

impl From<&str> for Contents {
    fn from(text: &str) -> Self {
        Self::Buffer(text.as_bytes().to_vec())
    }
}

impl From<ContentStream> for Contents {
    fn from(stream: ContentStream) -> Self {
        Self::Stream(stream)
    }
}

/// A unit of work flowing through plugins: content plus where it lives.
///
/// `cwd` and `base` locate the item, `path` identifies it. Transforms are
/// free to rewrite `path` (for example to change the extension) and the
/// content slot.
#[derive(Debug)]
pub struct Item {
    pub cwd: PathBuf,
    pub base: PathBuf,
    pub path: PathBuf,
    pub contents: Contents,
}

impl Item {
    /// Create an item with no content, based at the current directory.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            cwd: PathBuf::from("."),
            base: PathBuf::from("."),
            path: path.into(),
            contents: Contents::Null,
        }
    }

    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = base.into();
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn with_contents(mut self, contents: impl Into<Contents>) -> Self {
        self.contents = contents.into();
        self
    }

    pub fn with_buffer(self, bytes: impl Into<Vec<u8>>) -> Self {
        self.with_contents(Contents::Buffer(bytes.into()))
    }

    pub fn with_stream<R: Read + Send + 'static>(self, reader: R) -> Self {
        self.with_contents(Contents::Stream(ContentStream::new(reader)))
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    pub fn is_buffer(&self) -> bool {
        matches!(self.contents, Contents::Buffer(_))
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    pub fn content_form(&self) -> Option<ContentForm> {
        self.contents.form()
    }

    pub fn buffer(&self) -> Option<&[u8]> {
        match &self.contents {
            Contents::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn buffer_mut(&mut self) -> Option<&mut Vec<u8>> {
        match &mut self.contents {
            Contents::Buffer(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Replace the content slot with `Null`, returning the previous content.
    pub fn take_contents(&mut self) -> Contents {
        std::mem::take(&mut self.contents)
    }

    /// Decode buffered content as text.
    pub fn contents_string(&self, encoding: Encoding) -> Result<String> {
        let bytes = self.buffer().ok_or(DomainError::NotBuffered)?;
        encoding.decode(bytes)
    }

    /// Store `text` as buffered content, whatever the slot held before.
    pub fn set_contents_string(&mut self, text: &str, encoding: Encoding) -> Result<()> {
        self.contents = Contents::Buffer(encoding.encode(text)?);
        Ok(())
    }

    /// Path relative to `base`, or the full path if it lies outside `base`.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|s| s.to_str())
    }

    pub fn set_extension(&mut self, extension: &str) {
        self.path.set_extension(extension);
    }
}
