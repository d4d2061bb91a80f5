use std::collections::HashMap;
use std::convert::Infallible;

pub trait SaveWriter {
    type Err;

    /// Read an array of bytes using the given extension.
    ///
    /// # Errors
    ///
    /// Will propagate any errors encountered while reading the file.
    fn load_bytes(&mut self, extension: &str) -> Result<Vec<u8>, Self::Err>;

    /// Write a slice of bytes using the given extension. Implementations must not return until
    /// the bytes have been handed off to the underlying store.
    ///
    /// # Errors
    ///
    /// Will propagate any errors encountered while writing the file.
    fn persist_bytes(&mut self, extension: &str, bytes: &[u8]) -> Result<(), Self::Err>;
}

/// [`SaveWriter`] that keeps everything in memory, keyed by extension.
#[derive(Debug, Clone, Default)]
pub struct MemorySaveWriter {
    files: HashMap<String, Vec<u8>>,
    persist_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotFound;

impl std::fmt::Display for NotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "No data stored for extension")
    }
}

impl std::error::Error for NotFound {}

impl MemorySaveWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(extension: &str, bytes: Vec<u8>) -> Self {
        let mut writer = Self::new();
        writer.files.insert(extension.into(), bytes);
        writer
    }

    #[must_use]
    pub fn get(&self, extension: &str) -> Option<&[u8]> {
        self.files.get(extension).map(Vec::as_slice)
    }

    /// Number of times `persist_bytes` has been called
    #[must_use]
    pub fn persist_count(&self) -> u32 {
        self.persist_count
    }
}

impl SaveWriter for MemorySaveWriter {
    type Err = NotFound;

    fn load_bytes(&mut self, extension: &str) -> Result<Vec<u8>, Self::Err> {
        self.files.get(extension).cloned().ok_or(NotFound)
    }

    fn persist_bytes(&mut self, extension: &str, bytes: &[u8]) -> Result<(), Self::Err> {
        self.files.insert(extension.into(), bytes.to_vec());
        self.persist_count += 1;
        Ok(())
    }
}

/// [`SaveWriter`] with no backing files. Loads return no data and writes are discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSaveWriter;

impl SaveWriter for NullSaveWriter {
    type Err = Infallible;

    fn load_bytes(&mut self, _extension: &str) -> Result<Vec<u8>, Self::Err> {
        Ok(Vec::new())
    }

    fn persist_bytes(&mut self, _extension: &str, _bytes: &[u8]) -> Result<(), Self::Err> {
        Ok(())
    }
}
