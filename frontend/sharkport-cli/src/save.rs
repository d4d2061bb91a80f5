use sharkport_common::frontend::SaveWriter;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveWriteError {
    #[error("Error opening save file '{path}': {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Error reading save file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Error writing save file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Save writer that stores each extension as a sibling file of the base path.
pub struct FsSaveWriter {
    base_path: PathBuf,
    extension_to_path: HashMap<String, PathBuf>,
}

impl FsSaveWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { base_path: path, extension_to_path: HashMap::new() }
    }

    fn resolve_path(&mut self, extension: &str) -> &PathBuf {
        self.extension_to_path
            .entry(extension.into())
            .or_insert_with(|| self.base_path.with_extension(extension))
    }

    fn open_file(
        &mut self,
        extension: &str,
        options: &OpenOptions,
    ) -> Result<(File, &PathBuf), SaveWriteError> {
        let path = self.resolve_path(extension);

        let file = options.open(path).map_err(|source| SaveWriteError::OpenFile {
            path: path.display().to_string(),
            source,
        })?;

        Ok((file, path))
    }
}

macro_rules! file_read_options {
    () => {
        File::options().read(true)
    };
}

impl SaveWriter for FsSaveWriter {
    type Err = SaveWriteError;

    fn load_bytes(&mut self, extension: &str) -> Result<Vec<u8>, Self::Err> {
        let (file, path) = self.open_file(extension, file_read_options!())?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| SaveWriteError::Read { path: path.display().to_string(), source })?;

        Ok(bytes)
    }

    fn persist_bytes(&mut self, extension: &str, bytes: &[u8]) -> Result<(), Self::Err> {
        let path = self.resolve_path(extension);
        let write_err =
            |source: io::Error| SaveWriteError::Write { path: path.display().to_string(), source };

        // Write to a sibling temp file and rename it over the save so that a failed write never
        // leaves a truncated save behind
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp_file = NamedTempFile::new_in(dir).map_err(write_err)?;

        let mut writer = BufWriter::new(temp_file.as_file_mut());
        writer.write_all(bytes).map_err(write_err)?;
        writer.flush().map_err(write_err)?;
        drop(writer);

        temp_file.as_file().sync_all().map_err(write_err)?;
        temp_file.persist(path).map_err(|err| write_err(err.error))?;

        log::debug!("Wrote {} bytes to '{}'", bytes.len(), path.display());

        Ok(())
    }
}
