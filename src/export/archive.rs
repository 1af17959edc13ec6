use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use anyhow::Context;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::foundation::error::{CharsheetError, CharsheetResult};

/// Destination for the files of one export archive.
///
/// Ordering contract: `add_file` may be called any number of times, then `finish` exactly once.
pub trait ArchiveSink: Send {
    /// Store `bytes` under the `/`-separated archive path.
    fn add_file(&mut self, path: &str, bytes: &[u8]) -> CharsheetResult<()>;
    /// Flush and close the archive.
    fn finish(&mut self) -> CharsheetResult<()>;
}

/// Deflate-compressed zip archive.
pub struct ZipArchive<W: Write + Seek> {
    writer: Option<ZipWriter<W>>,
    finished: Option<W>,
    options: SimpleFileOptions,
}

impl<W: Write + Seek> std::fmt::Debug for ZipArchive<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchive")
            .field("finished", &self.finished.is_some())
            .finish_non_exhaustive()
    }
}

impl<W: Write + Seek> ZipArchive<W> {
    pub fn new(inner: W, compression_level: i64) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(compression_level));
        Self {
            writer: Some(ZipWriter::new(inner)),
            finished: None,
            options,
        }
    }

    /// The underlying writer once the archive is finished.
    pub fn into_inner(self) -> CharsheetResult<W> {
        self.finished
            .ok_or_else(|| CharsheetError::export("zip archive was not finished"))
    }
}

impl ZipArchive<File> {
    pub fn create(path: &Path, compression_level: i64) -> CharsheetResult<Self> {
        let file = File::create(path)
            .with_context(|| format!("create archive '{}'", path.display()))?;
        Ok(Self::new(file, compression_level))
    }
}

impl ZipArchive<Cursor<Vec<u8>>> {
    pub fn in_memory(compression_level: i64) -> Self {
        Self::new(Cursor::new(Vec::new()), compression_level)
    }

    pub fn into_bytes(self) -> CharsheetResult<Vec<u8>> {
        Ok(self.into_inner()?.into_inner())
    }
}

impl<W: Write + Seek + Send> ArchiveSink for ZipArchive<W> {
    fn add_file(&mut self, path: &str, bytes: &[u8]) -> CharsheetResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| CharsheetError::export("zip archive already finished"))?;
        writer
            .start_file(path, self.options)
            .with_context(|| format!("start zip entry '{path}'"))?;
        writer
            .write_all(bytes)
            .with_context(|| format!("write zip entry '{path}'"))?;
        Ok(())
    }

    fn finish(&mut self) -> CharsheetResult<()> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| CharsheetError::export("zip archive already finished"))?;
        self.finished = Some(writer.finish().context("finish zip archive")?);
        Ok(())
    }
}

/// In-memory archive for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    files: BTreeMap<String, Vec<u8>>,
    fail_paths: Vec<String>,
    finished: bool,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archive that rejects any path containing `fragment`.
    pub fn failing_on(fragment: impl Into<String>) -> Self {
        Self {
            fail_paths: vec![fragment.into()],
            ..Self::default()
        }
    }

    pub fn files(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.files
    }

    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl ArchiveSink for MemoryArchive {
    fn add_file(&mut self, path: &str, bytes: &[u8]) -> CharsheetResult<()> {
        if self.finished {
            return Err(CharsheetError::export("archive already finished"));
        }
        if self.fail_paths.iter().any(|f| path.contains(f.as_str())) {
            return Err(CharsheetError::export(format!("write rejected for '{path}'")));
        }
        self.files.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> CharsheetResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/archive.rs"]
mod tests;
