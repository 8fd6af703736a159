use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::{CodegenError, CodegenResult};

pub struct CodeWriter;

impl CodeWriter {
    pub fn new() -> Self {
        Self
    }

    /// Create `dir` and any missing parents. Succeeds if it already exists.
    pub fn ensure_dir(&self, dir: &Path) -> CodegenResult<()> {
        fs::create_dir_all(dir)?;
        Ok(())
    }

    /// Write `content` to a file that must not exist yet
    pub fn write_new(&self, path: &Path, content: &str) -> CodegenResult<()> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => CodegenError::AlreadyExists(path.to_path_buf()),
                _ => CodegenError::Io(e),
            })?;

        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}
