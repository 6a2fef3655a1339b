//! Filesystem class-file source.
//!
//! Walks the configured roots, collecting every `.class` file. Directory
//! entries are sorted before descent so the buffer order (and therefore all
//! downstream output) is stable across runs and platforms.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use memmap2::Mmap;
use tracing::debug;

use crate::domain::ports::{ClassFileBuffer, ClassFileSource};

pub struct DirectoryClassSource {
    roots: Vec<PathBuf>,
}

impl DirectoryClassSource {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    fn collect(&self, path: &Path, buffers: &mut Vec<ClassFileBuffer>) -> Result<()> {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory: {}", path.display()))?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<Result<_, _>>()
                .with_context(|| format!("Failed to list directory: {}", path.display()))?;
            entries.sort();
            for entry in entries {
                self.collect(&entry, buffers)?;
            }
        } else if path.extension().is_some_and(|ext| ext == "class") {
            buffers.push(read_class_file(path)?);
        }
        Ok(())
    }
}

fn read_class_file(path: &Path) -> Result<ClassFileBuffer> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mmap = unsafe {
        Mmap::map(&file).with_context(|| format!("Failed to mmap file: {}", path.display()))?
    };
    debug!(path = %path.display(), bytes = mmap.len(), "read class file");
    Ok(ClassFileBuffer::new(
        path.display().to_string(),
        mmap.to_vec(),
    ))
}

impl ClassFileSource for DirectoryClassSource {
    fn load(&self) -> Result<Vec<ClassFileBuffer>> {
        let mut buffers = Vec::new();
        for root in &self.roots {
            if !root.exists() {
                anyhow::bail!("Path does not exist: {}", root.display());
            }
            self.collect(root, &mut buffers)?;
        }
        debug!(count = buffers.len(), "collected class files");
        Ok(buffers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_is_an_error() {
        let source = DirectoryClassSource::new(vec![PathBuf::from("/nonexistent/really")]);
        assert!(source.load().is_err());
    }

    #[test]
    fn non_class_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        std::fs::write(dir.path().join("B.class"), [0xca, 0xfe, 0xba, 0xbe]).unwrap();
        std::fs::write(dir.path().join("A.class"), [0xca, 0xfe, 0xba, 0xbe]).unwrap();

        let source = DirectoryClassSource::new(vec![dir.path().to_path_buf()]);
        let buffers = source.load().unwrap();
        assert_eq!(buffers.len(), 2);
        // Sorted walk: A before B.
        assert!(buffers[0].source.ends_with("A.class"));
        assert!(buffers[1].source.ends_with("B.class"));
    }

    #[test]
    fn nested_directories_are_walked() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("com").join("example");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Deep.class"), [0xca, 0xfe, 0xba, 0xbe]).unwrap();

        let source = DirectoryClassSource::new(vec![dir.path().to_path_buf()]);
        let buffers = source.load().unwrap();
        assert_eq!(buffers.len(), 1);
        assert!(buffers[0].source.ends_with("Deep.class"));
    }
}
