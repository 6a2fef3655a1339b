//! Ports implemented by the adapter layer.

use anyhow::Result;

/// One class file handed to the engine: an identifier for error reporting
/// plus the raw bytes. The engine performs no I/O of its own.
#[derive(Debug, Clone)]
pub struct ClassFileBuffer {
    pub source: String,
    pub bytes: Vec<u8>,
}

impl ClassFileBuffer {
    pub fn new(source: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            bytes,
        }
    }
}

/// Supplier of class-file buffers (filesystem walker, archive extractor,
/// in-memory test source).
pub trait ClassFileSource: Send + Sync {
    fn load(&self) -> Result<Vec<ClassFileBuffer>>;
}
