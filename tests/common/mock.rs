//! Mock implementations for integration tests.
#![allow(dead_code)]

use anyhow::Result;
use classdep::domain::ports::{ClassFileBuffer, ClassFileSource};

/// In-memory class-file source; hands out preloaded buffers in order.
pub struct InMemoryClassSource {
    buffers: Vec<ClassFileBuffer>,
}

impl InMemoryClassSource {
    pub fn new(buffers: Vec<ClassFileBuffer>) -> Self {
        Self { buffers }
    }

    pub fn of(entries: &[(&str, Vec<u8>)]) -> Self {
        Self::new(
            entries
                .iter()
                .map(|(source, bytes)| ClassFileBuffer::new(*source, bytes.clone()))
                .collect(),
        )
    }
}

impl ClassFileSource for InMemoryClassSource {
    fn load(&self) -> Result<Vec<ClassFileBuffer>> {
        Ok(self.buffers.clone())
    }
}
