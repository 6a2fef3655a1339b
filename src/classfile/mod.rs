//! Single-pass JVM class-file decoder.
//!
//! `decode_class` turns one raw byte buffer into an immutable
//! [`ClassInfo`](crate::domain::metadata::ClassInfo), or fails with a
//! [`DecodeError`] without leaking partially populated state. Decoding is
//! strictly forward and performs no I/O.

pub mod attributes;
pub mod constant_pool;
pub mod decoder;
pub mod descriptor;
pub mod instructions;
pub mod opcodes;
pub mod reader;

use thiserror::Error;

pub use decoder::decode_class;

/// Malformed-input failures. Fatal for the single class file being decoded;
/// batch callers collect these per item and keep going.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("truncated class file: need {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("bad magic number: 0x{found:08x}")]
    BadMagic { found: u32 },

    #[error("constant pool index {index} out of range or wrong kind")]
    BadConstantIndex { index: u16 },

    #[error("unknown constant pool tag {tag} at offset {offset}")]
    UnknownConstantTag { tag: u8, offset: usize },

    #[error("malformed descriptor: {descriptor}")]
    MalformedDescriptor { descriptor: String },

    #[error("malformed {name} attribute")]
    MalformedAttribute { name: String },
}

/// Caller-supplied decode policy.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// When false, private methods are dropped entirely rather than hidden.
    pub include_private: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            include_private: true,
        }
    }
}
