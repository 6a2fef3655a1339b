//! classdep library — JVM class-file decoding and dependency analysis.

pub mod adapters;
pub mod app;
pub mod classfile;
pub mod cli;
pub mod domain;
