//! Deterministic JSON serialization for files the client writes.
//!
//! Output uses 2-space indentation and a trailing newline, and keys come
//! out in `BTreeMap` order, so rewriting unchanged data is a no-op on disk.

mod json;

pub use json::*;
