//! Per-file analysis passes
//!
//! Each detector is a pure function over the source text or the
//! [`ModuleIndex`](crate::parsers::python::ModuleIndex) built from one
//! parse. Detectors never mutate the file; the rewrite engine in
//! `crate::fixes` turns their results into edits.

mod normalizer;
mod typos;
mod unused_imports;
mod whitespace;

pub use normalizer::normalize_source;
pub use typos::{detect_typos, similarity_ratio, TypoConfig};
pub use unused_imports::detect_unused_imports;
pub use whitespace::diagnose_whitespace;
