//! Structural rewriting of analyzed files

mod rewriter;

pub use rewriter::{NoopRewriter, RewriteEngine, RewriteOutcome, SpanRewriter};
