//! Rewrite observation hooks.
//!
//! The resolver stays silent by default; callers that want to trace rewrite
//! decisions inject an observer.

/// Receives a callback for every file-reference rewrite the resolver makes.
pub trait RewriteObserver {
    fn rewrote(&self, layer: &str, context_path: &str, from: &str, to: &str);
}

/// Discards all rewrite notifications. The default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl RewriteObserver for NoopObserver {
    fn rewrote(&self, _layer: &str, _context_path: &str, _from: &str, _to: &str) {}
}

/// Emits each rewrite as a `tracing` debug event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TraceObserver;

impl RewriteObserver for TraceObserver {
    fn rewrote(&self, layer: &str, context_path: &str, from: &str, to: &str) {
        tracing::debug!(layer, context_path, from, to, "rewrote file reference");
    }
}
