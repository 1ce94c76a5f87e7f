use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for the work done while turning components into chunks.
///
/// Nothing is counted unless a `RenderStats` is handed in explicitly (see
/// [`flatten_counted()`] and [`Joiner::counted()`]), so independent callers
/// and parallel tests never see each other's numbers.
///
/// [`flatten_counted()`]: crate::sql::flatten_counted
/// [`Joiner::counted()`]: crate::sql::Joiner::counted
#[derive(Debug, Default)]
pub struct RenderStats {
    flattened: AtomicUsize,
    dereferenced: AtomicUsize,
}

impl RenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_flatten(&self) {
        self.flattened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dereference(&self) {
        self.dereferenced.fetch_add(1, Ordering::Relaxed);
    }

    /// Nested lists expanded in place.
    pub fn flattened(&self) -> usize {
        self.flattened.load(Ordering::Relaxed)
    }

    /// Values resolved into a placeholder or inline text.
    pub fn dereferenced(&self) -> usize {
        self.dereferenced.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.flattened.store(0, Ordering::Relaxed);
        self.dereferenced.store(0, Ordering::Relaxed);
    }
}
