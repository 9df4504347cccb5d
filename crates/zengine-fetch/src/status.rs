use std::sync::atomic::{AtomicBool, Ordering};

/// Completion flag shared by a fetch and its abort watcher.
///
/// Starts incomplete and can be completed once; later attempts are no-ops.
#[derive(Debug, Default)]
pub struct FetchStatus {
    complete: AtomicBool,
}

impl FetchStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// Mark the fetch complete. Returns `true` only for the call that
    /// performed the transition.
    pub fn mark_complete(&self) -> bool {
        !self.complete.swap(true, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_once() {
        let status = FetchStatus::new();
        assert!(!status.is_complete());
        assert!(status.mark_complete());
        assert!(status.is_complete());
        assert!(!status.mark_complete());
        assert!(status.is_complete());
    }
}
