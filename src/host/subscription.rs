/// Handle to a registered host callback
///
/// Releasing runs the unregister action at most once; dropping an
/// unreleased subscription releases it.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release
    pub fn detached() -> Self {
        Self { release: None }
    }

    pub fn dispose(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.release.is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_dispose_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let mut subscription = Subscription::new(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        subscription.dispose();
        subscription.dispose();
        drop(subscription);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let subscription = Subscription::new(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert!(!subscription.is_disposed());

        drop(subscription);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
