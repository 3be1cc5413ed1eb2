//! Observable in-memory store shared by every view of the application.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

/// A value that is read as whole snapshots and replaced as a whole.
///
/// Writers are serialized, so an update always starts from the latest value.
/// Every replacement notifies subscribers exactly once. Clones share the
/// same underlying store.
#[derive(Debug)]
pub struct Registry<T> {
    inner: Arc<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    tx: watch::Sender<Arc<T>>,
    writer: Mutex<()>,
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Registry<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Registry<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self {
            inner: Arc::new(Inner {
                tx,
                writer: Mutex::new(()),
            }),
        }
    }

    /// The current value. Later writes never mutate a returned snapshot.
    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.inner.tx.borrow())
    }

    pub fn replace(&self, value: T) {
        let _writer = self.lock_writer();
        self.inner.tx.send_replace(Arc::new(value));
    }

    /// Build the next value from the latest one
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.update_with(|current| (Some(f(current)), ()));
    }

    /// Like [`Registry::update`], but the closure may decline to write by
    /// returning `None`, and can hand a result back to the caller.
    /// Declined writes do not notify subscribers.
    pub fn update_with<R>(&self, f: impl FnOnce(&T) -> (Option<T>, R)) -> R {
        let _writer = self.lock_writer();
        let current = self.snapshot();
        let (next, result) = f(&current);
        if let Some(next) = next {
            self.inner.tx.send_replace(Arc::new(next));
        }
        result
    }

    /// Change notifications; the receiver starts at the current value
    pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.inner.tx.subscribe()
    }

    fn lock_writer(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_isolated_from_later_writes() {
        let registry = Registry::new(vec![1]);
        let before = registry.snapshot();
        registry.update(|items| {
            let mut next = items.clone();
            next.push(2);
            next
        });
        assert_eq!(*before, vec![1]);
        assert_eq!(*registry.snapshot(), vec![1, 2]);
    }

    #[test]
    fn clones_share_the_store() {
        let registry = Registry::new(0_u32);
        let other = registry.clone();
        other.replace(7);
        assert_eq!(*registry.snapshot(), 7);
    }

    #[test]
    fn declined_update_returns_result_without_writing() {
        let registry = Registry::new(String::from("a"));
        let mut rx = registry.subscribe();
        rx.mark_unchanged();

        let len = registry.update_with(|value| (None, value.len()));
        assert_eq!(len, 1);
        assert!(!rx.has_changed().unwrap_or(true));
    }

    #[tokio::test]
    async fn subscribers_see_each_replacement() {
        let registry = Registry::new(0_u32);
        let mut rx = registry.subscribe();

        registry.replace(1);
        rx.changed().await.expect("sender alive");
        assert_eq!(**rx.borrow_and_update(), 1);

        registry.update(|value| value + 1);
        rx.changed().await.expect("sender alive");
        assert_eq!(**rx.borrow_and_update(), 2);
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let registry = Registry::new(0_u32);
        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..50 {
                    registry.update(|value| value + 1);
                }
            }));
        }
        for handle in handles {
            handle.await.expect("join");
        }
        assert_eq!(*registry.snapshot(), 800);
    }
}
