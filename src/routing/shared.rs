//! Lock-free sharing of a frozen selector.
//!
//! # Design Decisions
//! - Readers load an `Arc` snapshot and resolve against it without locking
//! - Writers build a complete replacement and swap it in atomically, so a
//!   reader never sees a template without its configuration
//! - Writers are serialized by a mutex; readers never touch it

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;

use crate::routing::selector::ConnectionSelector;

/// A [`ConnectionSelector`] that can be replaced while it is being read.
#[derive(Debug)]
pub struct SharedSelector<C> {
    current: ArcSwap<ConnectionSelector<C>>,
    writer: Mutex<()>,
}

impl<C> SharedSelector<C> {
    /// Freeze `selector` and share it.
    pub fn new(selector: ConnectionSelector<C>) -> Self {
        Self {
            current: ArcSwap::from_pointee(selector),
            writer: Mutex::new(()),
        }
    }

    /// Snapshot of the current selector.
    pub fn load(&self) -> Arc<ConnectionSelector<C>> {
        self.current.load_full()
    }

    /// Replace the whole selector, returning the previous one.
    pub fn replace(&self, selector: ConnectionSelector<C>) -> Arc<ConnectionSelector<C>> {
        let _guard = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.current.swap(Arc::new(selector))
    }

    /// Apply `f` to a copy of the current selector and publish the result.
    ///
    /// Nothing is published if `f` fails.
    pub fn update<F, E>(&self, f: F) -> Result<(), E>
    where
        C: Clone,
        F: FnOnce(&mut ConnectionSelector<C>) -> Result<(), E>,
    {
        let _guard = self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = ConnectionSelector::clone(&self.current.load());
        f(&mut next)?;
        self.current.store(Arc::new(next));
        Ok(())
    }
}

impl<C> Default for SharedSelector<C> {
    fn default() -> Self {
        Self::new(ConnectionSelector::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::observer::NoopObserver;
    use crate::template::TemplateError;

    fn shared() -> SharedSelector<u32> {
        SharedSelector::new(ConnectionSelector::with_observer(Arc::new(NoopObserver)))
    }

    #[test]
    fn test_update_publishes_atomically() {
        let s = shared();
        let before = s.load();

        s.update(|sel| {
            sel.register("https://a.com/{repo}", 1)?;
            sel.register("https://b.com/repo", 2)
        })
        .unwrap();

        assert!(before.is_empty());
        let after = s.load();
        assert_eq!(after.len(), 2);
        assert_eq!(after.resolve("https://b.com/repo").config(), Some(&2));
    }

    #[test]
    fn test_failed_update_publishes_nothing() {
        let s = shared();
        let result: Result<(), TemplateError> = s.update(|sel| {
            sel.register("https://a.com/{repo}", 1)?;
            sel.register("https://a.com/{bad:}", 2)
        });

        assert!(result.is_err());
        assert!(s.load().is_empty());
    }

    #[test]
    fn test_replace_returns_previous() {
        let s = shared();
        s.update(|sel| sel.register("https://a.com/", 1)).unwrap();

        let mut next = ConnectionSelector::with_observer(Arc::new(NoopObserver));
        next.register("https://b.com/", 7).unwrap();
        let previous = s.replace(next);

        assert_eq!(previous.len(), 1);
        assert!(s.load().resolve("https://a.com/x").config().is_none());
        assert_eq!(s.load().resolve("https://b.com/x").config(), Some(&7));
    }

    #[test]
    fn test_concurrent_readers() {
        let s = shared();
        s.update(|sel| sel.register("https://{host}/repo", 42)).unwrap();

        std::thread::scope(|scope| {
            for i in 0..4 {
                let s = &s;
                scope.spawn(move || {
                    for _ in 0..100 {
                        let url = format!("https://host{i}.example.com/repo");
                        assert_eq!(s.load().resolve(&url).config(), Some(&42));
                    }
                });
            }
        });
    }
}
