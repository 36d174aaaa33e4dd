//! Scoped key bindings.
//!
//! A binding lives exactly as long as the [`Subscription`] returned for it;
//! dropping the subscription unsubscribes, whichever way the owning scope ends.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::trace;

type Action = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    bindings: Vec<(u64, String, Action)>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone, Default)]
pub struct KeyBindings {
    registry: Arc<Mutex<Registry>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` whenever `key` is dispatched, until the subscription drops.
    #[must_use = "the binding is removed as soon as the subscription is dropped"]
    pub fn subscribe(&self, key: &str, action: impl Fn() + Send + Sync + 'static) -> Subscription {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.bindings.push((id, key.to_lowercase(), Arc::new(action)));
        trace!(key, id, "Key binding added");

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Run every action bound to `code` (case-insensitive). Returns how many ran.
    pub fn dispatch(&self, code: &str) -> usize {
        let code = code.to_lowercase();
        // Actions run outside the lock so they may subscribe or unsubscribe.
        let actions: Vec<Action> = lock(&self.registry)
            .bindings
            .iter()
            .filter(|(_, key, _)| *key == code)
            .map(|(_, _, action)| Arc::clone(action))
            .collect();

        for action in &actions {
            action();
        }
        actions.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.registry).bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).bindings.retain(|(id, _, _)| *id != self.id);
            trace!(id = self.id, "Key binding removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_dispatch_is_case_insensitive() {
        let keys = KeyBindings::new();
        let (count, action) = counter();
        let _escape = keys.subscribe("Escape", action);

        assert_eq!(keys.dispatch("escape"), 1);
        assert_eq!(keys.dispatch("ESCAPE"), 1);
        assert_eq!(keys.dispatch("Enter"), 0);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let keys = KeyBindings::new();
        let (count, action) = counter();
        {
            let _scoped = keys.subscribe("Enter", action);
            keys.dispatch("Enter");
        }
        assert!(keys.is_empty());
        assert_eq!(keys.dispatch("Enter"), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_on_error_path() {
        fn scoped(keys: &KeyBindings) -> Result<(), String> {
            let _binding = keys.subscribe("Escape", || {});
            Err("view failed".to_string())
        }

        let keys = KeyBindings::new();
        assert!(scoped(&keys).is_err());
        assert!(keys.is_empty());
    }

    #[test]
    fn test_explicit_unsubscribe_leaves_others() {
        let keys = KeyBindings::new();
        let (first_count, first) = counter();
        let (second_count, second) = counter();
        let a = keys.subscribe("Escape", first);
        let _b = keys.subscribe("Escape", second);

        a.unsubscribe();
        assert_eq!(keys.dispatch("Escape"), 1);
        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscription_outliving_bindings() {
        let keys = KeyBindings::new();
        let sub = keys.subscribe("Escape", || {});
        drop(keys);
        drop(sub);
    }
}
