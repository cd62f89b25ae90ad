/// Observable collections and badge bindings
///
/// Domain workspaces own their collections; navigation only watches their
/// size. Observers are told the new length synchronously after each change.
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};

/// Callback receiving the collection's new length
pub type CollectionObserver = Arc<dyn Fn(usize) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Collection exposing its size and a "contents changed" notification
pub trait ObservableCollection: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn observe(&self, observer: CollectionObserver) -> ObserverId;

    /// Returns `false` if the observer was already removed
    fn unobserve(&self, id: ObserverId) -> bool;
}

struct ObservableVecInner<T> {
    items: RwLock<Vec<T>>,
    observers: Mutex<Vec<(ObserverId, CollectionObserver)>>,
    next_id: AtomicU64,
    /// Bumped under the items write lock, so it orders changes
    generation: AtomicU64,
    /// Generation of the last length handed to observers
    delivered: ReentrantMutex<Cell<u64>>,
}

/// Vec that notifies observers whenever its contents change.
///
/// Cloning yields another handle to the same items. Observers never see an
/// older length after a newer one.
pub struct ObservableVec<T> {
    inner: Arc<ObservableVecInner<T>>,
}

impl<T> ObservableVec<T> {
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            inner: Arc::new(ObservableVecInner {
                items: RwLock::new(items),
                observers: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                delivered: ReentrantMutex::new(Cell::new(0)),
            }),
        }
    }

    pub fn push(&self, item: T) {
        self.change(|items| {
            items.push(item);
            ((), true)
        })
    }

    pub fn extend<I: IntoIterator<Item = T>>(&self, items: I) {
        self.change(|existing| {
            existing.extend(items);
            ((), true)
        })
    }

    pub fn remove(&self, index: usize) -> Option<T> {
        self.change(|items| {
            let removed = (index < items.len()).then(|| items.remove(index));
            let changed = removed.is_some();
            (removed, changed)
        })
    }

    pub fn retain<F: FnMut(&T) -> bool>(&self, keep: F) {
        self.change(|items| {
            let before = items.len();
            items.retain(keep);
            ((), items.len() != before)
        })
    }

    pub fn clear(&self) {
        self.change(|items| {
            let had_items = !items.is_empty();
            items.clear();
            ((), had_items)
        })
    }

    /// Run `f` against the current items
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.inner.items.read())
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }

    /// Apply `f` under the write lock; `f` reports whether anything changed
    fn change<R>(&self, f: impl FnOnce(&mut Vec<T>) -> (R, bool)) -> R {
        let (result, notice) = {
            let mut items = self.inner.items.write();
            let (result, changed) = f(&mut items);
            let notice = changed.then(|| {
                let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
                (generation, items.len())
            });
            (result, notice)
        };

        if let Some((generation, len)) = notice {
            self.notify(generation, len);
        }
        result
    }

    fn notify(&self, generation: u64, len: usize) {
        let delivered = self.inner.delivered.lock();
        if delivered.get() > generation {
            return;
        }
        delivered.set(generation);

        let observers: Vec<CollectionObserver> = self
            .inner
            .observers
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            // An observer changed the collection and a newer length went out.
            if delivered.get() != generation {
                break;
            }
            observer(len);
        }
    }
}

impl<T: Clone> ObservableVec<T> {
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.items.read().clone()
    }
}

impl<T> Clone for ObservableVec<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync> ObservableCollection for ObservableVec<T> {
    fn len(&self) -> usize {
        self.inner.items.read().len()
    }

    fn observe(&self, observer: CollectionObserver) -> ObserverId {
        let id = ObserverId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.observers.lock().push((id, observer));
        id
    }

    fn unobserve(&self, id: ObserverId) -> bool {
        let mut observers = self.inner.observers.lock();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }
}

/// Live link between a collection's size and a step badge.
///
/// Dropping the binding stops the mirroring; the badge keeps its last value.
pub struct BadgeBinding {
    step_id: String,
    collection: Arc<dyn ObservableCollection>,
    observer: ObserverId,
}

impl BadgeBinding {
    pub(crate) fn attach(
        step_id: &str,
        badge: Arc<AtomicUsize>,
        collection: Arc<dyn ObservableCollection>,
    ) -> Self {
        let cell = Arc::clone(&badge);
        let observer =
            collection.observe(Arc::new(move |len: usize| cell.store(len, Ordering::Release)));
        // Seed after observing so a change in between is not lost.
        badge.store(collection.len(), Ordering::Release);

        Self {
            step_id: step_id.to_string(),
            collection,
            observer,
        }
    }

    pub fn step_id(&self) -> &str {
        &self.step_id
    }
}

impl Drop for BadgeBinding {
    fn drop(&mut self) {
        self.collection.unobserve(self.observer);
    }
}

impl fmt::Debug for BadgeBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BadgeBinding")
            .field("step_id", &self.step_id)
            .field("observer", &self.observer)
            .finish()
    }
}
