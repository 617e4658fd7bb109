// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Owning handles and borrowed views over native objects
//!
//! Every native object which must be freed (faces and glyphs) is stored in an
//! [`Arena`] owned by the engine. User-facing types never hold native
//! pointers directly; instead they hold an arena key:
//!
//! -   [`Owned`] is the unique owner of an entry. The native release call runs
//!     exactly once: on [`Owned::release`] or on drop, whichever comes first.
//! -   [`Borrowed`] is a view into an entry owned elsewhere. It never releases
//!     anything. Each access looks the entry up again, so a view of a
//!     released object reports [`LifetimeError::OwnerReleased`] instead of
//!     dereferencing freed memory.
//!
//! Entries also carry an epoch, bumped whenever the entry's contents are
//! replaced (a glyph loaded into the slot, a glyph converted to a bitmap).
//! Views which point *into* those contents record the epoch and report
//! [`LifetimeError::Stale`] once it changes.

use crate::engine::{Engine, EngineInner};
use crate::error::{EngineError, LifetimeError};
use slotmap::{Key, SlotMap};
use std::cell::RefCell;

/// A native object stored in an engine arena
pub(crate) trait Resource: Sized {
    type Key: Key;

    /// Select the arena holding this type
    fn arena(engine: &EngineInner) -> &Arena<Self::Key, Self>;

    /// Current content epoch
    fn epoch(&self) -> u64;

    /// Free the native object
    ///
    /// Called at most once per entry.
    fn release(self) -> Result<(), EngineError>;
}

/// Generational storage of native objects
pub(crate) struct Arena<K: Key, T> {
    slots: RefCell<SlotMap<K, T>>,
}

impl<K: Key, T> Default for Arena<K, T> {
    fn default() -> Self {
        Arena {
            slots: RefCell::new(SlotMap::with_key()),
        }
    }
}

impl<K: Key, T> Arena<K, T> {
    pub(crate) fn insert(&self, value: T) -> K {
        self.slots.borrow_mut().insert(value)
    }

    pub(crate) fn get<R>(&self, key: K, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.slots.borrow().get(key).map(f)
    }

    pub(crate) fn get_mut<R>(&self, key: K, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.slots.borrow_mut().get_mut(key).map(f)
    }

    pub(crate) fn remove(&self, key: K) -> Option<T> {
        self.slots.borrow_mut().remove(key)
    }

    /// Remove all entries
    pub(crate) fn drain(&self) -> Vec<T> {
        self.slots.borrow_mut().drain().map(|(_, v)| v).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.borrow().len()
    }
}

/// Release every entry, returning the first error
pub(crate) fn release_all<K: Key, T: Resource>(arena: &Arena<K, T>) -> Result<(), EngineError> {
    let mut result = Ok(());
    for entry in arena.drain() {
        if let Err(err) = entry.release() {
            log::warn!("release during shutdown failed: {err}");
            if result.is_ok() {
                result = Err(err);
            }
        }
    }
    result
}

/// Owning handle over an arena entry
pub(crate) struct Owned<R: Resource> {
    engine: Engine,
    key: R::Key,
}

impl<R: Resource> Owned<R> {
    /// Take ownership of `native`
    pub(crate) fn new(engine: &Engine, native: R) -> Self {
        let key = R::arena(engine.inner()).insert(native);
        Owned {
            engine: engine.clone(),
            key,
        }
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    pub(crate) fn key(&self) -> R::Key {
        self.key
    }

    fn missing(&self) -> LifetimeError {
        if self.engine.inner().is_shut_down() {
            LifetimeError::EngineShutDown
        } else {
            LifetimeError::Released
        }
    }

    /// True if the entry has not been released
    pub(crate) fn is_alive(&self) -> bool {
        R::arena(self.engine.inner()).get(self.key, |_| ()).is_some()
    }

    /// Access the entry
    pub(crate) fn with<T>(&self, f: impl FnOnce(&R) -> T) -> Result<T, LifetimeError> {
        R::arena(self.engine.inner())
            .get(self.key, f)
            .ok_or_else(|| self.missing())
    }

    /// Access the entry mutably
    pub(crate) fn with_mut<T>(&self, f: impl FnOnce(&mut R) -> T) -> Result<T, LifetimeError> {
        R::arena(self.engine.inner())
            .get_mut(self.key, f)
            .ok_or_else(|| self.missing())
    }

    /// Construct a view of this entry at its current epoch
    pub(crate) fn borrow(&self) -> Result<Borrowed<R>, LifetimeError> {
        let epoch = self.with(R::epoch)?;
        Ok(Borrowed {
            engine: self.engine.clone(),
            key: self.key,
            epoch,
        })
    }

    /// Release the native object now
    ///
    /// Fails with [`LifetimeError`] if already released (e.g. by an
    /// immediate engine shutdown).
    pub(crate) fn release(&self) -> crate::Result<()> {
        let native = R::arena(self.engine.inner())
            .remove(self.key)
            .ok_or_else(|| self.missing())?;
        native.release()?;
        Ok(())
    }
}

impl<R: Resource> Drop for Owned<R> {
    fn drop(&mut self) {
        if let Some(native) = R::arena(self.engine.inner()).remove(self.key) {
            if let Err(err) = native.release() {
                log::warn!("native release failed on drop: {err}");
            }
        }
    }
}

impl<R: Resource> std::fmt::Debug for Owned<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Owned")
            .field("key", &self.key.data())
            .finish()
    }
}

/// Non-owning view of an arena entry
pub(crate) struct Borrowed<R: Resource> {
    engine: Engine,
    key: R::Key,
    epoch: u64,
}

impl<R: Resource> Clone for Borrowed<R> {
    fn clone(&self) -> Self {
        Borrowed {
            engine: self.engine.clone(),
            key: self.key,
            epoch: self.epoch,
        }
    }
}

impl<R: Resource> Borrowed<R> {
    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    pub(crate) fn key(&self) -> R::Key {
        self.key
    }

    fn missing(&self) -> LifetimeError {
        if self.engine.inner().is_shut_down() {
            LifetimeError::EngineShutDown
        } else {
            LifetimeError::OwnerReleased
        }
    }

    /// Access the entry, whatever its epoch
    pub(crate) fn with<T>(&self, f: impl FnOnce(&R) -> T) -> Result<T, LifetimeError> {
        R::arena(self.engine.inner())
            .get(self.key, f)
            .ok_or_else(|| self.missing())
    }

    /// Access the entry mutably, whatever its epoch
    pub(crate) fn with_mut<T>(&self, f: impl FnOnce(&mut R) -> T) -> Result<T, LifetimeError> {
        R::arena(self.engine.inner())
            .get_mut(self.key, f)
            .ok_or_else(|| self.missing())
    }

    /// Access the entry only if its contents are unchanged since this view
    /// was taken
    pub(crate) fn with_current<T>(&self, f: impl FnOnce(&R) -> T) -> Result<T, LifetimeError> {
        let epoch = self.epoch;
        R::arena(self.engine.inner())
            .get(self.key, |entry| {
                if entry.epoch() == epoch {
                    Ok(f(entry))
                } else {
                    Err(LifetimeError::Stale)
                }
            })
            .ok_or_else(|| self.missing())?
    }

    /// Re-take this view at the entry's current epoch
    pub(crate) fn refresh(&self) -> Result<Borrowed<R>, LifetimeError> {
        let epoch = self.with(R::epoch)?;
        Ok(Borrowed {
            engine: self.engine.clone(),
            key: self.key,
            epoch,
        })
    }
}

impl<R: Resource> std::fmt::Debug for Borrowed<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Borrowed")
            .field("key", &self.key.data())
            .field("epoch", &self.epoch)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    slotmap::new_key_type! { struct TestKey; }

    #[test]
    fn arena_generations() {
        let arena: Arena<TestKey, u32> = Arena::default();
        let a = arena.insert(1);
        let b = arena.insert(2);
        assert_eq!(arena.get(a, |x| *x), Some(1));
        assert_eq!(arena.remove(a), Some(1));
        assert_eq!(arena.get(a, |x| *x), None);
        assert_eq!(arena.remove(a), None);

        // Slot reuse must not revive the old key
        let c = arena.insert(3);
        assert_eq!(arena.get(a, |x| *x), None);
        assert_eq!(arena.get(c, |x| *x), Some(3));
        assert_eq!(arena.len(), 2);

        arena.get_mut(b, |x| *x += 10);
        assert_eq!(arena.get(b, |x| *x), Some(12));
    }
}
