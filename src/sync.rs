//! The locking layer: switchable reader-writer locks and their guards.
//!
//! Every pool carries one lock over its entity-allocation state and one lock
//! per component storage. Lock nesting is strictly one-way: the pool lock may
//! be held while a storage lock is taken (entity kills clear storage rows
//! under the pool lock), but never the reverse. When several storage locks
//! are needed at once — multi-storage queries, or bulk mutation through
//! [`lock_mut`](crate::lock_mut) — they are always acquired in ascending
//! registration order, so two threads can never wait on each other's pair.
//!
//! Locking can be switched off per pool via
//! [`PoolOptions::single_threaded`](crate::PoolOptions::single_threaded);
//! a disabled `SwitchLock` hands out its data without touching the
//! underlying lock at all.

use std::ops;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A reader-writer lock whose locking can be disabled at construction time.
///
/// With locking enabled this is a plain [`parking_lot::RwLock`]. With locking
/// disabled, [`read`](Self::read) and [`write`](Self::write) skip the lock and
/// alias the data directly; this is sound only under the contract of
/// [`PoolOptions::single_threaded`](crate::PoolOptions::single_threaded),
/// which is why that switch is `unsafe` to flip.
pub(crate) struct SwitchLock<T> {
    locking: bool,
    inner:   RwLock<T>,
}

impl<T> SwitchLock<T> {
    pub(crate) fn new(value: T, locking: bool) -> Self {
        Self { locking, inner: RwLock::new(value) }
    }

    pub(crate) fn read(&self) -> ReadGuard<'_, T> {
        if self.locking {
            ReadGuard::Locked(self.inner.read())
        } else {
            // Safety: the caller of `PoolOptions::single_threaded` promised
            // exclusive single-threaded use with no overlapping write access.
            ReadGuard::Bare(unsafe { &*self.inner.data_ptr() })
        }
    }

    pub(crate) fn write(&self) -> WriteGuard<'_, T> {
        if self.locking {
            WriteGuard::Locked(self.inner.write())
        } else {
            // Safety: as in `read`, plus no overlapping access of any kind.
            WriteGuard::Bare(unsafe { &mut *self.inner.data_ptr() })
        }
    }
}

/// Shared guard handed out by [`SwitchLock::read`].
pub(crate) enum ReadGuard<'a, T> {
    Locked(RwLockReadGuard<'a, T>),
    Bare(&'a T),
}

impl<'a, T> ReadGuard<'a, T> {
    /// Projects the guard onto a part of the guarded data.
    pub(crate) fn map<U: ?Sized>(self, f: impl FnOnce(&T) -> &U) -> MappedReadGuard<'a, U> {
        MappedReadGuard(match self {
            Self::Locked(guard) => MappedInner::Locked(RwLockReadGuard::map(guard, f)),
            Self::Bare(value) => MappedInner::Bare(f(value)),
        })
    }
}

impl<'a, T> ops::Deref for ReadGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Self::Locked(guard) => guard,
            Self::Bare(value) => value,
        }
    }
}

/// Exclusive guard handed out by [`SwitchLock::write`].
pub(crate) enum WriteGuard<'a, T> {
    Locked(RwLockWriteGuard<'a, T>),
    Bare(&'a mut T),
}

impl<'a, T> ops::Deref for WriteGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self {
            Self::Locked(guard) => guard,
            Self::Bare(value) => value,
        }
    }
}

impl<'a, T> ops::DerefMut for WriteGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        match self {
            Self::Locked(guard) => guard,
            Self::Bare(value) => value,
        }
    }
}

/// A read guard projected onto a part of the guarded data,
/// e.g. the presence bitset of a storage.
pub struct MappedReadGuard<'a, T: ?Sized>(MappedInner<'a, T>);

enum MappedInner<'a, T: ?Sized> {
    Locked(MappedRwLockReadGuard<'a, T>),
    Bare(&'a T),
}

impl<'a, T: ?Sized> ops::Deref for MappedReadGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.0 {
            MappedInner::Locked(guard) => guard,
            MappedInner::Bare(value) => value,
        }
    }
}

#[cfg(test)]
mod tests;
