//! A storage is the data structure where components of the same type for all entities are stored.
//!
//! Each storage owns a dense row array indexed by entity id plus a presence
//! bitset recording which rows currently hold a live component, both guarded
//! by one storage-local lock. Queries clone the presence bitset and fold other
//! storages' bitsets in with the boolean algebra of [`Bitset`].

use std::any::Any;
use std::sync::Arc;

use self::sealed::AnyStorage as _;
use crate::bitset::Bitset;
use crate::entity::Entity;
use crate::sync::{MappedReadGuard, ReadGuard, SwitchLock, WriteGuard};

/// Data types usable as components.
///
/// Blanket-implemented; [`Default`] is the zero value written into cleared
/// rows, so `T::default()` is what [`Storage::get`] reports for an absent row.
pub trait Component: Clone + Default + Send + Sync + 'static {}

impl<T: Clone + Default + Send + Sync + 'static> Component for T {}

/// The guarded interior of a storage: one row per entity slot and the
/// presence bitset marking which rows hold a live component.
pub(crate) struct Table<C> {
    pub(crate) mask: Bitset,
    pub(crate) rows: Vec<C>,
}

pub(crate) struct Inner<C: Component> {
    pub(crate) rank:  usize,
    pub(crate) table: SwitchLock<Table<C>>,
}

impl<C: Component> Inner<C> {
    pub(crate) fn new(rank: usize, slots: usize, locking: bool) -> Self {
        let table = Table { mask: Bitset::with_capacity(slots), rows: vec![C::default(); slots] };
        Self { rank, table: SwitchLock::new(table, locking) }
    }

    /// Zeroes the row and clears the presence bit. Idempotent.
    pub(crate) fn clear_row(&self, entity: Entity) {
        let mut table = self.table.write();
        let index = entity.index();
        if table.mask.test(index) {
            table.mask.clear(index);
            *table.rows.get_mut(index).expect("present row is within the preallocated rows") =
                C::default();
        }
    }
}

#[doc(hidden)]
pub mod sealed {
    use std::any::Any;
    use std::sync::Arc;

    use crate::bitset::Bitset;
    use crate::entity::Entity;
    use crate::sync::MappedReadGuard;

    /// Type-erased view of a storage: registration rank, presence bitset
    /// access, row clearing and downcasting back to the concrete storage.
    pub trait AnyStorage: Send + Sync {
        fn rank(&self) -> usize;
        fn mask(&self) -> MappedReadGuard<'_, Bitset>;
        fn clear_row(&self, entity: Entity);
        fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    }
}

impl<C: Component> sealed::AnyStorage for Inner<C> {
    fn rank(&self) -> usize { self.rank }

    fn mask(&self) -> MappedReadGuard<'_, Bitset> { self.table.read().map(|table| &table.mask) }

    fn clear_row(&self, entity: Entity) { Inner::clear_row(self, entity); }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> { self }
}

/// A storage usable as an operand of a multi-storage query.
///
/// Implemented by [`Storage`] for every component type; the operands of
/// [`Storage::and`], [`Storage::or`] and [`Storage::but_not`] are
/// `&dyn Queryable`, so storages of different component types mix freely.
pub trait Queryable {
    #[doc(hidden)]
    fn erased(&self) -> &dyn sealed::AnyStorage;
}

/// Handle to the storage holding all components of type `C` in one pool.
///
/// Handles are cheap to clone and all clones address the same underlying
/// table; they are obtained from [`Pool::storage`](crate::Pool::storage).
/// Row-level operations lock the storage for the duration of the call.
/// Adding a component is a [`Pool`](crate::Pool)-level operation
/// ([`Pool::add`](crate::Pool::add)) because it must validate that the
/// entity is alive.
pub struct Storage<C: Component> {
    pub(crate) inner: Arc<Inner<C>>,
}

impl<C: Component> Clone for Storage<C> {
    fn clone(&self) -> Self { Self { inner: Arc::clone(&self.inner) } }
}

impl<C: Component> Queryable for Storage<C> {
    fn erased(&self) -> &dyn sealed::AnyStorage { &*self.inner }
}

#[derive(Clone, Copy)]
enum Op {
    And,
    Or,
    ButNot,
}

impl<C: Component> Storage<C> {
    pub(crate) fn from_dyn(shared: Arc<dyn sealed::AnyStorage>) -> Self {
        let inner = shared
            .as_any_arc()
            .downcast::<Inner<C>>()
            .ok()
            .expect("registry entries match the type they are keyed by");
        Self { inner }
    }

    /// Returns whether `entity` currently holds a `C` component.
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.table.read().mask.test(entity.index())
    }

    /// Returns a copy of the component of `entity`,
    /// or `C::default()` if the entity does not hold one. Never fails;
    /// reading a dead or missing entity is common in system code that
    /// double-checks membership.
    pub fn get(&self, entity: Entity) -> C {
        let table = self.inner.table.read();
        let index = entity.index();
        if table.mask.test(index) {
            table.rows.get(index).expect("present row is within the preallocated rows").clone()
        } else {
            C::default()
        }
    }

    /// Overwrites the row of `entity` unconditionally.
    ///
    /// The caller is responsible for having established presence through
    /// [`Pool::add`](crate::Pool::add) first. Updating a row whose presence
    /// bit is unset writes the value but leaves the row absent: [`get`]
    /// still reports `C::default()` and queries do not match the entity.
    /// Ids beyond the pool capacity are ignored.
    ///
    /// [`get`]: Self::get
    pub fn update(&self, entity: Entity, component: C) {
        let mut table = self.inner.table.write();
        if let Some(row) = table.rows.get_mut(entity.index()) {
            *row = component;
        }
    }

    /// Returns the entities currently holding this storage's component,
    /// in ascending id order.
    pub fn entities(&self) -> Vec<Entity> {
        let table = self.inner.table.read();
        table.mask.iter_ones().map(Entity::from_index).collect()
    }

    /// Returns the entities that hold this storage's component and every
    /// component in `others`, in ascending id order.
    ///
    /// With no operands this is exactly [`entities`](Self::entities).
    pub fn and(&self, others: &[&dyn Queryable]) -> Vec<Entity> { self.query(others, Op::And) }

    /// Returns the entities that hold this storage's component or any
    /// component in `others`, in ascending id order.
    pub fn or(&self, others: &[&dyn Queryable]) -> Vec<Entity> { self.query(others, Op::Or) }

    /// Returns the entities that hold this storage's component but none of
    /// the components in `others`, in ascending id order.
    pub fn but_not(&self, others: &[&dyn Queryable]) -> Vec<Entity> {
        self.query(others, Op::ButNot)
    }

    fn query(&self, others: &[&dyn Queryable], op: Op) -> Vec<Entity> {
        let mut sources: Vec<&dyn sealed::AnyStorage> = Vec::with_capacity(others.len() + 1);
        sources.push(self.erased());
        sources.extend(others.iter().map(|other| other.erased()));

        // lock each involved storage exactly once, in registration order
        sources.sort_by_key(|source| source.rank());
        sources.dedup_by_key(|source| source.rank());
        let ranks: Vec<usize> = sources.iter().map(|source| source.rank()).collect();
        let mut guards: Vec<MappedReadGuard<'_, Bitset>> =
            sources.iter().map(|source| source.mask()).collect();

        let own = ranks
            .binary_search(&self.inner.rank)
            .expect("the receiver was collected into sources");
        let mut mask: Bitset = guards[own].clone();

        for other in others {
            let position = ranks
                .binary_search(&other.erased().rank())
                .expect("every operand was collected into sources");
            let operand = &guards[position];
            match op {
                Op::And => mask.and(operand),
                Op::Or => mask.or(operand),
                Op::ButNot => mask.and_not(operand),
            }
        }

        // release in reverse acquisition order
        while guards.pop().is_some() {}

        mask.iter_ones().map(Entity::from_index).collect()
    }

    /// Acquires the storage lock once and returns a read view over the rows,
    /// for loops that would otherwise pay one lock round-trip per entity.
    ///
    /// See [`rows_mut`](Self::rows_mut) for the acquisition contract.
    pub fn rows(&self) -> Rows<'_, C> { Rows { table: self.inner.table.read() } }

    /// Acquires the storage lock once and returns a write view over the rows.
    ///
    /// This is the bulk-update path: one lock acquisition, then direct row
    /// access by entity id inside the loop. The lock is held until the view
    /// is dropped, with three obligations on the caller:
    ///
    /// - run queries ([`and`](Self::and) and friends) *before* acquiring the
    ///   view — queries lock storages internally and would self-deadlock;
    /// - when taking views over several storages, acquire them all before the
    ///   loop and in a consistent order across threads — use
    ///   [`lock_mut`](crate::lock_mut), which orders the acquisition for you;
    /// - treat [`get_mut`](RowsMut::get_mut) returning `None` (entity without
    ///   the component, e.g. killed since the query) as skip-this-entity.
    ///
    /// Pool-level calls ([`Pool::kill`](crate::Pool::kill) etc.) must not be
    /// made while a view is held.
    pub fn rows_mut(&self) -> RowsMut<'_, C> { RowsMut { table: self.inner.table.write() } }
}

/// Scoped read access to a storage's rows; holds the storage lock until dropped.
pub struct Rows<'a, C: Component> {
    table: ReadGuard<'a, Table<C>>,
}

impl<'a, C: Component> Rows<'a, C> {
    /// Returns the row of `entity`, or `None` if it holds no component.
    pub fn get(&self, entity: Entity) -> Option<&C> {
        let index = entity.index();
        if self.table.mask.test(index) {
            self.table.rows.get(index)
        } else {
            None
        }
    }

    /// Returns whether `entity` currently holds a component.
    pub fn contains(&self, entity: Entity) -> bool { self.table.mask.test(entity.index()) }
}

/// Scoped write access to a storage's rows; holds the storage lock until dropped.
///
/// See [`Storage::rows_mut`] for the acquisition contract.
pub struct RowsMut<'a, C: Component> {
    table: WriteGuard<'a, Table<C>>,
}

impl<'a, C: Component> RowsMut<'a, C> {
    /// Returns the row of `entity` mutably, or `None` if it holds no
    /// component — skip the entity in that case.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        let index = entity.index();
        if self.table.mask.test(index) {
            self.table.rows.get_mut(index)
        } else {
            None
        }
    }

    /// Returns the row of `entity`, or `None` if it holds no component.
    pub fn get(&self, entity: Entity) -> Option<&C> {
        let index = entity.index();
        if self.table.mask.test(index) {
            self.table.rows.get(index)
        } else {
            None
        }
    }

    /// Returns whether `entity` currently holds a component.
    pub fn contains(&self, entity: Entity) -> bool { self.table.mask.test(entity.index()) }
}

#[cfg(test)]
mod tests;
