//! The pool owns the entity id space and the registry of component storages.
//!
//! Think of the pool as a table: each registered component type contributes a
//! column (a [`Storage`]), and an entity is a row index into every column at
//! once. The pool hands out row indices ([`create`](Pool::create)), takes them
//! back ([`kill`](Pool::kill)) and keeps the bookkeeping that lets a kill
//! clear exactly the columns the entity used. All of that state sits under one
//! pool-wide lock — entity lifecycle events are rare and cheap next to
//! per-component work, so the coarse lock is deliberate.

use std::collections::VecDeque;
use std::mem;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::bitset::Bitset;
use crate::entity::{Entity, Generation};
use crate::storage::sealed::AnyStorage as _;
use crate::storage::{sealed, Component, Inner, Storage};
use crate::sync::SwitchLock;
use crate::util::DbgTypeId;

/// Construction-time configuration of a [`Pool`].
///
/// Options are per pool, so pools with different policies coexist in one
/// process and tests cannot leak configuration into each other.
#[derive(Debug, Clone, Copy)]
pub struct PoolOptions {
    auto_register: bool,
    locking:       bool,
}

impl Default for PoolOptions {
    fn default() -> Self { Self { auto_register: true, locking: true } }
}

impl PoolOptions {
    /// The default options: auto-registration on, locking on.
    pub fn new() -> Self { Self::default() }

    /// Sets whether component types are registered lazily on first use.
    ///
    /// On by default. When disabled, accessing an unregistered component type
    /// panics; every type must be registered up front through
    /// [`Pool::register`] or [`Pool::register_many`].
    #[must_use]
    pub fn auto_register(mut self, enabled: bool) -> Self {
        self.auto_register = enabled;
        self
    }

    /// Disables all internal locking for single-threaded-only use.
    ///
    /// Lock and unlock calls become no-ops, which removes the per-operation
    /// locking overhead — and with it the crate's only concurrency guarantee.
    ///
    /// # Safety
    /// The constructed pool, all its [`Storage`] handles and all views derived
    /// from them must only ever be accessed from one thread, and no row view
    /// ([`Storage::rows`]/[`Storage::rows_mut`]) may be held across another
    /// call into the same storage or pool. Violating either is undefined
    /// behavior, not just a logic error.
    #[must_use]
    pub unsafe fn single_threaded(mut self) -> Self {
        self.locking = false;
        self
    }
}

struct Core {
    /// One bit per slot, set iff the slot currently denotes a live entity.
    alive:       Bitset,
    /// Killed entities awaiting reuse, oldest first.
    free:        VecDeque<Entity>,
    /// Per-slot reuse counters, bumped when the slot is killed.
    generations: Vec<Generation>,
    /// Registration ranks of the storages each slot holds a component in.
    /// Consulted on kill so only the columns the entity used are cleared.
    used:        Vec<Vec<usize>>,
    /// The next never-yet-allocated slot.
    next:        usize,
    /// Storage registry; the map index of an entry is its registration rank,
    /// which doubles as the global lock order for multi-storage operations.
    storages:    IndexMap<DbgTypeId, Arc<dyn sealed::AnyStorage>>,
}

/// A fixed-capacity pool of entities and their component storages.
///
/// Entity ids run from 1 to `capacity`; the pool never grows. All operations
/// take `&self` and are safe to call from multiple threads concurrently
/// (unless locking was disabled through [`PoolOptions::single_threaded`]).
///
/// ```
/// use sparsec::Pool;
///
/// #[derive(Debug, Clone, Copy, Default, PartialEq)]
/// struct Health(i32);
///
/// let pool = Pool::new(16);
/// let entity = pool.create();
/// pool.add(entity, Health(100));
/// assert!(pool.has::<Health>(entity));
///
/// pool.kill(entity);
/// assert!(!pool.is_alive(entity));
/// assert!(!pool.has::<Health>(entity));
/// ```
pub struct Pool {
    capacity: usize,
    options:  PoolOptions,
    core:     SwitchLock<Core>,
}

impl Pool {
    /// Creates a pool sized for `capacity` live entities, with default options.
    ///
    /// The pool preallocates its bookkeeping (and later each storage) for
    /// `capacity + 1` slots, slot 0 being reserved; it does not grow, shrink
    /// or compact afterwards.
    pub fn new(capacity: usize) -> Self { Self::with_options(capacity, PoolOptions::default()) }

    /// Creates a pool sized for `capacity` live entities.
    pub fn with_options(capacity: usize, options: PoolOptions) -> Self {
        let slots = capacity.checked_add(1).expect("capacity + 1 must not overflow");
        let _: u32 = slots.try_into().expect("capacity must fit in u32");

        let core = Core {
            alive:       Bitset::with_capacity(slots),
            free:        VecDeque::new(),
            generations: vec![Generation::default(); slots],
            used:        vec![Vec::new(); slots],
            next:        1,
            storages:    IndexMap::new(),
        };
        Self { capacity, options, core: SwitchLock::new(core, options.locking) }
    }

    /// Returns the maximum number of live entities.
    pub fn capacity(&self) -> usize { self.capacity }

    /// Allocates an entity, recycling the oldest killed slot if one exists.
    ///
    /// A recycled slot reports no components: its rows were cleared when it
    /// was killed.
    ///
    /// # Panics
    /// Panics when the pool is full — a configuration error (the pool was
    /// sized too small), not a runtime condition to retry.
    pub fn create(&self) -> Entity {
        let mut core = self.core.write();
        if let Some(entity) = core.free.pop_front() {
            core.alive.set(entity.index());
            return entity;
        }

        if core.next > self.capacity {
            panic!(
                "entity capacity exceeded: pool was sized for {} live entities",
                self.capacity
            );
        }
        let entity = Entity::from_index(core.next);
        core.next += 1;
        core.alive.set(entity.index());
        entity
    }

    /// Kills `entity`: clears its alive bit, bumps its slot generation, puts
    /// the slot on the free list and clears its row in every storage it used.
    ///
    /// Killing an already-dead entity, or one from a larger pool, is a no-op.
    pub fn kill(&self, entity: Entity) { self.kill_many([entity]); }

    /// Kills every entity in `entities`; see [`kill`](Self::kill).
    pub fn kill_many<I: IntoIterator<Item = Entity>>(&self, entities: I) {
        let mut core = self.core.write();
        for entity in entities {
            let index = entity.index();
            if !core.alive.test(index) {
                continue;
            }
            core.alive.clear(index);
            core.generations.get_mut(index).expect("alive slot is in range").bump();
            core.free.push_back(entity);

            let mut used = mem::take(core.used.get_mut(index).expect("alive slot is in range"));
            log::trace!("killing {entity:?}, clearing {} component rows", used.len());
            for rank in used.drain(..) {
                let (_, storage) =
                    core.storages.get_index(rank).expect("used ranks refer to registered storages");
                storage.clear_row(entity);
            }
            // hand the emptied list back so its allocation is reused
            *core.used.get_mut(index).expect("alive slot is in range") = used;
        }
    }

    /// Returns whether `entity` is currently alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.core.read().alive.test(entity.index())
    }

    /// Returns the generation of the slot behind `entity`.
    ///
    /// The generation counts how often the slot was killed; capture it next
    /// to an entity reference stored inside component data, and revalidate
    /// with [`is_alive_with_generation`](Self::is_alive_with_generation).
    pub fn generation(&self, entity: Entity) -> Generation {
        self.core.read().generations.get(entity.index()).copied().unwrap_or_default()
    }

    /// Like [`is_alive`](Self::is_alive), but additionally requires the slot
    /// generation to equal `generation` — i.e. the id still denotes the same
    /// logical entity it did when the generation was captured, not a later
    /// occupant of the recycled slot.
    pub fn is_alive_with_generation(&self, entity: Entity, generation: Generation) -> bool {
        let core = self.core.read();
        let index = entity.index();
        core.alive.test(index)
            && core.generations.get(index).copied().unwrap_or_default() == generation
    }

    /// Registers the storage for component type `C` explicitly.
    ///
    /// Optional when auto-registration is on; mandatory, before first use,
    /// when it is off.
    ///
    /// # Panics
    /// Panics if `C` is already registered — a programmer error, surfaced at
    /// the call site.
    pub fn register<C: Component>(&self) {
        let key = DbgTypeId::of::<C>();
        let mut core = self.core.write();
        if core.storages.contains_key(&key) {
            panic!("component type {key} is already registered");
        }
        self.insert_storage::<C>(&mut core, key);
    }

    /// Returns the storage handle for component type `C`.
    ///
    /// If `C` has no storage yet it is registered lazily, sized to the pool
    /// capacity.
    ///
    /// # Panics
    /// Panics if `C` is unregistered and auto-registration is disabled.
    pub fn storage<C: Component>(&self) -> Storage<C> {
        let key = DbgTypeId::of::<C>();
        {
            let core = self.core.read();
            if let Some(shared) = core.storages.get(&key) {
                return Storage::from_dyn(Arc::clone(shared));
            }
        }

        let mut core = self.core.write();
        // racing callers may have registered it between the two acquisitions
        if let Some(shared) = core.storages.get(&key) {
            return Storage::from_dyn(Arc::clone(shared));
        }
        if !self.options.auto_register {
            panic!("component type {key} was not registered and auto-registration is disabled");
        }
        Storage { inner: self.insert_storage::<C>(&mut core, key) }
    }

    /// Adds component `component` to `entity`.
    ///
    /// A no-op if the entity is dead. Re-adding a component type the entity
    /// already has is also a no-op: the first written value wins, and a
    /// second `add` does not overwrite it — use [`Storage::update`] to
    /// overwrite. Registers the storage lazily like [`storage`](Self::storage).
    pub fn add<C: Component>(&self, entity: Entity, component: C) {
        let mut core = self.core.write();
        let index = entity.index();
        if !core.alive.test(index) {
            return;
        }

        let inner = self.storage_locked::<C>(&mut core);
        {
            let mut table = inner.table.write();
            if table.mask.test(index) {
                return; // first write wins
            }
            table.mask.set(index);
            *table.rows.get_mut(index).expect("alive slot is within the preallocated rows") =
                component;
        }
        core.used.get_mut(index).expect("alive slot is in range").push(inner.rank);
    }

    /// Removes component type `C` from `entity`, zeroing its row.
    ///
    /// A no-op if the entity does not hold `C` (including dead entities).
    pub fn remove<C: Component>(&self, entity: Entity) {
        let mut core = self.core.write();
        let index = entity.index();

        let inner = self.storage_locked::<C>(&mut core);
        {
            let mut table = inner.table.write();
            if !table.mask.test(index) {
                return;
            }
            table.mask.clear(index);
            *table.rows.get_mut(index).expect("present row is within the preallocated rows") =
                C::default();
        }

        let used = core.used.get_mut(index).expect("present row implies an in-range slot");
        if let Some(position) = used.iter().rposition(|&rank| rank == inner.rank) {
            used.swap_remove(position);
        }
    }

    /// Returns whether `entity` holds a component of type `C`.
    ///
    /// Registers the storage lazily like [`storage`](Self::storage).
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.storage::<C>().contains(entity)
    }

    fn insert_storage<C: Component>(&self, core: &mut Core, key: DbgTypeId) -> Arc<Inner<C>> {
        let rank = core.storages.len();
        let inner = Arc::new(Inner::<C>::new(rank, self.capacity + 1, self.options.locking));
        core.storages.insert(key, Arc::clone(&inner) as Arc<dyn sealed::AnyStorage>);
        log::debug!("registered storage for {key} with rank {rank}");
        inner
    }

    fn storage_locked<C: Component>(&self, core: &mut Core) -> Arc<Inner<C>> {
        let key = DbgTypeId::of::<C>();
        if let Some(shared) = core.storages.get(&key) {
            return Arc::clone(shared)
                .as_any_arc()
                .downcast::<Inner<C>>()
                .ok()
                .expect("registry entries match the type they are keyed by");
        }
        if !self.options.auto_register {
            panic!("component type {key} was not registered and auto-registration is disabled");
        }
        self.insert_storage::<C>(core, key)
    }
}
