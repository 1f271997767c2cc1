//! Tuple forms of the single-component operations, for arities 1 through 9.
//!
//! These are thin wrappers: each trait impl chains the corresponding
//! single-component call per tuple element and introduces no new semantics.
//! The one exception worth knowing about is [`lock_mut`], which acquires the
//! write locks of all listed storages in registration order regardless of the
//! order they appear in the tuple, so two threads locking overlapping sets
//! can never deadlock.
//!
//! Tuples are assumed to name distinct component types. This cannot be
//! checked at compile time; repeating a type panics on
//! [`Pool::register_many`] and self-deadlocks in [`lock_mut`].

use crate::entity::Entity;
use crate::pool::Pool;
use crate::storage::{Component, Queryable, RowsMut, Storage};

/// A tuple of component values that can be added to one entity in one call.
pub trait ComponentSet {
    /// Adds every component in the tuple via repeated
    /// [`Pool::add`](crate::Pool::add) — per component, first write wins and
    /// dead entities are ignored.
    fn add_to(self, pool: &Pool, entity: Entity);
}

/// A tuple of component types addressed together.
pub trait ComponentList {
    /// The matching tuple of storage handles.
    type Storages;

    /// Registers every component type in the tuple, in order.
    fn register(pool: &Pool);

    /// Fetches the storage handle of every component type in the tuple.
    fn storages(pool: &Pool) -> Self::Storages;

    /// Returns the entities holding every component type in the tuple.
    fn entities(pool: &Pool) -> Vec<Entity>;
}

/// A tuple of borrowed storage handles whose write locks can be taken together.
pub trait StorageList<'a> {
    /// The matching tuple of write views.
    type Guards;

    /// See [`lock_mut`].
    fn lock_mut(self) -> Self::Guards;
}

/// Acquires write views over every storage in the tuple, in registration
/// order regardless of tuple order, and returns them in tuple order.
///
/// This is the multi-storage form of [`Storage::rows_mut`]; the same
/// contract applies (query first, no pool calls while the views are held).
/// The views may be dropped in any order — only the acquisition order
/// matters for deadlock freedom.
///
/// ```
/// use sparsec::{lock_mut, Pool};
///
/// #[derive(Debug, Clone, Copy, Default, PartialEq)]
/// struct Position { x: f32 }
/// #[derive(Debug, Clone, Copy, Default, PartialEq)]
/// struct Velocity { dx: f32 }
///
/// let pool = Pool::new(8);
/// let entity = pool.create();
/// pool.add_many(entity, (Position { x: 0.0 }, Velocity { dx: 2.0 }));
///
/// let (positions, velocities) = pool.storages::<(Position, Velocity)>();
/// let moving = pool.entities_with::<(Position, Velocity)>();
///
/// let (mut position_rows, velocity_rows) = lock_mut((&positions, &velocities));
/// for entity in moving {
///     let (Some(pos), Some(vel)) = (position_rows.get_mut(entity), velocity_rows.get(entity))
///     else {
///         continue;
///     };
///     pos.x += vel.dx;
/// }
/// drop((position_rows, velocity_rows));
/// assert_eq!(positions.get(entity), Position { x: 2.0 });
/// ```
pub fn lock_mut<'a, L: StorageList<'a>>(storages: L) -> L::Guards { storages.lock_mut() }

impl Pool {
    /// Adds every component in the tuple to `entity`;
    /// shorthand for repeated [`add`](Self::add).
    pub fn add_many<S: ComponentSet>(&self, entity: Entity, components: S) {
        components.add_to(self, entity);
    }

    /// Registers every component type in the tuple;
    /// shorthand for repeated [`register`](Self::register).
    pub fn register_many<L: ComponentList>(&self) { L::register(self); }

    /// Fetches the storage handle of every component type in the tuple;
    /// shorthand for repeated [`storage`](Self::storage).
    pub fn storages<L: ComponentList>(&self) -> L::Storages { L::storages(self) }

    /// Returns the entities holding every component type in the tuple,
    /// in ascending id order; shorthand for an [`and`](Storage::and) query
    /// across the tuple's storages.
    pub fn entities_with<L: ComponentList>(&self) -> Vec<Entity> { L::entities(self) }
}

macro_rules! impl_batch {
    ($( ( $head:ident $head_idx:tt $head_var:ident $head_guard:ident
          $(, $ty:ident $idx:tt $var:ident $guard:ident)* ) )+) => { $(
        impl<$head: Component $(, $ty: Component)*> ComponentSet for ($head, $($ty,)*) {
            fn add_to(self, pool: &Pool, entity: Entity) {
                pool.add(entity, self.$head_idx);
                $(pool.add(entity, self.$idx);)*
            }
        }

        impl<$head: Component $(, $ty: Component)*> ComponentList for ($head, $($ty,)*) {
            type Storages = (Storage<$head>, $(Storage<$ty>,)*);

            fn register(pool: &Pool) {
                pool.register::<$head>();
                $(pool.register::<$ty>();)*
            }

            fn storages(pool: &Pool) -> Self::Storages {
                (pool.storage::<$head>(), $(pool.storage::<$ty>(),)*)
            }

            fn entities(pool: &Pool) -> Vec<Entity> {
                let ($head_var, $($var,)*) = Self::storages(pool);
                $head_var.and(&[$(&$var as &dyn Queryable),*])
            }
        }

        impl<'a, $head: Component $(, $ty: Component)*> StorageList<'a>
            for (&'a Storage<$head>, $(&'a Storage<$ty>,)*)
        {
            type Guards = (RowsMut<'a, $head>, $(RowsMut<'a, $ty>,)*);

            fn lock_mut(self) -> Self::Guards {
                let ($head_var, $($var,)*) = self;

                let mut order =
                    [($head_var.erased().rank(), $head_idx) $(, ($var.erased().rank(), $idx))*];
                order.sort_unstable_by_key(|&(rank, _)| rank);

                let mut $head_guard = None;
                $(let mut $guard = None;)*
                for &(_, position) in &order {
                    match position {
                        $head_idx => $head_guard = Some($head_var.rows_mut()),
                        $($idx => $guard = Some($var.rows_mut()),)*
                        _ => unreachable!("positions cover the tuple arity"),
                    }
                }
                (
                    $head_guard.expect("every tuple position is visited once"),
                    $($guard.expect("every tuple position is visited once"),)*
                )
            }
        }
    )+ }
}

impl_batch! {
    (A 0 a ga)
    (A 0 a ga, B 1 b gb)
    (A 0 a ga, B 1 b gb, C 2 c gc)
    (A 0 a ga, B 1 b gb, C 2 c gc, D 3 d gd)
    (A 0 a ga, B 1 b gb, C 2 c gc, D 3 d gd, E 4 e ge)
    (A 0 a ga, B 1 b gb, C 2 c gc, D 3 d gd, E 4 e ge, F 5 f gf)
    (A 0 a ga, B 1 b gb, C 2 c gc, D 3 d gd, E 4 e ge, F 5 f gf, G 6 g gg)
    (A 0 a ga, B 1 b gb, C 2 c gc, D 3 d gd, E 4 e ge, F 5 f gf, G 6 g gg, H 7 h gh)
    (A 0 a ga, B 1 b gb, C 2 c gc, D 3 d gd, E 4 e ge, F 5 f gf, G 6 g gg, H 7 h gh, I 8 i gi)
}
