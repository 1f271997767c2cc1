//! A fixed-capacity entity-component pool with generational ids and bitset
//! queries.
//!
//! # The model
//! Think of the [`Pool`] as a table. Every registered component type
//! contributes one column — a [`Storage`] holding a preallocated array of
//! that component, one row per entity slot, plus a presence bitset marking
//! which rows are occupied. An [`Entity`] is nothing but a row index into
//! every column at once: it carries no data of its own and is recycled
//! through a free list when killed, with a per-slot [`Generation`] counter
//! to unmask stale references to a recycled id.
//!
//! Queries are boolean algebra over presence bitsets: [`Storage::and`],
//! [`Storage::or`] and [`Storage::but_not`] combine this storage's bitset
//! with other storages' and enumerate the matching entity ids in ascending
//! order. That makes "all entities with a position and a velocity but no
//! freeze effect" one clone and two word-wise passes, independent of how
//! many component types exist.
//!
//! # Concurrency
//! Every operation takes `&self` and may be called from any number of
//! threads. Entity lifecycle and registration serialize on one pool-wide
//! lock; each storage has its own lock for row access; multi-storage
//! operations (queries, [`lock_mut`]) acquire storage locks in registration
//! order so opposite-order callers cannot deadlock. For single-threaded
//! programs the locking can be switched off per pool with
//! [`PoolOptions::single_threaded`].
//!
//! # Example
//! ```
//! use sparsec::Pool;
//!
//! #[derive(Debug, Clone, Copy, Default, PartialEq)]
//! struct Position { x: f32, y: f32 }
//! #[derive(Debug, Clone, Copy, Default, PartialEq)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! let pool = Pool::new(64);
//! let player = pool.create();
//! let rock = pool.create();
//! pool.add(player, Position { x: 1.0, y: 2.0 });
//! pool.add(player, Velocity { dx: 0.5, dy: 0.0 });
//! pool.add(rock, Position { x: 9.0, y: 9.0 });
//!
//! let positions = pool.storage::<Position>();
//! let velocities = pool.storage::<Velocity>();
//!
//! // query before locking...
//! let moving = positions.and(&[&velocities]);
//! assert_eq!(moving, vec![player]);
//!
//! // ...then lock once and update in bulk
//! {
//!     let mut position_rows = positions.rows_mut();
//!     let velocity_rows = velocities.rows();
//!     for entity in moving {
//!         let (Some(pos), Some(vel)) =
//!             (position_rows.get_mut(entity), velocity_rows.get(entity))
//!         else {
//!             continue;
//!         };
//!         pos.x += vel.dx;
//!         pos.y += vel.dy;
//!     }
//! }
//! assert_eq!(positions.get(player), Position { x: 1.5, y: 2.0 });
//! ```

#![cfg_attr(debug_assertions, allow(dead_code, unused_variables))]
#![cfg_attr(not(debug_assertions), deny(missing_docs))]
#![cfg_attr(doc, warn(missing_docs))]

pub mod batch;
pub use batch::{lock_mut, ComponentList, ComponentSet, StorageList};

pub mod bitset;
pub use bitset::Bitset;

pub mod entity;
pub use entity::{Entity, Generation};

pub mod pool;
pub use pool::{Pool, PoolOptions};

pub mod storage;
pub use storage::{Component, Queryable, Rows, RowsMut, Storage};

pub mod sync;

#[cfg(test)]
mod test_util;

mod util;
