//! Miscellaneous internal helpers.

use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A [`TypeId`] bundled with the type name, so that registry keys
/// show up readable in panic messages and logs.
///
/// Equality and hashing delegate to the [`TypeId`] alone.
#[derive(Clone, Copy)]
pub(crate) struct DbgTypeId {
    id:   TypeId,
    name: &'static str,
}

impl DbgTypeId {
    pub(crate) fn of<T: 'static>() -> Self {
        Self { id: TypeId::of::<T>(), name: any::type_name::<T>() }
    }
}

impl PartialEq for DbgTypeId {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for DbgTypeId {}

impl Hash for DbgTypeId {
    fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state); }
}

impl fmt::Debug for DbgTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name) }
}

impl fmt::Display for DbgTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name) }
}
