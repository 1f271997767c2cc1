//! Shared helpers for unit tests.

use parking_lot::Once;

/// Initializes the test logger. Safe to call from every test.
pub(crate) fn init() {
    static SET_LOGGER_ONCE: Once = Once::new();
    SET_LOGGER_ONCE.call_once(env_logger::init);
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Pos {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Vel {
    pub(crate) dx: f32,
    pub(crate) dy: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Health(pub(crate) i32);
