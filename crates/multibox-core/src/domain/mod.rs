//! Pure domain logic: control bindings and the ordered window list.
//!
//! Nothing in this module performs I/O. The engine resolves every captured
//! key against [`bindings::KeyBindings`] and walks [`window::WindowList`] for
//! focus tracking; both are plain data structures that are trivial to drive
//! from tests.

pub mod bindings;
pub mod window;
