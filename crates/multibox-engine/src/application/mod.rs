//! Application layer use cases for the broadcast engine.
//!
//! Use cases in this layer orchestrate domain objects to fulfil an operator
//! goal, depend on traits rather than concrete implementations, and contain
//! no OS calls of their own — external queries and injection go through the
//! [`resolve_windows::WindowQuery`] and [`broadcast_input::InputInjector`]
//! seams, whose production implementations live in the infrastructure layer.
//!
//! # Sub-modules
//!
//! - **`broadcast_input`** – Consumes canonicalized key events, tracks the
//!   modifier/pressed/broadcast state, and fans key-down/key-up injections
//!   out to the target windows. This is the most critical use case — it runs
//!   on every keystroke.
//!
//! - **`mouse`** – Fans click releases out to the target windows while
//!   broadcast is active.
//!
//! - **`resolve_windows`** – Builds the ordered window list from the
//!   configured name patterns and answers focus queries against it.

pub mod broadcast_input;
pub mod mouse;
pub mod resolve_windows;
