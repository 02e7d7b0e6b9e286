//! Public extension contracts.
//!
//! The crate exposes the session observer as a trait so applications can bridge refresh and
//! logout notifications into whatever state container or router they already use.

pub mod session_observer;

pub use session_observer::*;
