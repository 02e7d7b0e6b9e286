//! Session credentials, JWT claims, and the in-memory session holder.

pub mod claims;
pub mod session;
pub mod token;

pub use claims::*;
pub use session::*;
pub use token::{grant::*, pair::*, secret::*};
