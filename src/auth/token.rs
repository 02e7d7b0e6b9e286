//! Token secrets, the persisted token pair, and upstream grant payloads.

pub mod grant;
pub mod pair;
pub mod secret;
