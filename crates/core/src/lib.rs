//! Pure domain logic for the depot push fan-out.
//!
//! Nothing in this crate performs I/O. The database layer (`depot-db`) and
//! the fan-out engine (`depot-events`) build on these types.

pub mod audience;
pub mod batching;
pub mod delivery;
pub mod error;
pub mod event_kind;
pub mod message;
pub mod roles;
pub mod types;
