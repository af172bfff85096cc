//! # Domain Models
//!
//! Pure TrAi domain types: configuration, enumerations, the weekly schedule set,
//! cross-slice events and the slice registry.
//! Keep it lean: no I/O, networking, or heavy logic. Just data and simple helpers.

pub mod config;
pub mod constants;
pub mod enums;
pub mod events;
pub mod registry;
pub mod schedule;
