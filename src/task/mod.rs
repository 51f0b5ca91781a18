//! Task lifecycle management for Timebox.
//!
//! Tasks move through `planned`, `active`, `paused`, `finished` and
//! `archived` under a fixed transition table. Each task owns recurring
//! schedule windows, and the windows of every active task are held in a
//! conflict index so no two active tasks share a minute on a shared weekday.
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
