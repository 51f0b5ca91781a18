//! Timebox: recurring schedule windows for tasks with a lifecycle.
//!
//! This crate keeps tasks in a small state machine and guarantees that the
//! weekly time windows of active tasks never overlap.
//!
//! # Architecture
//!
//! Timebox follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`config`]: Scheduler tunables loaded from TOML
//! - [`task`]: Task lifecycle, schedules and the conflict index

pub mod config;
pub mod task;
