//! TorqueProX record service: library crate.
//!
//! Re-exports all modules so the binary (`main.rs`) and `tpx-e2e-tests`
//! can reach `AppState`, `build_router` and the storage backends.

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod store;
