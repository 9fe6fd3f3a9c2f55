// --- File: crates/quincho_common/src/lib.rs ---
// Declare modules within this crate
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod services;
