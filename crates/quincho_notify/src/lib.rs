// --- File: crates/quincho_notify/src/lib.rs ---
// Declare modules within this crate
pub mod service;
pub mod templates;

pub use service::EmailNotifier;
