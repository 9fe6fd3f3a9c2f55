// --- File: crates/quincho_auth/src/lib.rs ---
// Declare modules within this crate
pub mod handlers;
pub mod routes;
pub mod service;
#[cfg(test)]
mod service_test;

pub use service::SessionAuthService;
