// --- File: crates/quincho_booking/src/lib.rs ---
// Declare modules within this crate
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod routes;
pub mod service;

#[cfg(test)]
mod service_test;

pub use service::BookingService;
