// --- File: crates/quincho_store/src/lib.rs ---
// Declare modules within this crate
pub mod memory;

pub use memory::InMemoryStore;
