//! Domain types: the coin queue, the persisted snapshot, and the store port.

pub mod coins;
pub mod ports;
pub mod snapshot;
