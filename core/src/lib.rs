//! Heartbeat Relay Core Library
//! Local HTTP relay that forwards time-tracking heartbeats to a
//! caller-specified upstream API and relays its answer back

pub mod config;
pub mod relay;
