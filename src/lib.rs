//! Sector Factions - deterministic turn rules for multi-faction strategy play

pub mod catalog;
pub mod core;
pub mod scenario;
pub mod sector;
