//! Core data types for Resman

pub mod access_event;
pub mod counter;
pub mod membership;
