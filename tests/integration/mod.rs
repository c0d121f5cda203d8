//! Integration test modules for the adapter

pub mod automation;
pub mod library;
pub mod parameters;
