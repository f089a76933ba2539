//! Utility functions for the application

pub mod csv;
pub mod file;
pub mod time;
