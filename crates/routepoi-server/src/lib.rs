//! Shared library surface for the routepoi server and its tests.

pub mod api;
pub mod cache;
pub mod config;
pub mod state;
