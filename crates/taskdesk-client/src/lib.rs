pub mod api;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod navigation;
pub mod persistence;
pub mod reconcile;
pub mod session;
pub mod utils;
pub mod validation;
pub mod workflows;

#[cfg(test)]
mod testing;
