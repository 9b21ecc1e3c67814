//! Carta application services: async catalog and promotion store seams, the promotion
//! snapshot, and the promotions service that runs drafts through the engine.

pub mod catalog;
pub mod config;
pub mod context;
pub mod memory;
pub mod observability;
pub mod service;
pub mod snapshot;
pub mod store;

#[cfg(test)]
mod test_support;
