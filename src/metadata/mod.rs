//! Metadata lookup wiring: where mapping metadata is searched for and how
//! parsed metadata is cached.

pub mod cache;
pub mod directory;

pub use cache::{CacheConfig, CacheStrategySelector};
pub use directory::{DirectoryMap, DirectoryResolver};
