//! Domain types for the ellio pipeline.
//!
//! This module contains the core data structures:
//! - Task: candidates parsed from transcripts
//! - Product: identities produced by the resolver chain
//! - Store: availability records and store types

pub mod product;
pub mod store;
pub mod task;

// Re-export commonly used types
pub use product::{ProductIdentity, ResolutionResult, StoreProvenance};
pub use store::{Coordinates, StoreAvailabilityRecord, StoreType, UnknownStoreType};
pub use task::{Category, ParsedTaskList, Priority, TaskCandidate, UnknownCategory};
