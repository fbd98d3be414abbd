//! ellio - extraction and resolution pipeline for a consumer assistant
//!
//! Turns captured input into structured data:
//! - a spoken transcript becomes a list of task candidates
//! - a barcode or product photo becomes a product identity
//! - a product identity becomes a list of nearby stores
//!
//! # Architecture
//!
//! Extraction is pure and rule-based (ordered regex tables). Resolution is
//! an ordered chain of provider strategies; each stage reports found, not
//! found or unavailable, and the chain stops at the first hit. Store search
//! always ends in a mock panel, so zero configuration still yields results.
//!
//! # Modules
//!
//! - `adapters`: Provider strategies (Open Food Facts, UPCitemdb, Cloud Vision, Places)
//! - `core`: Resolver chain, image recognition, store aggregation, orchestrator
//! - `domain`: Data structures (TaskCandidate, ProductIdentity, StoreAvailabilityRecord)
//! - `extract`: Transcript segmentation and product attribute extraction
//! - `ingest`: Voice session state
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! ellio parse "buy milk and eggs, then call the dentist tomorrow"
//! ellio barcode 737628064502
//! ellio stores --name "oat milk" --in-stock-only --grouped
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod extract;
pub mod ingest;

// Re-export main types at crate root for convenience
pub use core::{Capture, Orchestrator, PipelineOutput, StoreFilter};
pub use domain::{
    Category, ParsedTaskList, Priority, ProductIdentity, ResolutionResult,
    StoreAvailabilityRecord, StoreProvenance, StoreType, TaskCandidate,
};
pub use extract::{extract_brand, extract_quantity, extract_size, parse_transcript};
pub use ingest::{VoiceError, VoiceSession};
