//! Core resolution logic.
//!
//! This module contains:
//! - Resolver: ordered barcode resolver chain
//! - Recognition: image-to-product path
//! - Stores: store aggregation with mock fallback, filtering and grouping
//! - Orchestrator: dispatch of captures to the right path

pub mod orchestrator;
pub mod recognition;
pub mod resolver;
pub mod stores;

// Re-export commonly used types
pub use orchestrator::{Capture, Orchestrator, PipelineOutput};
pub use recognition::{identity_from_annotations, ImageResolver};
pub use resolver::{BarcodeChain, ChainResolution, Lookup, StageAttempt, StageOutcome};
pub use stores::{
    filter_stores, group_stores_by_type, mock_panel, MockStoreSource, StoreAggregator,
    StoreFilter, StoreSearch,
};
