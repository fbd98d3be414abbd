//! Rule-based extraction from unstructured text.
//!
//! - `segmenter`: transcript -> task candidates
//! - `rules`: ordered classification tables used by the segmenter
//! - `attributes`: size / quantity / brand from product text

pub mod attributes;
pub mod rules;
pub mod segmenter;

pub use attributes::{extract_brand, extract_quantity, extract_size};
pub use rules::{Rule, RelativeDate};
pub use segmenter::{parse_tasks, parse_transcript, parse_transcript_at, summarize};
