//! Testing utilities for map-reduce jobs.
//!
//! - **Assertions**: compare result mappings with expected entries, check
//!   conservation of emitted values
//! - **Fixtures**: canned inputs for word-count style jobs
//!
//! # Quick Start
//!
//! ```
//! use ironreduce::*;
//! use ironreduce::testing::*;
//!
//! let out = word_count(&["a b", "b"]).unwrap();
//! assert_mapping_eq(&out, &[("a".to_string(), 1), ("b".to_string(), 2)]);
//! ```

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
