//! Analysis modules.
//!
//! Region aggregation, label normalization, venue statistics and
//! column descriptions.

pub mod aggregator;
pub mod correlation;
pub mod describe;
pub mod regions;

pub use aggregator::*;
pub use correlation::correlation_matrix;
pub use describe::describe;
pub use regions::{is_unknown, UNKNOWN_REGION};
