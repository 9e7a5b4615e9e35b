//! Batch flow aggregation
//!
//! Collapses a finite packet sequence into one summary record per
//! distinct flow key. This is a single-batch design: there is no
//! timeout-based expiry and no splitting on idle gaps, so a conversation
//! that pauses and resumes within the batch is still one flow. A
//! continuously-running adaptation would need a time-windowed flush.

mod aggregator;

pub use aggregator::aggregate;
