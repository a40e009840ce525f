//! Integration tests for veribench
//!
//! These drive whole batches through a scripted stand-in verifier and then
//! join the resulting trees, the same way a benchmark campaign would.

pub mod cli;
pub mod helpers;
pub mod pipeline;
pub mod sat_missing;
