pub mod batch;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod join;
pub mod logging;
pub mod models;
pub mod results;
pub mod store;
pub mod supervisor;

pub use error::{BenchError, BenchResult};
