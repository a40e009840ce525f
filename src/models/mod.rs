pub mod consistency;
pub mod key;
pub mod record;
pub mod run;

pub use consistency::{ConsistencyLevel, Verdict};
pub use key::{ConfigId, ExperimentKey, RunId, RUN_ID_PREFIX};
pub use record::AggregatedRecord;
pub use run::{VerificationMode, VerificationRun};
