pub mod job;
pub mod manifest;
pub mod runner;

pub use job::{jobs_from_artifacts, BatchJob, BatchJobRecord, TaskKind};
pub use manifest::{write_batch_manifest, BatchManifest};
pub use runner::{run_batch, BatchRunnerConfig, BatchSummary};
