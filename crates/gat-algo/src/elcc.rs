use anyhow::Result;
use polars::prelude::*;
use std::path::Path;

use crate::io::{persist_dataframe, OutputStage};

#[derive(Debug, Clone, PartialEq)]
pub struct ElccSummary {
    pub num_resource_classes: usize,
    pub num_output_rows: usize,
}

pub fn elcc_estimation(
    resource_profiles: &Path,
    reliability_metrics: &Path,
    out: &Path,
    partitions: &[String],
    _max_jobs: usize, // Placeholder for future use
) -> Result<ElccSummary> {
    // For now, this is a placeholder.
    // In a real implementation, this would:
    // 1. Load resource profiles and reliability metrics using Polars.
    // 2. Perform ELCC estimation calculations as described in the roadmap:
    //    - For each resource class, estimate marginal ELCC by simulating
    //      reliability metrics with and without incremental capacity.
    // 3. Create a Polars DataFrame with the results (class_id, elcc_mean, ci_lo, ci_hi).
    // 4. Persist the DataFrame to the output path using `persist_dataframe`.

    println!("Performing ELCC estimation...");
    println!("Resource profiles: {:?}", resource_profiles);
    println!("Reliability metrics: {:?}", reliability_metrics);
    println!("Output path: {:?}", out);
    println!("Partitions: {:?}", partitions);

    // Simulate some output data
    let class_id_series = Series::new("class_id", &["solar", "wind", "storage"]);
    let elcc_mean_series = Series::new("elcc_mean", &[0.8, 0.7, 0.9]);
    let elcc_ci_lo_series = Series::new("elcc_ci_lo", &[0.75, 0.65, 0.85]);
    let elcc_ci_hi_series = Series::new("elcc_ci_hi", &[0.85, 0.75, 0.95]);

    let mut df = DataFrame::new(vec![
        class_id_series,
        elcc_mean_series,
        elcc_ci_lo_series,
        elcc_ci_hi_series,
    ])?;

    persist_dataframe(&mut df, out, partitions, OutputStage::AnalyticsElcc.as_str())?;

    Ok(ElccSummary {
        num_resource_classes: 3,
        num_output_rows: df.height(),
    })
}
