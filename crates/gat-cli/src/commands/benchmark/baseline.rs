//! Baseline data loading for benchmark comparisons.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Load baseline objective values from a CSV file.
///
/// Expected format:
/// ```csv
/// case_name,objective
/// pglib_opf_case5_pjm,17551.89
/// pglib_opf_case14_ieee,8081.53
/// ```
pub fn load_baseline_objectives(path: &Path) -> Result<HashMap<String, f64>> {
    let mut map = HashMap::new();

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening baseline CSV: {}", path.display()))?;

    for result in reader.records() {
        let record = result.with_context(|| "reading baseline CSV record")?;

        let case_name = record
            .get(0)
            .ok_or_else(|| anyhow::anyhow!("missing case_name column"))?
            .to_string();

        let objective: f64 = record
            .get(1)
            .ok_or_else(|| anyhow::anyhow!("missing objective column"))?
            .parse()
            .with_context(|| format!("parsing objective for {}", case_name))?;

        map.insert(case_name, objective);
    }

    Ok(map)
}

/// Normalize case name for matching (strip extensions, lowercase)
pub fn normalize_case_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .trim_end_matches(".m")
        .trim_end_matches(".json")
        .to_string()
}
