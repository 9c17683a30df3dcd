//! Per-country orchestration: reduce topology, build matrices, select sets,
//! search IFs, emit CSVs. Countries are independent pipelines with their
//! own arenas and output directories (§7) — a fatal error in one country is
//! caught, logged, and converted into a skipped-country outcome here, and
//! never unwinds past this module's per-country loop.

use std::path::Path;

use gat_core::diagnostics::Diagnostics;
use tracing::{error, info, warn};

use crate::config::IfaConfig;
use crate::error::IfaResult;
use crate::graph::Graph;
use crate::matrix::MatrixEngine;
use crate::output;
use crate::reducer::{self, CouplerPolicy};
use crate::search::{self, BranchIfResult, GeneratorIfResult};
use crate::sets::{self, OperationalSets};

/// Everything a single country's run produced: the reduced graph and its
/// matrices (kept for CSV output and audit snapshots), plus the search
/// results and accumulated diagnostics.
pub struct CountryOutcome {
    pub country: String,
    pub graph: Graph,
    pub matrix: MatrixEngine,
    pub branch_results: Vec<BranchIfResult>,
    pub generator_results: Vec<GeneratorIfResult>,
    pub diagnostics: Diagnostics,
}

/// Summary of a full multi-country run: one [`CountryOutcome`] per country
/// that completed, plus the list of countries that were skipped due to a
/// fatal error (with the error message that caused the skip).
#[derive(Default)]
pub struct RunSummary {
    pub completed: Vec<CountryOutcome>,
    pub skipped: Vec<(String, String)>,
}

impl RunSummary {
    /// Non-zero exit is warranted when at least one configured country
    /// failed outright — a generator-with-no-peer condition never
    /// contributes here, since it is folded into per-country diagnostics
    /// rather than a skip.
    pub fn had_fatal_failure(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Runs the full pipeline for every active country in `config`, given a
/// constructor that builds the raw (unreduced) [`Graph`] for a country name.
/// Isolates each country's fatal errors so one bad input never prevents the
/// rest of the run from completing.
pub fn run_all(
    config: &IfaConfig,
    out_dir: &Path,
    mut build_raw_graph: impl FnMut(&str) -> IfaResult<Graph>,
) -> IfaResult<RunSummary> {
    let mut summary = RunSummary::default();

    for country in config.active_countries() {
        info!(country, "starting IF analysis");
        let graph = match build_raw_graph(country) {
            Ok(g) => g,
            Err(e) => {
                error!(country, error = %e, "failed to build input graph; skipping country");
                summary.skipped.push((country.to_string(), e.to_string()));
                continue;
            }
        };

        match run_country(config, graph) {
            Ok(outcome) => {
                if let Err(e) = write_country_outputs(out_dir, &outcome) {
                    warn!(country, error = %e, "failed to write outputs for country");
                }
                summary.completed.push(outcome);
            }
            Err(e) => {
                error!(country, error = %e, "fatal error running country; skipping");
                summary.skipped.push((country.to_string(), e.to_string()));
            }
        }
    }

    Ok(summary)
}

/// Runs the reduce -> matrix -> sets -> search pipeline for one already
/// country-scoped raw graph.
pub fn run_country(config: &IfaConfig, mut graph: Graph) -> IfaResult<CountryOutcome> {
    let mut diagnostics = Diagnostics::new();

    let policy = if config.do_merge_couplers {
        CouplerPolicy::Merge
    } else {
        CouplerPolicy::Convert
    };

    let slack = reducer::reduce(&mut graph, policy, &mut diagnostics)?;
    let matrix = MatrixEngine::build(&mut graph, slack, config.eps_radial, &mut diagnostics)?;
    let operational_sets: OperationalSets = sets::select_sets(&graph, config.eps_radial);

    let branch_results =
        search::search(&graph, &matrix, &operational_sets, config.eps_denominator)?;
    let generator_results = if config.do_calculate_generator_if {
        search::search_generators(&graph, &matrix, &operational_sets)
    } else {
        Vec::new()
    };

    let country = graph.control_area.clone();
    Ok(CountryOutcome {
        country,
        graph,
        matrix,
        branch_results,
        generator_results,
        diagnostics,
    })
}

fn write_country_outputs(out_dir: &Path, outcome: &CountryOutcome) -> IfaResult<()> {
    let country_dir = out_dir.join(&outcome.country);
    std::fs::create_dir_all(&country_dir).map_err(|e| {
        crate::error::IfaError::Config(format!("creating {}: {e}", country_dir.display()))
    })?;

    output::write_branch_if_csv(
        &country_dir.join("branch_if.csv"),
        &outcome.graph,
        &outcome.matrix,
        &outcome.branch_results,
    )?;
    output::write_generator_if_csv(
        &country_dir.join("generator_if.csv"),
        &outcome.graph,
        &outcome.generator_results,
    )?;
    output::write_topology_snapshot(
        &country_dir.join("branches.csv"),
        &country_dir.join("nodes.csv"),
        &outcome.graph,
    )?;
    Ok(())
}
