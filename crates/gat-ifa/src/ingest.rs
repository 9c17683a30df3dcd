//! Ingestion: turns already-normalized branch/generator records (the common
//! entity lists the two source dialects both reduce to, per §6) into a raw
//! [`Graph`], applying the country-mapping heuristic selected by
//! `case_name` and the PATL ampere→MW threshold clamp.
//!
//! Three-winding transformer splitting happens upstream, during parsing, so
//! every [`RawBranchRecord`] here already carries a concrete
//! [`BranchType`] — this module never decides how a transformer split.

use std::path::Path;

use gat_core::diagnostics::Diagnostics;
use serde::Deserialize;

use crate::error::{IfaError, IfaResult};
use crate::graph::{BranchType, Graph};

/// An already-normalized branch record, common to both source dialects.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBranchRecord {
    pub name_from: String,
    pub name_to: String,
    pub order: String,
    pub display_name: String,
    /// Reactance in per-unit on the configured `Sbase`.
    pub impedance_pu: f64,
    /// Thermal limit in MW; `0.0` means "effectively unlimited".
    pub patl_mw: f64,
    pub v_base_kv: f64,
    pub branch_type: BranchType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGeneratorRecord {
    pub node_name: String,
    pub display_name: String,
    pub power_mw: f64,
}

/// Reads already-normalized branch records from a CSV file (one row per
/// [`RawBranchRecord`] field).
pub fn load_branches_csv(path: &Path) -> IfaResult<Vec<RawBranchRecord>> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|e| IfaError::InputMissing(format!("{}: {e}", path.display())))?;
    rdr.deserialize()
        .map(|r| r.map_err(|e| IfaError::Config(format!("parsing {}: {e}", path.display()))))
        .collect()
}

/// Reads already-normalized generator records from a CSV file.
pub fn load_generators_csv(path: &Path) -> IfaResult<Vec<RawGeneratorRecord>> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|e| IfaError::InputMissing(format!("{}: {e}", path.display())))?;
    rdr.deserialize()
        .map(|r| r.map_err(|e| IfaError::Config(format!("parsing {}: {e}", path.display()))))
        .collect()
}

/// The ampere rating that, once converted to MW at a branch's base voltage,
/// is treated as "effectively unlimited" and clamped to `0.0` (§6).
const IATL_MAX_AMPS: f64 = 5000.0;

/// Converts an ampere-valued thermal rating to the MW-valued `PATL` used
/// throughout the matrix engine, clamping to `0.0` ("unlimited") once the
/// rating exceeds the configured ampere ceiling. Applied once at ingestion,
/// never re-derived downstream.
pub fn clamp_patl_from_iatl(iatl_amps: f64, v_base_kv: f64) -> f64 {
    let patl_mw = iatl_amps * 3f64.sqrt() * v_base_kv / 1000.0;
    let ceiling = IATL_MAX_AMPS * 3f64.sqrt() * v_base_kv / 1000.0;
    if patl_mw > ceiling {
        0.0
    } else {
        patl_mw
    }
}

/// Selects the country-mapping heuristic named by `case_name`.
///
/// `prefix1`/`prefix2` are the two conventions seen in the source dialects:
/// the leading one or two characters of a node name encode its control
/// area. A node name starting with the literal marker `XX` is always an
/// excluded-region sentinel regardless of heuristic, and `X` on its own
/// marks a cross-border virtual node.
fn country_for(case_name: &str, node_name: &str) -> String {
    let upper = node_name.to_ascii_uppercase();
    if upper.starts_with("XX") {
        return "XX".to_string();
    }
    if upper.starts_with('X') && upper.len() <= 2 {
        return "X".to_string();
    }
    let prefix_len = match case_name {
        "prefix2" => 2,
        _ => 1,
    };
    upper.chars().take(prefix_len).collect()
}

/// Builds a raw (unreduced) [`Graph`] for one control area from normalized
/// entity records, applying the case-specific country heuristic and the
/// `min_voltage_level_kV` parser-side filter.
pub fn build_graph(
    control_area: &str,
    case_name: &str,
    min_voltage_level_kv: f64,
    branches: &[RawBranchRecord],
    generators: &[RawGeneratorRecord],
    diagnostics: &mut Diagnostics,
) -> IfaResult<Graph> {
    let mut graph = Graph::new(control_area);
    let mut excluded: std::collections::HashSet<String> = Default::default();

    for rec in branches {
        if min_voltage_level_kv > 0.0 && rec.v_base_kv < min_voltage_level_kv {
            continue;
        }
        let country_from = country_for(case_name, &rec.name_from);
        let country_to = country_for(case_name, &rec.name_to);
        if country_from == "XX" || country_to == "XX" {
            excluded.insert(rec.name_from.clone());
            excluded.insert(rec.name_to.clone());
            diagnostics.add_warning_with_entity(
                "ingestion",
                "branch touches an excluded-region node; dropped",
                &rec.display_name,
            );
            continue;
        }
        if rec.impedance_pu.abs() < 1e-12 {
            diagnostics.add_warning_with_entity(
                "ingestion",
                "branch has zero impedance; dropped",
                &rec.display_name,
            );
            continue;
        }

        graph.get_or_create_node(&rec.name_from, &country_from);
        graph.get_or_create_node(&rec.name_to, &country_to);
        graph.push_branch(
            &rec.name_from,
            &rec.name_to,
            &rec.order,
            &rec.display_name,
            rec.impedance_pu,
            rec.patl_mw,
            rec.v_base_kv,
            rec.branch_type,
        );
    }

    for rec in generators {
        if rec.power_mw <= 0.0 {
            diagnostics.add_warning_with_entity(
                "ingestion",
                "generator power is non-positive; dropped",
                &rec.display_name,
            );
            continue;
        }
        if excluded.contains(&rec.node_name) || graph.node_index(&rec.node_name).is_none() {
            diagnostics.add_warning_with_entity(
                "ingestion",
                "generator references an excluded or unknown node; dropped",
                &rec.display_name,
            );
            continue;
        }
        graph.push_generator(&rec.node_name, &rec.display_name, rec.power_mw);
    }

    if graph.nodes.is_empty() {
        return Err(IfaError::InputMissing(format!(
            "no nodes survived ingestion for control area {control_area}"
        )));
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patl_clamps_above_ceiling() {
        let v_base = 400.0;
        let below = clamp_patl_from_iatl(1000.0, v_base);
        assert!(below > 0.0);
        let above = clamp_patl_from_iatl(6000.0, v_base);
        assert_eq!(above, 0.0);
    }

    #[test]
    fn country_prefix_heuristics() {
        assert_eq!(country_for("prefix1", "FBUS01"), "F");
        assert_eq!(country_for("prefix2", "FRBUS01"), "FR");
        assert_eq!(country_for("prefix1", "XX_BORDER"), "XX");
        assert_eq!(country_for("prefix1", "X1"), "X");
    }

    #[test]
    fn drops_non_positive_generator() {
        let mut diagnostics = Diagnostics::new();
        let branches = vec![RawBranchRecord {
            name_from: "FBUS1".into(),
            name_to: "FBUS2".into(),
            order: "1".into(),
            display_name: "FBUS1-FBUS2-1".into(),
            impedance_pu: 0.1,
            patl_mw: 100.0,
            v_base_kv: 400.0,
            branch_type: BranchType::Line,
        }];
        let gens = vec![RawGeneratorRecord {
            node_name: "FBUS1".into(),
            display_name: "G1".into(),
            power_mw: 0.0,
        }];
        let graph = build_graph("F", "prefix1", 0.0, &branches, &gens, &mut diagnostics).unwrap();
        assert!(graph.generators.is_empty());
        assert!(diagnostics.has_warnings());
    }
}
