//! CSV output writers: branch-IF rows, generator-IF rows, and the topology
//! snapshot (branches.csv / nodes.csv), with the fixed column schemas from
//! §6. Grounded on the `csv::Writer::from_writer` idiom already used by the
//! host workspace's benchmark output writers.

use std::io::Write;
use std::path::Path;

use csv::Writer;
use serde::Serialize;

use crate::error::{IfaError, IfaResult};
use crate::graph::Graph;
use crate::matrix::MatrixEngine;
use crate::search::{BranchIfResult, GeneratorIfResult};

#[derive(Debug, Serialize)]
struct BranchIfRow {
    #[serde(rename = "R_name")]
    r_name: String,
    #[serde(rename = "V_kV")]
    v_kv: f64,
    country: String,
    #[serde(rename = "type")]
    branch_type: String,
    #[serde(rename = "norm_IF2")]
    norm_if2: f64,
    #[serde(rename = "IF2")]
    if2: f64,
    #[serde(rename = "PATL_R_MW")]
    patl_r_mw: f64,
    #[serde(rename = "ring_R")]
    ring_r: u32,
    #[serde(rename = "I_for_norm")]
    i_for_norm: String,
    #[serde(rename = "T_for_norm")]
    t_for_norm: String,
    #[serde(rename = "I_for_IF")]
    i_for_if: String,
    #[serde(rename = "T_for_IF")]
    t_for_if: String,
    #[serde(rename = "PATL_T_for_norm_MW")]
    patl_t_for_norm_mw: f64,
}

#[derive(Debug, Serialize)]
struct GeneratorIfRow {
    gen_name: String,
    #[serde(rename = "power_MW")]
    power_mw: f64,
    #[serde(rename = "IF")]
    if_value: f64,
    #[serde(rename = "I_branches")]
    i_branches: String,
    #[serde(rename = "T_branches")]
    t_branches: String,
    #[serde(rename = "norm_IF")]
    norm_if: f64,
    #[serde(rename = "I_branches_norm")]
    i_branches_norm: String,
    #[serde(rename = "T_branches_norm")]
    t_branches_norm: String,
}

#[derive(Debug, Serialize)]
struct BranchTopologyRow {
    #[serde(rename = "Index")]
    index: usize,
    #[serde(rename = "Type")]
    branch_type: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Node From")]
    node_from: String,
    #[serde(rename = "Node To")]
    node_to: String,
    #[serde(rename = "Impedance_pu")]
    impedance_pu: f64,
    #[serde(rename = "PATL_MW")]
    patl_mw: f64,
    #[serde(rename = "Ring")]
    ring: u32,
    #[serde(rename = "Tie-Line")]
    tie_line: bool,
}

#[derive(Debug, Serialize)]
struct NodeTopologyRow {
    #[serde(rename = "Index")]
    index: usize,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Ring")]
    ring: u32,
    #[serde(rename = "Connected")]
    connected: bool,
    #[serde(rename = "Branches")]
    branches: String,
}

fn name_or_empty(graph: &Graph, idx: Option<usize>) -> String {
    idx.map(|i| graph.branches[i].canonical_name())
        .unwrap_or_default()
}

fn writer_for(path: &Path) -> IfaResult<Writer<std::fs::File>> {
    let file = std::fs::File::create(path)
        .map_err(|e| IfaError::Config(format!("creating {}: {e}", path.display())))?;
    Ok(Writer::from_writer(file))
}

fn finish<W: Write>(mut wtr: Writer<W>, path: &Path) -> IfaResult<()> {
    wtr.flush()
        .map_err(|e| IfaError::Config(format!("writing {}: {e}", path.display())))
}

pub fn write_branch_if_csv(
    path: &Path,
    graph: &Graph,
    mx: &MatrixEngine,
    results: &[BranchIfResult],
) -> IfaResult<()> {
    let mut wtr = writer_for(path)?;
    for res in results {
        let branch = &graph.branches[res.r];
        let row = BranchIfRow {
            r_name: branch.canonical_name(),
            v_kv: branch.v_base,
            country: branch.country.clone(),
            branch_type: branch.branch_type.to_string(),
            norm_if2: res.norm_if_n2,
            if2: res.if_n2,
            patl_r_mw: branch.patl,
            ring_r: branch.ring.value(),
            i_for_norm: name_or_empty(graph, res.i_star_norm),
            t_for_norm: name_or_empty(graph, res.t_star_norm),
            i_for_if: name_or_empty(graph, res.i_star),
            t_for_if: name_or_empty(graph, res.t_star),
            patl_t_for_norm_mw: res
                .t_star_norm
                .map(|t| graph.branches[t].patl)
                .unwrap_or(0.0),
        };
        wtr.serialize(row)
            .map_err(|e| IfaError::Config(format!("serializing branch-IF row: {e}")))?;
    }
    let _ = mx;
    finish(wtr, path)
}

fn join_pairs(graph: &Graph, pairs: &[(usize, usize)], pick_i: bool) -> String {
    pairs
        .iter()
        .map(|&(i, t)| graph.branches[if pick_i { i } else { t }].canonical_name())
        .collect::<Vec<_>>()
        .join(";")
}

pub fn write_generator_if_csv(
    path: &Path,
    graph: &Graph,
    results: &[GeneratorIfResult],
) -> IfaResult<()> {
    let mut wtr = writer_for(path)?;
    for res in results {
        let gen = &graph.generators[res.generator];
        let row = GeneratorIfRow {
            gen_name: gen.display_name.clone(),
            power_mw: gen.power_mw,
            if_value: res.if_value,
            i_branches: join_pairs(graph, &res.it_pairs, true),
            t_branches: join_pairs(graph, &res.it_pairs, false),
            norm_if: res.norm_if,
            i_branches_norm: join_pairs(graph, &res.norm_it_pairs, true),
            t_branches_norm: join_pairs(graph, &res.norm_it_pairs, false),
        };
        wtr.serialize(row)
            .map_err(|e| IfaError::Config(format!("serializing generator-IF row: {e}")))?;
    }
    finish(wtr, path)
}

/// Audit snapshot of the post-reduction topology: one CSV for surviving
/// branches, one for surviving nodes.
pub fn write_topology_snapshot(
    branches_path: &Path,
    nodes_path: &Path,
    graph: &Graph,
) -> IfaResult<()> {
    let mut branch_wtr = writer_for(branches_path)?;
    for b in graph.live_branches() {
        let row = BranchTopologyRow {
            index: b.index,
            branch_type: b.branch_type.to_string(),
            name: b.canonical_name(),
            node_from: b.name_from.clone(),
            node_to: b.name_to.clone(),
            impedance_pu: b.impedance,
            patl_mw: b.patl,
            ring: b.ring.value(),
            tie_line: b.is_tie_line,
        };
        branch_wtr
            .serialize(row)
            .map_err(|e| IfaError::Config(format!("serializing topology branch row: {e}")))?;
    }
    finish(branch_wtr, branches_path)?;

    let mut node_wtr = writer_for(nodes_path)?;
    for n in graph.live_nodes() {
        let branch_list = n
            .branches
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(";");
        let row = NodeTopologyRow {
            index: n.index,
            name: n.name.clone(),
            ring: n.ring.value(),
            connected: n.connected,
            branches: branch_list,
        };
        node_wtr
            .serialize(row)
            .map_err(|e| IfaError::Config(format!("serializing topology node row: {e}")))?;
    }
    finish(node_wtr, nodes_path)
}
