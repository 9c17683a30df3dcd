//! Topology reducer: turns a raw, dirty bus/branch/generator list into a
//! canonical, connected, ring-indexed graph centered on a chosen control
//! area. See module-level functions for each pass; [`reduce`] runs them in
//! the required order.

use std::collections::HashMap;

use gat_core::diagnostics::Diagnostics;
use tracing::{debug, info, warn};

use crate::error::{IfaError, IfaResult};
use crate::graph::{Graph, Ring, X_NODE_COUNTRY};

/// Coupler handling policy (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplerPolicy {
    /// Contract coupler clusters onto a single representative bus.
    Merge,
    /// Retype each coupler into a lightly-impedanced `Line`.
    Convert,
}

/// Runs the full reduction pipeline and returns the slack/root node's index
/// in the final, pruned, densely-indexed graph.
pub fn reduce(
    graph: &mut Graph,
    policy: CouplerPolicy,
    diagnostics: &mut Diagnostics,
) -> IfaResult<usize> {
    retype_cross_country_couplers(graph);

    match policy {
        CouplerPolicy::Merge => contract_couplers(graph, diagnostics),
        CouplerPolicy::Convert => convert_couplers(graph),
    }

    merge_tie_lines(graph, diagnostics);
    remove_self_loops(graph);

    validate_topology(graph, false)?;

    let root_name = {
        let root_idx = pick_root(graph)
            .ok_or_else(|| IfaError::TopologyInvariant("no control-area node found".into()))?;
        graph.nodes[root_idx].name.clone()
    };
    assign_rings(graph, &root_name)?;

    let before = graph.live_nodes().count();
    compact(graph);
    let after = graph.nodes.len();
    info!(before, after, "topology pruned to connected component");

    attach_generators(graph, diagnostics);

    validate_topology(graph, true)?;

    let root_idx = graph
        .node_index(&root_name)
        .ok_or_else(|| IfaError::TopologyInvariant("root node pruned unexpectedly".into()))?;
    Ok(root_idx)
}

/// A coupler that bridges two different countries is data noise — coupler
/// semantics (zero-impedance busbar jumper) only make sense inside one
/// substation. Retype it to a plain `Line` before contraction runs.
fn retype_cross_country_couplers(graph: &mut Graph) {
    for b in graph.branches.iter_mut().filter(|b| !b.removed) {
        if b.is_coupler() {
            let from_country = &graph.nodes[b.node_from].country;
            let to_country = &graph.nodes[b.node_to].country;
            if from_country != to_country {
                b.branch_type = crate::graph::BranchType::Line;
            }
        }
    }
}

/// Builds the idempotent from→representative coupler mapping (§4.1) and
/// applies it to every non-coupler branch endpoint and every generator.
fn contract_couplers(graph: &mut Graph, diagnostics: &mut Diagnostics) {
    let mapping = build_coupler_mapping(graph);
    if mapping.is_empty() {
        return;
    }
    debug!(clusters = mapping.len(), "coupler mapping built");

    let branch_indices: Vec<usize> = graph
        .branches
        .iter()
        .filter(|b| !b.removed && !b.is_coupler())
        .map(|b| b.index)
        .collect();

    for idx in branch_indices {
        if let Some(rep) = mapping.get(&graph.branches[idx].name_from).cloned() {
            rewrite_branch_end(graph, idx, true, &rep);
        }
        if let Some(rep) = mapping.get(&graph.branches[idx].name_to).cloned() {
            rewrite_branch_end(graph, idx, false, &rep);
        }
    }

    for g in graph.generators.iter_mut().filter(|g| !g.removed) {
        if let Some(rep) = mapping.get(&g.node_name) {
            g.node_name = rep.clone();
        }
    }

    let coupler_indices: Vec<usize> = graph
        .branches
        .iter()
        .filter(|b| !b.removed && b.is_coupler())
        .map(|b| b.index)
        .collect();
    for idx in &coupler_indices {
        let (nf, nt) = (graph.branches[*idx].node_from, graph.branches[*idx].node_to);
        graph.detach_branch_end(nf, *idx);
        graph.detach_branch_end(nt, *idx);
        graph.branches[*idx].removed = true;
    }
    diagnostics.add_warning(
        "topology",
        &format!("contracted {} coupler branches", coupler_indices.len()),
    );

    for n in graph.nodes.iter_mut().filter(|n| !n.removed) {
        if n.branches.is_empty() {
            n.removed = true;
        }
    }
}

fn rewrite_branch_end(graph: &mut Graph, branch_idx: usize, is_from: bool, new_name: &str) {
    let old_idx = if is_from {
        graph.branches[branch_idx].node_from
    } else {
        graph.branches[branch_idx].node_to
    };
    let new_idx = match graph.node_index(new_name) {
        Some(idx) => idx,
        None => return,
    };
    if old_idx == new_idx {
        return;
    }
    graph.detach_branch_end(old_idx, branch_idx);
    if is_from {
        graph.branches[branch_idx].node_from = new_idx;
        graph.branches[branch_idx].name_from = new_name.to_string();
    } else {
        graph.branches[branch_idx].node_to = new_idx;
        graph.branches[branch_idx].name_to = new_name.to_string();
    }
    graph.attach_branch_end(new_idx, branch_idx);
}

/// Builds the raw from→representative mapping following the three-case
/// algorithm in §4.1, then flattens every chain to its terminal
/// representative so the result is idempotent by construction (a value can
/// never also be a key, since a representative is by definition a name with
/// no further mapping entry).
fn build_coupler_mapping(graph: &Graph) -> HashMap<String, String> {
    let mut raw: HashMap<String, String> = HashMap::new();

    for b in graph.live_branches().filter(|b| b.is_coupler()) {
        let a = b.name_from.clone();
        let bb = b.name_to.clone();
        if let Some(x) = raw.get(&a).cloned() {
            // (ii) A already mapped to X: B also maps to X.
            raw.insert(bb, x);
        } else {
            let pointing_at_a: Vec<String> = raw
                .iter()
                .filter(|(_, v)| **v == a)
                .map(|(k, _)| k.clone())
                .collect();
            if !pointing_at_a.is_empty() {
                // (iii) A is itself a target: redirect those entries at B.
                for k in pointing_at_a {
                    raw.insert(k, bb.clone());
                }
            } else {
                // (i) neither known: A -> B.
                raw.insert(a, bb);
            }
        }
    }

    flatten(raw)
}

fn flatten(raw: HashMap<String, String>) -> HashMap<String, String> {
    fn resolve(map: &HashMap<String, String>, name: &str) -> String {
        let mut cur = name.to_string();
        let mut hops = 0usize;
        while let Some(next) = map.get(&cur) {
            if *next == cur || hops > map.len() + 1 {
                break;
            }
            cur = next.clone();
            hops += 1;
        }
        cur
    }

    let mut out = HashMap::new();
    for k in raw.keys() {
        let rep = resolve(&raw, k);
        if rep != *k {
            out.insert(k.clone(), rep);
        }
    }
    out
}

fn convert_couplers(graph: &mut Graph) {
    for b in graph.branches.iter_mut().filter(|b| !b.removed) {
        if b.is_coupler() {
            b.branch_type = crate::graph::BranchType::Line;
            b.patl = 0.0;
        }
    }
}

/// Resolves the endpoint of `branch` that is *not* `x_idx`. Returns `None`
/// when both ends already point at the X-node (nothing left to resolve).
fn other_endpoint(graph: &Graph, branch_idx: usize, x_idx: usize) -> Option<usize> {
    let b = &graph.branches[branch_idx];
    if b.node_from == x_idx && b.node_to == x_idx {
        None
    } else if b.node_from == x_idx {
        Some(b.node_to)
    } else {
        Some(b.node_from)
    }
}

/// Deletes a single dangling tie-branch and its X-node (the "one incident
/// branch" edge case, reached either directly or after a >=3-branch node has
/// been deduplicated down to one survivor).
fn delete_dangling_tie(graph: &mut Graph, x_idx: usize, b_idx: usize) {
    let other = other_endpoint(graph, b_idx, x_idx);
    graph.detach_branch_end(x_idx, b_idx);
    if let Some(o) = other {
        graph.detach_branch_end(o, b_idx);
    }
    graph.branches[b_idx].removed = true;
    graph.nodes[x_idx].removed = true;
}

/// Replaces the X-node's two surviving incident branches with a single
/// `MergedTieLine` (the standard 2-branch case, reached either directly or
/// after a >=3-branch node has been deduplicated down to two survivors).
fn merge_two_tie_branches(
    graph: &mut Graph,
    x_idx: usize,
    b1: usize,
    a: usize,
    b2: usize,
    bnode: usize,
    diagnostics: &mut Diagnostics,
) {
    let order1 = graph.branches[b1].order.clone();
    let order2 = graph.branches[b2].order.clone();
    let order = if order1 == order2 {
        order1
    } else {
        diagnostics.add_warning_with_entity(
            "topology",
            "tie-line merge order mismatch; synthesized order 'X'",
            &format!(
                "{} / {}",
                graph.branches[b1].canonical_name(),
                graph.branches[b2].canonical_name()
            ),
        );
        "X".to_string()
    };
    let impedance = graph.branches[b1].impedance + graph.branches[b2].impedance;
    let patl = graph.branches[b1].patl.min(graph.branches[b2].patl);
    let v_base = graph.branches[b1].v_base;
    let name_a = graph.nodes[a].name.clone();
    let name_b = graph.nodes[bnode].name.clone();

    graph.detach_branch_end(a, b1);
    graph.detach_branch_end(bnode, b2);
    graph.detach_branch_end(x_idx, b1);
    graph.detach_branch_end(x_idx, b2);
    graph.branches[b1].removed = true;
    graph.branches[b2].removed = true;
    graph.nodes[x_idx].removed = true;

    graph.push_tie_branch(&name_a, &name_b, &order, impedance, patl, v_base);
}

fn merge_tie_lines(graph: &mut Graph, diagnostics: &mut Diagnostics) {
    let x_nodes: Vec<usize> = graph
        .live_nodes()
        .filter(|n| n.is_x_node())
        .map(|n| n.index)
        .collect();

    for x_idx in x_nodes {
        if graph.nodes[x_idx].removed {
            continue;
        }
        let incident: Vec<usize> = graph.nodes[x_idx].branches.clone();
        if incident.is_empty() {
            continue;
        }

        let mut resolved = Vec::with_capacity(incident.len());
        let mut ok = true;
        for &b_idx in &incident {
            match other_endpoint(graph, b_idx, x_idx) {
                Some(other) => resolved.push((b_idx, other)),
                None => {
                    ok = false;
                    break;
                }
            }
        }
        if !ok {
            diagnostics.add_warning_with_entity(
                "topology",
                "X-node neighbors could not be resolved; left in place",
                &graph.nodes[x_idx].name.clone(),
            );
            continue;
        }

        // >=3 incident branches: keep at most one per distinct
        // neighbor-country, dropping the rest, before falling through to the
        // same 0/1/2-survivor handling used for a node that started out that
        // way (§4.1 edge case ii: "two surviving compositions" implies the
        // post-dedup survivors still get merged, not just thinned).
        if resolved.len() >= 3 {
            let mut seen_countries = std::collections::HashSet::new();
            let mut kept = Vec::with_capacity(resolved.len());
            for (b_idx, other) in resolved {
                let country = graph.nodes[other].country.clone();
                if seen_countries.contains(&country) {
                    diagnostics.add_warning_with_entity(
                        "topology",
                        "X-node has a duplicate neighbor-country branch; dropped",
                        &graph.branches[b_idx].canonical_name(),
                    );
                    graph.detach_branch_end(x_idx, b_idx);
                    graph.detach_branch_end(other, b_idx);
                    graph.branches[b_idx].removed = true;
                } else {
                    seen_countries.insert(country);
                    kept.push((b_idx, other));
                }
            }
            resolved = kept;
        }

        match resolved.len() {
            0 => {}
            1 => {
                let (b_idx, _) = resolved[0];
                delete_dangling_tie(graph, x_idx, b_idx);
            }
            2 => {
                let (b1, a) = resolved[0];
                let (b2, bnode) = resolved[1];
                merge_two_tie_branches(graph, x_idx, b1, a, b2, bnode, diagnostics);
            }
            _ => {
                diagnostics.add_warning_with_entity(
                    "topology",
                    "X-node still has >=3 distinct neighbor countries after dedup; left in place",
                    &graph.nodes[x_idx].name.clone(),
                );
            }
        }
    }
}

fn remove_self_loops(graph: &mut Graph) {
    let loop_branches: Vec<usize> = graph
        .live_branches()
        .filter(|b| b.node_from == b.node_to)
        .map(|b| b.index)
        .collect();

    for b_idx in loop_branches {
        let node_idx = graph.branches[b_idx].node_from;
        graph.detach_branch_end(node_idx, b_idx);
        graph.branches[b_idx].removed = true;
        if graph.nodes[node_idx].branches.is_empty() {
            graph.nodes[node_idx].removed = true;
        }
    }
}

/// Picks the node with the highest incident-branch count within the control
/// area (ties broken by lowest index — first seen wins under ascending
/// iteration). Used both to seed ring-0 flood fill and to choose the slack.
pub fn pick_root(graph: &Graph) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for n in graph
        .live_nodes()
        .filter(|n| n.country == graph.control_area)
    {
        let degree = n.branches.len();
        if best.map(|(c, _)| degree > c).unwrap_or(true) {
            best = Some((degree, n.index));
        }
    }
    best.map(|(_, idx)| idx)
}

fn assign_rings(graph: &mut Graph, root_name: &str) -> IfaResult<()> {
    let root_idx = graph
        .node_index(root_name)
        .ok_or_else(|| IfaError::TopologyInvariant("root node vanished".into()))?;

    flood_connectivity(graph, root_idx);
    assign_ring_zero(graph, root_idx);
    outer_ring_bfs(graph);
    assign_branch_rings(graph);
    Ok(())
}

fn flood_connectivity(graph: &mut Graph, root_idx: usize) {
    graph.nodes[root_idx].connected = true;
    let mut changed = true;
    let mut steps = 0;
    while changed {
        changed = false;
        let branch_indices: Vec<usize> = graph.live_branches().map(|b| b.index).collect();
        for b_idx in branch_indices {
            let (nf, nt) = (graph.branches[b_idx].node_from, graph.branches[b_idx].node_to);
            let (cf, ct) = (graph.nodes[nf].connected, graph.nodes[nt].connected);
            if cf && !ct {
                graph.nodes[nt].connected = true;
                changed = true;
            } else if ct && !cf {
                graph.nodes[nf].connected = true;
                changed = true;
            }
        }
        steps += 1;
    }
    info!(steps, "connectivity established");
}

/// Recursive ring-0 assignment: walks non-tie-line branches freely, but
/// stops propagating past a tie-line's far endpoint (typically an X-node),
/// which still gets included at ring 0.
fn assign_ring_zero(graph: &mut Graph, node_idx: usize) {
    if graph.nodes[node_idx].ring == Ring::ZERO {
        return;
    }
    graph.nodes[node_idx].ring = Ring::ZERO;
    let branches = graph.nodes[node_idx].branches.clone();
    for b_idx in branches {
        let b = &graph.branches[b_idx];
        if b.removed {
            continue;
        }
        let other = if b.node_from == node_idx {
            b.node_to
        } else {
            b.node_from
        };
        if b.is_tie_line {
            // Stops propagation at the border: a tie-line's far endpoint is
            // only pulled into ring 0 here when it is itself an X-node
            // terminal (the rare >=3-distinct-country leftover from tie-line
            // merging); an ordinary foreign-country node across a tie-line
            // instead waits for the outer-ring BFS to promote it to ring 1.
            if graph.nodes[other].is_x_node() && graph.nodes[other].ring != Ring::ZERO {
                graph.nodes[other].ring = Ring::ZERO;
            }
        } else {
            assign_ring_zero(graph, other);
        }
    }
}

fn outer_ring_bfs(graph: &mut Graph) {
    let mut r = 0u32;
    loop {
        let at_ring: Vec<usize> = graph
            .live_nodes()
            .filter(|n| n.ring == Ring::Level(r))
            .map(|n| n.index)
            .collect();
        if at_ring.is_empty() {
            break;
        }
        for node_idx in at_ring {
            let branches = graph.nodes[node_idx].branches.clone();
            for b_idx in branches {
                let b = &graph.branches[b_idx];
                if b.removed {
                    continue;
                }
                let other = if b.node_from == node_idx {
                    b.node_to
                } else {
                    b.node_from
                };
                if graph.nodes[other].ring == Ring::Unassigned {
                    graph.nodes[other].ring = if graph.nodes[other].is_x_node() {
                        Ring::Level(r)
                    } else {
                        Ring::Level(r + 1)
                    };
                }
            }
        }
        r += 1;
    }
}

fn assign_branch_rings(graph: &mut Graph) {
    let rings: Vec<(usize, Ring)> = graph
        .live_branches()
        .map(|b| {
            let rf = graph.nodes[b.node_from].ring;
            let rt = graph.nodes[b.node_to].ring;
            (b.index, rf.min(rt))
        })
        .collect();
    for (idx, ring) in rings {
        graph.branches[idx].ring = ring;
    }
}

/// Keeps only nodes with `connected == true` and branches whose both
/// endpoints survive, re-indexing densely while preserving relative order.
fn compact(graph: &mut Graph) {
    let mut old_to_new: HashMap<usize, usize> = HashMap::new();
    let mut new_nodes = Vec::new();
    for n in graph.nodes.iter().filter(|n| !n.removed && n.connected) {
        let new_idx = new_nodes.len();
        old_to_new.insert(n.index, new_idx);
        let mut nn = n.clone();
        nn.index = new_idx;
        nn.branches.clear();
        nn.generators.clear();
        new_nodes.push(nn);
    }

    let mut new_branches = Vec::new();
    for b in graph.branches.iter().filter(|b| !b.removed) {
        if let (Some(&nf), Some(&nt)) =
            (old_to_new.get(&b.node_from), old_to_new.get(&b.node_to))
        {
            let new_idx = new_branches.len();
            let mut nb = b.clone();
            nb.index = new_idx;
            nb.node_from = nf;
            nb.node_to = nt;
            new_nodes[nf].branches.push(new_idx);
            if nt != nf {
                new_nodes[nt].branches.push(new_idx);
            }
            new_branches.push(nb);
        }
    }

    let mut name_index = HashMap::new();
    for n in &new_nodes {
        name_index.insert(n.name.clone(), n.index);
    }

    graph.nodes = new_nodes;
    graph.branches = new_branches;
    graph.name_index = name_index;
}

/// Binds each generator to the unique surviving node whose name matches its
/// (post-coupler-rewrite) node name, renumbering generator indices densely
/// over the survivors. Node-name uniqueness is an arena invariant
/// ([`Graph::get_or_create_node`] dedupes by name), which structurally rules
/// out the "matches multiple nodes" hard-error case from the source
/// behavior — there is exactly one node per name, so lookup is Option, not
/// a multi-match search.
fn attach_generators(graph: &mut Graph, diagnostics: &mut Diagnostics) {
    let pending: Vec<_> = graph
        .generators
        .iter()
        .filter(|g| !g.removed)
        .cloned()
        .collect();

    let mut new_gens = Vec::new();
    for mut g in pending {
        match graph.node_index(&g.node_name) {
            Some(node_idx) => {
                let i = new_gens.len();
                g.index = i;
                g.node = Some(node_idx);
                g.country = graph.nodes[node_idx].country.clone();
                graph.nodes[node_idx].generators.push(i);
                new_gens.push(g);
            }
            None => {
                diagnostics.add_warning_with_entity(
                    "topology",
                    "generator references no surviving node; detached",
                    &g.display_name,
                );
                warn!(generator = %g.display_name, "detached: no matching node");
            }
        }
    }
    graph.generators = new_gens;
}

/// Validation checkpoint run (a) after topology reduction and (b) again
/// after generator attachment, per §4.1's failure-mode contract.
pub fn validate_topology(graph: &Graph, check_generators: bool) -> IfaResult<()> {
    for b in graph.live_branches() {
        let nf = &graph.nodes[b.node_from];
        let nt = &graph.nodes[b.node_to];
        if nf.removed || nt.removed {
            return Err(IfaError::TopologyInvariant(format!(
                "branch {} references a removed node",
                b.canonical_name()
            )));
        }
        if nf.name != b.name_from || nt.name != b.name_to {
            return Err(IfaError::TopologyInvariant(format!(
                "branch {} endpoint name mismatch",
                b.canonical_name()
            )));
        }
        if !nf.branches.contains(&b.index) || !nt.branches.contains(&b.index) {
            return Err(IfaError::TopologyInvariant(format!(
                "branch {} missing from an endpoint's incident list",
                b.canonical_name()
            )));
        }
    }

    if check_generators {
        for g in graph.live_generators() {
            match g.node {
                Some(idx) => {
                    if graph.nodes.get(idx).map(|n| n.removed).unwrap_or(true) {
                        return Err(IfaError::TopologyInvariant(format!(
                            "generator {} references a removed node",
                            g.display_name
                        )));
                    }
                }
                None => {
                    return Err(IfaError::TopologyInvariant(format!(
                        "generator {} is unattached",
                        g.display_name
                    )));
                }
            }
        }
    }
    Ok(())
}
