//! Arena-based grid graph: nodes, branches and generators cross-referenced by
//! dense integer indices. Nothing here owns anything else — the [`Graph`]
//! arena is the sole owner and destroys the whole graph as a unit.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Sentinel country tag for a virtual cross-border midpoint node.
pub const X_NODE_COUNTRY: &str = "X";
/// Sentinel country tag assigned to a merged/converted tie-line branch.
pub const TIE_COUNTRY: &str = "TIE";

/// BFS distance from the control area, with an explicit "not yet reached"
/// sentinel. `Level` always orders below `Unassigned` so `min()` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Ring {
    Level(u32),
    Unassigned,
}

impl Ring {
    pub const ZERO: Ring = Ring::Level(0);

    /// Reports the ring as a plain integer, using `99` as the legacy
    /// "unassigned" sentinel carried forward from the reference parsers.
    pub fn value(self) -> u32 {
        match self {
            Ring::Level(r) => r,
            Ring::Unassigned => 99,
        }
    }

    pub fn is_assigned(self) -> bool {
        matches!(self, Ring::Level(_))
    }

    pub fn next(self) -> Ring {
        match self {
            Ring::Level(r) => Ring::Level(r + 1),
            Ring::Unassigned => Ring::Unassigned,
        }
    }
}

impl std::fmt::Display for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Branch variant tag. A tagged union, not a trait hierarchy: the distinction
/// is pure data, nothing here carries type-specific behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchType {
    Line,
    Coupler,
    Transformer,
    Transformer2W,
    Transformer3W3,
    Transformer3W2,
    MergedTieLine,
}

impl std::fmt::Display for BranchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BranchType::Line => "Line",
            BranchType::Coupler => "Coupler",
            BranchType::Transformer => "Transformer",
            BranchType::Transformer2W => "Transformer2W",
            BranchType::Transformer3W3 => "Transformer3W3",
            BranchType::Transformer3W2 => "Transformer3W2",
            BranchType::MergedTieLine => "MergedTieLine",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub index: usize,
    pub name: String,
    pub country: String,
    pub ring: Ring,
    pub connected: bool,
    pub branches: Vec<usize>,
    pub generators: Vec<usize>,
    pub(crate) removed: bool,
}

impl Node {
    pub fn is_x_node(&self) -> bool {
        self.country == X_NODE_COUNTRY
    }
}

#[derive(Debug, Clone)]
pub struct Branch {
    pub index: usize,
    pub name_from: String,
    pub name_to: String,
    pub node_from: usize,
    pub node_to: usize,
    pub order: String,
    pub display_name: String,
    /// Reactance in per-unit on the configured `Sbase`.
    pub impedance: f64,
    /// Thermal limit in MW; `0.0` means "effectively unlimited".
    pub patl: f64,
    pub v_base: f64,
    pub branch_type: BranchType,
    pub is_tie_line: bool,
    pub country: String,
    pub ring: Ring,
    pub self_ptdf: f64,
    pub(crate) removed: bool,
}

impl Branch {
    pub fn canonical_name(&self) -> String {
        format!("{} {} {}", self.name_from, self.name_to, self.order)
    }

    pub fn is_coupler(&self) -> bool {
        matches!(self.branch_type, BranchType::Coupler)
    }
}

#[derive(Debug, Clone)]
pub struct Generator {
    pub index: usize,
    pub node_name: String,
    pub display_name: String,
    pub power_mw: f64,
    pub node: Option<usize>,
    pub country: String,
    pub(crate) removed: bool,
}

/// The cyclic node/branch/generator graph, owned by a single arena.
///
/// Node and branch indices are stable for the lifetime of a construction
/// pass; they are only ever renumbered by an explicit `compact()` call (the
/// reducer's pruning step), never implicitly.
#[derive(Debug, Clone)]
pub struct Graph {
    pub control_area: String,
    pub nodes: Vec<Node>,
    pub branches: Vec<Branch>,
    pub generators: Vec<Generator>,
    pub(crate) name_index: HashMap<String, usize>,
}

impl Graph {
    pub fn new(control_area: impl Into<String>) -> Self {
        Self {
            control_area: control_area.into(),
            nodes: Vec::new(),
            branches: Vec::new(),
            generators: Vec::new(),
            name_index: HashMap::new(),
        }
    }

    /// Finds or creates the node named `name`, tagging it with `country` the
    /// first time it is seen. Returns the node's arena index.
    pub fn get_or_create_node(&mut self, name: &str, country: &str) -> usize {
        if let Some(&idx) = self.name_index.get(name) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node {
            index: idx,
            name: name.to_string(),
            country: country.to_string(),
            ring: Ring::Unassigned,
            connected: false,
            branches: Vec::new(),
            generators: Vec::new(),
            removed: false,
        });
        self.name_index.insert(name.to_string(), idx);
        idx
    }

    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// Adds a branch between two already-created nodes (by name) and wires
    /// both endpoints' incident-branch lists. Country / tie-line tagging is
    /// derived immediately from the endpoints' countries.
    #[allow(clippy::too_many_arguments)]
    pub fn push_branch(
        &mut self,
        name_from: &str,
        name_to: &str,
        order: &str,
        display_name: &str,
        impedance: f64,
        patl: f64,
        v_base: f64,
        branch_type: BranchType,
    ) -> usize {
        let from_idx = self.node_index(name_from).expect("endpoint must exist");
        let to_idx = self.node_index(name_to).expect("endpoint must exist");
        let from_country = self.nodes[from_idx].country.clone();
        let to_country = self.nodes[to_idx].country.clone();
        let (country, is_tie_line) = if from_country == to_country {
            (from_country, false)
        } else {
            (TIE_COUNTRY.to_string(), true)
        };

        let idx = self.branches.len();
        self.branches.push(Branch {
            index: idx,
            name_from: name_from.to_string(),
            name_to: name_to.to_string(),
            node_from: from_idx,
            node_to: to_idx,
            order: order.to_string(),
            display_name: display_name.to_string(),
            impedance,
            patl,
            v_base,
            branch_type,
            is_tie_line,
            country,
            ring: Ring::Unassigned,
            self_ptdf: 0.0,
            removed: false,
        });
        self.nodes[from_idx].branches.push(idx);
        self.nodes[to_idx].branches.push(idx);
        idx
    }

    /// Pushes a merged tie-line branch between two already-existing nodes,
    /// with the merge's fixed identity fields (country `TIE`, tie flag set,
    /// type `MergedTieLine`) applied directly rather than re-derived from
    /// the endpoints' countries.
    pub fn push_tie_branch(
        &mut self,
        name_from: &str,
        name_to: &str,
        order: &str,
        impedance: f64,
        patl: f64,
        v_base: f64,
    ) -> usize {
        let from_idx = self.node_index(name_from).expect("endpoint must exist");
        let to_idx = self.node_index(name_to).expect("endpoint must exist");
        let idx = self.branches.len();
        let display_name = format!("{name_from}-{name_to}");
        self.branches.push(Branch {
            index: idx,
            name_from: name_from.to_string(),
            name_to: name_to.to_string(),
            node_from: from_idx,
            node_to: to_idx,
            order: order.to_string(),
            display_name,
            impedance,
            patl,
            v_base,
            branch_type: BranchType::MergedTieLine,
            is_tie_line: true,
            country: TIE_COUNTRY.to_string(),
            ring: Ring::Unassigned,
            self_ptdf: 0.0,
            removed: false,
        });
        self.nodes[from_idx].branches.push(idx);
        self.nodes[to_idx].branches.push(idx);
        idx
    }

    pub fn push_generator(&mut self, node_name: &str, display_name: &str, power_mw: f64) -> usize {
        let idx = self.generators.len();
        self.generators.push(Generator {
            index: idx,
            node_name: node_name.to_string(),
            display_name: display_name.to_string(),
            power_mw,
            node: None,
            country: String::new(),
            removed: false,
        });
        idx
    }

    pub fn live_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| !n.removed)
    }

    pub fn live_branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter().filter(|b| !b.removed)
    }

    pub fn live_generators(&self) -> impl Iterator<Item = &Generator> {
        self.generators.iter().filter(|g| !g.removed)
    }

    /// Removes a branch's index from an endpoint's incident list.
    pub(crate) fn detach_branch_end(&mut self, node_idx: usize, branch_idx: usize) {
        self.nodes[node_idx].branches.retain(|&b| b != branch_idx);
    }

    pub(crate) fn attach_branch_end(&mut self, node_idx: usize, branch_idx: usize) {
        if !self.nodes[node_idx].branches.contains(&branch_idx) {
            self.nodes[node_idx].branches.push(branch_idx);
        }
    }

    /// Renumbers the `name_index` after a rewrite pass so `node_index` keeps
    /// returning the right arena slot for renamed nodes.
    pub(crate) fn reindex_name(&mut self, old_name: &str, idx: usize) {
        self.name_index.insert(old_name.to_string(), idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_branch_wires_both_endpoints() {
        let mut g = Graph::new("F");
        g.get_or_create_node("FBUS1", "F");
        g.get_or_create_node("FBUS2", "F");
        let b = g.push_branch("FBUS1", "FBUS2", "1", "FBUS1-FBUS2-1", 0.1, 100.0, 400.0, BranchType::Line);

        assert_eq!(g.nodes[0].branches, vec![b]);
        assert_eq!(g.nodes[1].branches, vec![b]);
        assert!(!g.branches[b].is_tie_line);
        assert_eq!(g.branches[b].country, "F");
    }

    #[test]
    fn push_branch_detects_cross_country_tie() {
        let mut g = Graph::new("F");
        g.get_or_create_node("FBUS1", "F");
        g.get_or_create_node("GBUS1", "G");
        let b = g.push_branch("FBUS1", "GBUS1", "1", "FBUS1-GBUS1-1", 0.1, 100.0, 400.0, BranchType::Line);

        assert!(g.branches[b].is_tie_line);
        assert_eq!(g.branches[b].country, TIE_COUNTRY);
    }

    #[test]
    fn get_or_create_node_dedupes_by_name() {
        let mut g = Graph::new("F");
        let a = g.get_or_create_node("FBUS1", "F");
        let b = g.get_or_create_node("FBUS1", "F");
        assert_eq!(a, b);
        assert_eq!(g.nodes.len(), 1);
    }

    #[test]
    fn ring_ordering_places_unassigned_above_any_level() {
        assert!(Ring::Level(5) < Ring::Unassigned);
        assert_eq!(Ring::Level(3).min(Ring::Unassigned), Ring::Level(3));
    }

    #[test]
    fn x_node_country_sentinel() {
        let mut g = Graph::new("F");
        let x = g.get_or_create_node("XNODE", X_NODE_COUNTRY);
        assert!(g.nodes[x].is_x_node());
    }
}
