//! Set selector: partitions branches into the three disjoint operational
//! sets used by the IF search engine (§4.3).

use crate::graph::{Graph, Ring};

/// External contingencies (`R`), monitored internal elements (`T`), and
/// contingencies eligible for the second outage (`I`), plus the external
/// generator set (`R_gens`). All radial (self-PTDF ≈ 1) elements are
/// excluded from every set.
pub struct OperationalSets {
    /// Branch indices with `ring >= 1`, radial-excluded, in ring order.
    pub r: Vec<usize>,
    /// Generator indices whose country differs from the control area.
    pub r_gens: Vec<usize>,
    /// Branch indices with `ring == 0`, radial-excluded.
    pub t: Vec<usize>,
    /// External-maintenance (ring >= 1) then internal-maintenance (ring == 0)
    /// branch indices, each half radial-filtered before concatenation.
    pub i: Vec<usize>,
}

fn is_radial(graph: &Graph, branch_idx: usize, eps_radial: f64) -> bool {
    graph.branches[branch_idx].self_ptdf > 1.0 - eps_radial
}

pub fn select_sets(graph: &Graph, eps_radial: f64) -> OperationalSets {
    let mut r: Vec<usize> = graph
        .live_branches()
        .filter(|b| b.ring.is_assigned() && b.ring != Ring::ZERO)
        .map(|b| b.index)
        .filter(|&idx| !is_radial(graph, idx, eps_radial))
        .collect();
    r.sort_by_key(|&idx| (graph.branches[idx].ring.value(), idx));

    let r_gens: Vec<usize> = graph
        .live_generators()
        .filter(|g| g.country != graph.control_area)
        .map(|g| g.index)
        .collect();

    let mut t: Vec<usize> = graph
        .live_branches()
        .filter(|b| b.ring == Ring::ZERO)
        .map(|b| b.index)
        .filter(|&idx| !is_radial(graph, idx, eps_radial))
        .collect();
    t.sort_unstable();

    let mut external_maintenance: Vec<usize> = graph
        .live_branches()
        .filter(|b| b.ring.is_assigned() && b.ring != Ring::ZERO)
        .map(|b| b.index)
        .filter(|&idx| !is_radial(graph, idx, eps_radial))
        .collect();
    external_maintenance.sort_by_key(|&idx| (graph.branches[idx].ring.value(), idx));

    let mut internal_maintenance: Vec<usize> = graph
        .live_branches()
        .filter(|b| b.ring == Ring::ZERO)
        .map(|b| b.index)
        .filter(|&idx| !is_radial(graph, idx, eps_radial))
        .collect();
    internal_maintenance.sort_unstable();

    let mut i = external_maintenance;
    i.extend(internal_maintenance);

    OperationalSets { r, r_gens, t, i }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BranchType;

    fn sample_graph() -> Graph {
        let mut g = Graph::new("F");
        g.get_or_create_node("F1", "F");
        g.get_or_create_node("F2", "F");
        g.get_or_create_node("G1", "G");
        g.get_or_create_node("H1", "H");

        // ring 0, internal, monitored
        let t0 = g.push_branch("F1", "F2", "1", "F1-F2-1", 0.1, 100.0, 400.0, BranchType::Line);
        g.branches[t0].ring = Ring::ZERO;
        g.branches[t0].self_ptdf = 0.4;

        // ring 0, internal, but radial (self-PTDF ~ 1): excluded everywhere
        let radial = g.push_branch("F1", "F2", "2", "F1-F2-2", 0.1, 100.0, 400.0, BranchType::Line);
        g.branches[radial].ring = Ring::ZERO;
        g.branches[radial].self_ptdf = 0.9999;

        // ring 1, external
        let r1 = g.push_branch("F1", "G1", "1", "F1-G1-1", 0.1, 100.0, 400.0, BranchType::Line);
        g.branches[r1].ring = Ring::Level(1);
        g.branches[r1].self_ptdf = 0.3;

        // ring 2, external, further out
        let r2 = g.push_branch("G1", "H1", "1", "G1-H1-1", 0.1, 100.0, 400.0, BranchType::Line);
        g.branches[r2].ring = Ring::Level(2);
        g.branches[r2].self_ptdf = 0.2;

        g.push_generator("F1", "GEN_F", 10.0);
        g.generators[0].country = "F".to_string();
        g.push_generator("G1", "GEN_G", 10.0);
        g.generators[1].country = "G".to_string();

        g
    }

    #[test]
    fn radial_branches_are_excluded_from_every_set() {
        let g = sample_graph();
        let sets = select_sets(&g, 1e-3);
        assert!(!sets.t.contains(&1));
        assert!(!sets.i.contains(&1));
        assert!(!sets.r.contains(&1));
    }

    #[test]
    fn t_is_ring_zero_only() {
        let g = sample_graph();
        let sets = select_sets(&g, 1e-3);
        assert_eq!(sets.t, vec![0]);
    }

    #[test]
    fn r_is_external_sorted_by_ring_then_index() {
        let g = sample_graph();
        let sets = select_sets(&g, 1e-3);
        assert_eq!(sets.r, vec![2, 3]);
    }

    #[test]
    fn r_gens_excludes_control_area_generators() {
        let g = sample_graph();
        let sets = select_sets(&g, 1e-3);
        assert_eq!(sets.r_gens, vec![1]);
    }

    #[test]
    fn i_concatenates_external_then_internal() {
        let g = sample_graph();
        let sets = select_sets(&g, 1e-3);
        assert_eq!(sets.i, vec![2, 3, 0]);
    }
}
