//! IF search engine: the N-2 closed-form formula plus its normalized and
//! generator variants (§4.4). This is the centerpiece of the pipeline —
//! everything upstream exists to feed matrices and index sets into this
//! module.

use tracing::{debug, info};

use crate::error::{IfaError, IfaResult};
use crate::graph::Graph;
use crate::matrix::MatrixEngine;
use crate::sets::OperationalSets;

/// One external branch `r`'s best N-1 and N-2 influence, raw and
/// PATL-normalized, with the `(i, t)` pair(s) that produced each best value.
#[derive(Debug, Clone)]
pub struct BranchIfResult {
    pub r: usize,
    pub if_n1: f64,
    pub norm_if_n1: f64,
    pub t_n1: Option<usize>,
    pub if_n2: f64,
    pub norm_if_n2: f64,
    pub i_star: Option<usize>,
    pub t_star: Option<usize>,
    pub i_star_norm: Option<usize>,
    pub t_star_norm: Option<usize>,
    /// `mx.lodf[t_star_norm][i_star_norm]`, or 0.0 if no normalized pair was found.
    pub lodf_norm: f64,
    /// `mx.lodf[r][i_star_norm]`, or 0.0 if no normalized pair was found.
    pub lodf_r_inorm: f64,
}

/// One external generator's best N-2 influence and normalized variant,
/// each carrying every `(i, t)` pair tied for the best absolute value
/// (per the resolved Open Question: ties append rather than overwrite).
#[derive(Debug, Clone)]
pub struct GeneratorIfResult {
    pub generator: usize,
    pub if_value: f64,
    pub it_pairs: Vec<(usize, usize)>,
    pub norm_if: f64,
    pub norm_it_pairs: Vec<(usize, usize)>,
}

/// Whether a given `r` hit at least one valid N-2 denominator, alongside its
/// result — kept separate so the degenerate-layer tally can be folded in
/// after a (possibly parallel) per-r map, rather than needing a shared
/// mutable counter across threads.
struct RSearchOutcome {
    result: BranchIfResult,
    ring: u32,
    any_denominator: bool,
}

/// Computes one external branch `r`'s N-1 fallback and N-2 closed-form best
/// case against every `(i, t)` drawn from `sets.i` x `sets.t`. Pure function
/// of its inputs — the parallel and sequential callers share this directly.
fn compute_r(
    graph: &Graph,
    mx: &MatrixEngine,
    sets: &OperationalSets,
    eps_denominator: f64,
    r: usize,
) -> RSearchOutcome {
    let ring = graph.branches[r].ring.value();

    // N-1 fallback: direct LODF from every monitored branch t, independent
    // of the second-outage search below.
    let mut if_n1 = 0.0f64;
    let mut norm_if_n1 = 0.0f64;
    let mut t_n1 = None;
    for &t in &sets.t {
        if t == r {
            continue;
        }
        let val = mx.lodf[t][r];
        let abs_val = val.abs();
        if abs_val > if_n1.abs() {
            if_n1 = val;
            t_n1 = Some(t);
        }
        let norm_val = mx.patl_ratio[r][t] * abs_val;
        if norm_val > norm_if_n1 {
            norm_if_n1 = norm_val;
        }
    }

    // N-2 search: for every candidate first-outage i, split the
    // denominator D once, then scan every monitored t.
    let mut if_n2 = 0.0f64;
    let mut i_star = None;
    let mut t_star = None;
    let mut norm_if_n2 = 0.0f64;
    let mut i_star_norm = None;
    let mut t_star_norm = None;
    let mut any_denominator = false;

    for &i in &sets.i {
        if i == r {
            continue;
        }
        let d = (1.0 - mx.ptdf[r][r]) * (1.0 - mx.ptdf[i][i]) - mx.ptdf[i][r] * mx.ptdf[r][i];
        if d.abs() <= eps_denominator {
            continue;
        }
        any_denominator = true;

        let mut local_best = 0.0f64;
        let mut local_t = None;
        let mut local_norm_best = 0.0f64;
        let mut local_norm_t = None;

        for &t in &sets.t {
            if t == i || t == r {
                continue;
            }
            let numerator =
                mx.ptdf[t][i] * mx.ptdf[i][r] + (1.0 - mx.ptdf[i][i]) * mx.ptdf[t][r];
            let value = numerator / d;
            let abs_value = value.abs();
            if abs_value > local_best.abs() {
                local_best = value;
                local_t = Some(t);
            }
            let norm_value = mx.patl_ratio[r][t] * abs_value;
            if norm_value > local_norm_best {
                local_norm_best = norm_value;
                local_norm_t = Some(t);
            }
        }

        if local_best.abs() > if_n2.abs() {
            if_n2 = local_best;
            i_star = Some(i);
            t_star = local_t;
        }
        if local_norm_best > norm_if_n2 {
            norm_if_n2 = local_norm_best;
            i_star_norm = Some(i);
            t_star_norm = local_norm_t;
        }
    }

    if !any_denominator {
        debug!(branch = %graph.branches[r].canonical_name(), ring, "no valid N-2 denominator; falling back to N-1 only");
    }

    let (lodf_norm, lodf_r_inorm) = match (i_star_norm, t_star_norm) {
        (Some(inorm), Some(tnorm)) => (mx.lodf[tnorm][inorm], mx.lodf[r][inorm]),
        _ => (0.0, 0.0),
    };

    RSearchOutcome {
        result: BranchIfResult {
            r,
            if_n1,
            norm_if_n1,
            t_n1,
            if_n2,
            norm_if_n2,
            i_star,
            t_star,
            i_star_norm,
            t_star_norm,
            lodf_norm,
            lodf_r_inorm,
        },
        ring,
        any_denominator,
    }
}

#[cfg(feature = "parallel")]
fn map_over_r(
    graph: &Graph,
    mx: &MatrixEngine,
    sets: &OperationalSets,
    eps_denominator: f64,
) -> Vec<RSearchOutcome> {
    use rayon::prelude::*;
    // `par_iter` over a slice preserves index order on collect, so the
    // per-r reduction below never needs cross-thread tie-break bookkeeping
    // beyond what `compute_r` already does independently per r.
    sets.r
        .par_iter()
        .map(|&r| compute_r(graph, mx, sets, eps_denominator, r))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn map_over_r(
    graph: &Graph,
    mx: &MatrixEngine,
    sets: &OperationalSets,
    eps_denominator: f64,
) -> Vec<RSearchOutcome> {
    sets.r
        .iter()
        .map(|&r| compute_r(graph, mx, sets, eps_denominator, r))
        .collect()
}

/// Runs the N-2 branch search over every external contingency in `sets.r`,
/// against every `(i, t)` pair drawn from `sets.i` x `sets.t`, and folds in
/// the plain N-1 fallback computed straight from LODF/PATL ratio.
///
/// Fails with [`IfaError::EmptyExternalSet`] if `sets.r` is empty — a
/// country with nothing to search is a configuration problem upstream, not
/// a silently-empty result set.
pub fn search(
    graph: &Graph,
    mx: &MatrixEngine,
    sets: &OperationalSets,
    eps_denominator: f64,
) -> IfaResult<Vec<BranchIfResult>> {
    if sets.r.is_empty() {
        return Err(IfaError::EmptyExternalSet(graph.control_area.clone()));
    }

    let outcomes = map_over_r(graph, mx, sets, eps_denominator);

    let mut degenerate_layers: std::collections::BTreeMap<u32, u32> = Default::default();
    let mut results = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        if !outcome.any_denominator {
            *degenerate_layers.entry(outcome.ring).or_insert(0) += 1;
        }
        results.push(outcome.result);
    }

    for (ring, count) in &degenerate_layers {
        info!(
            ring,
            count, "branches in this ring had no valid N-2 denominator; N-1-only result"
        );
    }

    Ok(results)
}

/// Computes one external generator's best N-2 influence (and normalized
/// variant) against every `(i, t)` drawn from `sets.i` x `sets.t`. Returns
/// `None` when the generator has no balancing peer — the row is omitted
/// rather than reported as a meaningless all-zero sensitivity.
fn compute_generator(
    graph: &Graph,
    mx: &MatrixEngine,
    sets: &OperationalSets,
    r_gen: usize,
) -> Option<GeneratorIfResult> {
    if !mx.gen_has_peer[r_gen] {
        info!(
            generator = %graph.generators[r_gen].display_name,
            "no balancing peer; generator-IF row omitted"
        );
        return None;
    }

    let mut best_abs = 0.0f64;
    let mut best_value = 0.0f64;
    let mut best_pairs: Vec<(usize, usize)> = Vec::new();
    let mut norm_best = 0.0f64;
    let mut norm_best_pairs: Vec<(usize, usize)> = Vec::new();

    for &i in &sets.i {
        for &t in &sets.t {
            if i == t {
                continue;
            }
            let value = mx.gen_lodf[t][r_gen] + mx.lodf[t][i] * mx.gen_lodf[i][r_gen];
            let abs_value = value.abs();

            if abs_value > best_abs {
                best_abs = abs_value;
                best_value = value;
                best_pairs.clear();
                best_pairs.push((i, t));
            } else if abs_value == best_abs && abs_value > 0.0 {
                best_pairs.push((i, t));
            }

            // LODF_gens_norm[x][r] = gen_lodf[x][r] * power[r] / PATL[x], so the
            // composed normalized value collapses to power[r]/PATL[t] * abs_value
            // (see the generator-LODF normalization derivation in DESIGN.md).
            let patl_t = graph.branches[t].patl;
            let norm_value = if patl_t > 0.0 {
                abs_value * graph.generators[r_gen].power_mw / patl_t
            } else {
                0.0
            };
            if norm_value > norm_best {
                norm_best = norm_value;
                norm_best_pairs.clear();
                norm_best_pairs.push((i, t));
            } else if norm_value == norm_best && norm_value > 0.0 {
                norm_best_pairs.push((i, t));
            }
        }
    }

    Some(GeneratorIfResult {
        generator: r_gen,
        if_value: best_value,
        it_pairs: best_pairs,
        norm_if: norm_best,
        norm_it_pairs: norm_best_pairs,
    })
}

#[cfg(feature = "parallel")]
fn map_over_generators(
    graph: &Graph,
    mx: &MatrixEngine,
    sets: &OperationalSets,
) -> Vec<GeneratorIfResult> {
    use rayon::prelude::*;
    sets.r_gens
        .par_iter()
        .filter_map(|&r_gen| compute_generator(graph, mx, sets, r_gen))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn map_over_generators(
    graph: &Graph,
    mx: &MatrixEngine,
    sets: &OperationalSets,
) -> Vec<GeneratorIfResult> {
    sets.r_gens
        .iter()
        .filter_map(|&r_gen| compute_generator(graph, mx, sets, r_gen))
        .collect()
}

/// Runs the generator N-2 search over every external generator in
/// `sets.r_gens`. Generators with no balancing peer ([`MatrixEngine::gen_has_peer`]
/// false) are omitted entirely, with a log entry, rather than emitting a
/// meaningless all-zero row.
pub fn search_generators(
    graph: &Graph,
    mx: &MatrixEngine,
    sets: &OperationalSets,
) -> Vec<GeneratorIfResult> {
    map_over_generators(graph, mx, sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BranchType, Ring};

    fn zeros(n: usize) -> Vec<Vec<f64>> {
        vec![vec![0.0; n]; n]
    }

    /// Three branches (r=0, i=1, t=2) on an otherwise-disconnected graph,
    /// with hand-picked PTDF/LODF/PATL-ratio entries so the N-2 closed form
    /// can be checked against its own formula rather than a full pipeline.
    fn rig() -> (Graph, MatrixEngine, OperationalSets) {
        let mut g = Graph::new("F");
        g.get_or_create_node("N0", "F");
        g.get_or_create_node("N1", "F");
        let r = g.push_branch("N0", "N1", "1", "N0-N1-1", 0.1, 100.0, 400.0, BranchType::Line);
        let i = g.push_branch("N0", "N1", "2", "N0-N1-2", 0.1, 100.0, 400.0, BranchType::Line);
        let t = g.push_branch("N0", "N1", "3", "N0-N1-3", 0.1, 100.0, 400.0, BranchType::Line);
        g.branches[r].ring = Ring::Level(1);
        g.branches[i].ring = Ring::Level(1);
        g.branches[t].ring = Ring::ZERO;

        let mut ptdf = zeros(3);
        ptdf[0][0] = 0.2; // self r
        ptdf[1][1] = 0.3; // self i
        ptdf[1][0] = 0.1; // ptdf[i][r]
        ptdf[0][1] = 0.15; // ptdf[r][i]
        ptdf[1][2] = 0.05; // ptdf[i][t]
        ptdf[2][1] = 0.25; // ptdf[t][i]
        ptdf[2][0] = 0.05; // ptdf[t][r]

        let mut lodf = zeros(3);
        lodf[2][0] = 0.6; // lodf[t][r], drives N-1 fallback
        lodf[2][1] = 0.9; // lodf[t][i]
        lodf[0][1] = 0.4; // lodf[r][i]

        let mut patl_ratio = zeros(3);
        patl_ratio[0][2] = 2.0; // patl_ratio[r][t]

        let mx = MatrixEngine {
            slack: 0,
            n_nodes: 2,
            n_branches: 3,
            isf: zeros(3),
            ptdf,
            lodf,
            patl_ratio,
            gen_lodf: Vec::new(),
            gen_has_peer: Vec::new(),
        };

        let sets = OperationalSets {
            r: vec![r],
            r_gens: Vec::new(),
            t: vec![t],
            i: vec![i],
        };

        (g, mx, sets)
    }

    #[test]
    fn n2_closed_form_matches_hand_computation() {
        let (graph, mx, sets) = rig();
        let results = search(&graph, &mx, &sets, 1e-9).unwrap();
        assert_eq!(results.len(), 1);
        let res = &results[0];

        assert_eq!(res.r, 0);
        assert_eq!(res.t_n1, Some(2));
        assert!((res.if_n1 - 0.6).abs() < 1e-12);
        assert!((res.norm_if_n1 - 1.2).abs() < 1e-12);

        let d = (1.0 - 0.2) * (1.0 - 0.3) - 0.15 * 0.1;
        // ptdf[t][i]*ptdf[i][r] + (1 - ptdf[i][i])*ptdf[t][r]
        let numerator = 0.25 * 0.1 + (1.0 - 0.3) * 0.05;
        let expected_if_n2 = numerator / d;

        assert_eq!(res.i_star, Some(1));
        assert_eq!(res.t_star, Some(2));
        assert!((res.if_n2 - expected_if_n2).abs() < 1e-12);
        assert!((res.norm_if_n2 - 2.0 * expected_if_n2.abs()).abs() < 1e-12);

        assert_eq!(res.i_star_norm, Some(1));
        assert_eq!(res.t_star_norm, Some(2));
        assert!((res.lodf_norm - 0.9).abs() < 1e-12);
        assert!((res.lodf_r_inorm - 0.4).abs() < 1e-12);
    }

    #[test]
    fn search_rejects_empty_external_set() {
        let (graph, mx, mut sets) = rig();
        sets.r.clear();
        let err = search(&graph, &mx, &sets, 1e-9).unwrap_err();
        assert!(matches!(err, IfaError::EmptyExternalSet(_)));
    }

    #[test]
    fn degenerate_denominator_falls_back_to_n1_only() {
        let (graph, mut mx, sets) = rig();
        // Force the N-2 denominator to vanish: self-PTDF[r][r] = 1 zeroes
        // the first term, and ptdf[i][r] = 0 zeroes the cross term too.
        mx.ptdf[0][0] = 1.0;
        mx.ptdf[1][0] = 0.0;
        let results = search(&graph, &mx, &sets, 1e-9).unwrap();
        let res = &results[0];
        assert_eq!(res.if_n2, 0.0);
        assert_eq!(res.i_star, None);
        assert!((res.if_n1 - 0.6).abs() < 1e-12);
    }

    #[test]
    fn generator_search_combines_direct_and_indirect_lodf() {
        let mut g = Graph::new("F");
        g.get_or_create_node("N0", "F");
        g.get_or_create_node("N1", "F");
        let i = g.push_branch("N0", "N1", "1", "N0-N1-1", 0.1, 100.0, 400.0, BranchType::Line);
        let t = g.push_branch("N0", "N1", "2", "N0-N1-2", 0.1, 10.0, 400.0, BranchType::Line);
        g.push_generator("N0", "GEN_X", 50.0);

        let mut lodf = zeros(2);
        lodf[1][0] = 0.5; // lodf[t][i]

        let mx = MatrixEngine {
            slack: 0,
            n_nodes: 2,
            n_branches: 2,
            isf: zeros(2),
            ptdf: zeros(2),
            lodf,
            patl_ratio: zeros(2),
            gen_lodf: vec![vec![0.2], vec![0.3]], // [i][gen], [t][gen]
            gen_has_peer: vec![true],
        };

        let sets = OperationalSets {
            r: Vec::new(),
            r_gens: vec![0],
            t: vec![t],
            i: vec![i],
        };

        let results = search_generators(&g, &mx, &sets);
        assert_eq!(results.len(), 1);
        let res = &results[0];
        assert_eq!(res.generator, 0);
        assert!((res.if_value - 0.4).abs() < 1e-12);
        assert_eq!(res.it_pairs, vec![(i, t)]);
        // abs_value * power_mw / PATL[t] = 0.4 * 50.0 / 10.0
        assert!((res.norm_if - 2.0).abs() < 1e-12);
    }

    #[test]
    fn generator_without_balancing_peer_is_omitted() {
        let mut g = Graph::new("F");
        g.get_or_create_node("N0", "F");
        g.push_generator("N0", "SOLO", 10.0);

        let mx = MatrixEngine {
            slack: 0,
            n_nodes: 1,
            n_branches: 0,
            isf: Vec::new(),
            ptdf: Vec::new(),
            lodf: Vec::new(),
            patl_ratio: Vec::new(),
            gen_lodf: vec![Vec::new()],
            gen_has_peer: vec![false],
        };
        let sets = OperationalSets {
            r: Vec::new(),
            r_gens: vec![0],
            t: Vec::new(),
            i: Vec::new(),
        };

        let results = search_generators(&g, &mx, &sets);
        assert!(results.is_empty());
    }
}
