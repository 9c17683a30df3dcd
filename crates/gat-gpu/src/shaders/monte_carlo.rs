//! Monte Carlo reliability simulation shaders.

/// WGSL shader for batch capacity adequacy check.
///
/// For each scenario, checks if sum(available_gen) >= demand.
/// Output: 1.0 if adequate, 0.0 if shortfall.
///
/// This is f32-safe: only needs capacity > demand comparison.
pub const CAPACITY_CHECK_SHADER: &str = r#"
struct Uniforms {
    n_scenarios: u32,
    n_generators: u32,
    demand: f32,
    _padding: u32,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
// Generator capacities (n_generators)
@group(0) @binding(1) var<storage, read> gen_capacity: array<f32>;
// Outage matrix: 1.0 = online, 0.0 = offline (n_scenarios * n_generators)
@group(0) @binding(2) var<storage, read> outage_state: array<f32>;
// Output: 1.0 = adequate, 0.0 = shortfall (n_scenarios)
@group(0) @binding(3) var<storage, read_write> adequate: array<f32>;

@compute @workgroup_size(64)
fn main(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let scenario_idx = global_id.x;

    if (scenario_idx >= uniforms.n_scenarios) {
        return;
    }

    var available: f32 = 0.0;
    let base_idx = scenario_idx * uniforms.n_generators;

    for (var g = 0u; g < uniforms.n_generators; g = g + 1u) {
        let is_online = outage_state[base_idx + g];
        available = available + gen_capacity[g] * is_online;
    }

    adequate[scenario_idx] = select(0.0, 1.0, available >= uniforms.demand);
}
"#;
