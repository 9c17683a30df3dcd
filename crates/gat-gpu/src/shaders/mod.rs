//! WGSL compute shaders for power system analysis.

pub mod branch_flow;
pub mod contingency;
pub mod monte_carlo;
pub mod power_flow;
pub mod sensitivity;

pub use branch_flow::BRANCH_FLOW_SHADER;
pub use contingency::LODF_SCREENING_SHADER;
pub use monte_carlo::CAPACITY_CHECK_SHADER;
pub use power_flow::POWER_MISMATCH_SHADER;
pub use sensitivity::PTDF_SHADER;
