pub mod apply;
pub mod manifest;
pub mod spec;

pub use apply::{apply_scenario_to_network, ScenarioApplyOptions};
pub use manifest::{materialize_scenarios, ScenarioArtifact};
pub use spec::{
    load_spec_from_path, resolve_scenarios, validate, ScenarioDefaults, ScenarioSet, ScenarioSpec,
};
