pub mod cigre;
pub mod eia;
pub mod ember;
pub mod opfdata;
pub mod pfdelta;
pub mod pmu;
#[cfg(feature = "powergraph")]
pub mod powergraph;
pub mod socal28;
pub mod state_estimation;

pub use cigre::{
    build_cigre_mv_network, generate_measurements, write_measurements_csv, CigreMvConfig,
    Measurement, MeasurementGeneratorConfig, MeasurementType,
};
pub use eia::{EiaDataFetcher, EiaGeneratorData};
pub use ember::{EmberDataFetcher, EmberDataPoint};
pub use opfdata::{
    list_sample_refs, load_opfdata_instance, OpfDataInstance, OpfDataSampleRef, OpfDataSolution,
};
pub use pfdelta::{
    list_pfdelta_cases, load_pfdelta_batch, load_pfdelta_case, load_pfdelta_instance,
    PFDeltaInstance, PFDeltaSolution, PFDeltaTestCase,
};
pub use pmu::{
    load_pmu_csv, load_pmu_json, pmu_frames_to_measurements, pmu_series_to_measurement_snapshots,
    PmuCsvConfig, PmuDatasetMetadata, PmuFrame, PmuJsonDataset, PmuQuality, PmuStationInfo,
    PmuTimeSeries, PmuToSeConfig,
};
#[cfg(feature = "powergraph")]
pub use powergraph::{
    list_powergraph_datasets, load_powergraph_dataset, sample_to_pytorch_geometric_json,
    EdgeFeatureSpec, NodeFeatureSpec, PowerGraphDatasetInfo, PowerGraphSample, PowerGraphTask,
};
pub use socal28::{
    build_socal28_network, generate_synthetic_pmu_data, SoCal28BusType, SoCal28Config,
    SoCal28Metadata,
};
pub use state_estimation::{
    compute_chi2, compute_residuals, group_frames_by_timestamp, prepare_pmu_measurements,
    StateEstimateSnapshot, TimeSeriesSeConfig, TimeSeriesSeResult,
};
