pub mod arrow_validator;
pub mod conversions;
pub mod diagnostics;
pub mod network_builder;
pub mod network_validator;
pub mod path_security;

pub use arrow_validator::{ArrowValidator, IntegrityError};
pub use conversions::{safe_f64_to_i32, safe_f64_to_usize, safe_u64_to_usize};
pub use diagnostics::{ImportDiagnostics, ImportIssue, ImportResult, ImportStats, Severity};
pub use network_builder::{AddResult, BranchInput, BusInput, GenInput, LoadInput, NetworkBuilder, ShuntInput};
pub use network_validator::{validate_network, validate_network_quick, ValidationConfig};
pub use path_security::{
    validate_import_path, validate_import_path_within, validate_zip_entry_name, PathSecurityError,
    PathValidator, SecurePath, GRID_EXTENSIONS,
};
