//! Built-in OPF formulations.
//!
//! Each formulation wraps an existing solver implementation and exposes
//! it through the `OpfFormulation` trait.

mod ac;
mod dc;
mod economic;
mod socp;

pub use ac::AcOpfFormulation;
pub use dc::DcOpfFormulation;
pub use economic::EconomicDispatchFormulation;
pub use socp::SocpFormulation;
