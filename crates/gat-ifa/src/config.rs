//! Run configuration: a plain serializable struct loaded from TOML with
//! CLI-flag overrides layered on top, matching the host workspace's
//! existing config-file convention (see `gat-cli::install::config`).

use serde::{Deserialize, Serialize};

use crate::error::{IfaError, IfaResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfaConfig {
    /// Selects the country-mapping heuristic used by the input parser.
    pub case_name: String,
    /// Ordered control areas to analyze; `"XX"` means "skip".
    pub countries: Vec<String>,
    /// Self-PTDF radial-exclusion cutoff.
    #[serde(default = "default_eps_radial")]
    pub eps_radial: f64,
    /// N-2 closed-form denominator cutoff, kept distinct from `eps_radial`.
    #[serde(default = "default_eps_denominator")]
    pub eps_denominator: f64,
    /// `true` contracts couplers; `false` converts them to plain lines.
    #[serde(default = "default_true")]
    pub do_merge_couplers: bool,
    /// Enables the generator N-2 sweep.
    #[serde(default = "default_true")]
    pub do_calculate_generator_if: bool,
    /// Parser-side voltage filter, in kV (0.0 disables it).
    #[serde(default)]
    pub min_voltage_level_kv: f64,
    /// MVA base used for per-unit impedance conversion.
    #[serde(default = "default_sbase")]
    pub sbase: f64,
}

fn default_eps_radial() -> f64 {
    1e-3
}

fn default_eps_denominator() -> f64 {
    1e-5
}

fn default_true() -> bool {
    true
}

fn default_sbase() -> f64 {
    1.0
}

impl IfaConfig {
    pub fn load(path: &std::path::Path) -> IfaResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| IfaError::Config(format!("reading {}: {e}", path.display())))?;
        let config: IfaConfig = toml::from_str(&contents)
            .map_err(|e| IfaError::Config(format!("parsing {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> IfaResult<()> {
        if self.case_name.trim().is_empty() {
            return Err(IfaError::Config("case_name must not be empty".into()));
        }
        if self.countries.is_empty() {
            return Err(IfaError::Config("countries list must not be empty".into()));
        }
        if self.sbase <= 0.0 {
            return Err(IfaError::Config("Sbase must be positive".into()));
        }
        if self.eps_radial <= 0.0 || self.eps_denominator <= 0.0 {
            return Err(IfaError::Config(
                "eps_radial and eps_denominator must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Control areas to actually run, with the `"XX"` skip sentinel filtered
    /// out, in the configured order.
    pub fn active_countries(&self) -> Vec<&str> {
        self.countries
            .iter()
            .map(String::as_str)
            .filter(|c| *c != "XX")
            .collect()
    }

    /// Applies CLI-flag overrides on top of the file-loaded config. Each
    /// `Option` field left `None` leaves the file value untouched.
    pub fn apply_overrides(&mut self, overrides: &IfaConfigOverrides) {
        if let Some(v) = overrides.eps_radial {
            self.eps_radial = v;
        }
        if let Some(v) = overrides.eps_denominator {
            self.eps_denominator = v;
        }
        if let Some(v) = overrides.do_merge_couplers {
            self.do_merge_couplers = v;
        }
        if let Some(v) = overrides.do_calculate_generator_if {
            self.do_calculate_generator_if = v;
        }
        if let Some(v) = overrides.min_voltage_level_kv {
            self.min_voltage_level_kv = v;
        }
        if let Some(v) = &overrides.countries {
            self.countries = v.clone();
        }
    }
}

/// CLI-flag overrides, layered on top of a loaded [`IfaConfig`]. Mirrors the
/// host CLI's `clap`-derive command pattern: every field optional, `None`
/// meaning "not passed on the command line".
#[derive(Debug, Clone, Default)]
pub struct IfaConfigOverrides {
    pub eps_radial: Option<f64>,
    pub eps_denominator: Option<f64>,
    pub do_merge_couplers: Option<bool>,
    pub do_calculate_generator_if: Option<bool>,
    pub min_voltage_level_kv: Option<f64>,
    pub countries: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> IfaConfig {
        IfaConfig {
            case_name: "merged-core".into(),
            countries: vec!["A".into(), "B".into()],
            eps_radial: default_eps_radial(),
            eps_denominator: default_eps_denominator(),
            do_merge_couplers: true,
            do_calculate_generator_if: true,
            min_voltage_level_kv: 0.0,
            sbase: 1.0,
        }
    }

    #[test]
    fn rejects_empty_countries() {
        let mut c = base_config();
        c.countries.clear();
        assert!(c.validate().is_err());
    }

    #[test]
    fn active_countries_skips_xx_sentinel() {
        let mut c = base_config();
        c.countries = vec!["A".into(), "XX".into(), "B".into()];
        assert_eq!(c.active_countries(), vec!["A", "B"]);
    }

    #[test]
    fn overrides_apply_selectively() {
        let mut c = base_config();
        let overrides = IfaConfigOverrides {
            eps_radial: Some(0.5),
            ..Default::default()
        };
        c.apply_overrides(&overrides);
        assert_eq!(c.eps_radial, 0.5);
        assert_eq!(c.eps_denominator, default_eps_denominator());
    }
}
