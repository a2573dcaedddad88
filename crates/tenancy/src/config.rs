//! Nested configuration objects.
//!
//! Every field carries `#[serde(default)]` so a record persisted without a
//! config section restores to an empty-but-valid structure. Downstream code
//! never sees a missing config.

use serde::{Deserialize, Serialize};

/// Branding shown in the portal chrome for a firm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VisualConfig {
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
}

/// Which business modules a firm has enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    #[serde(default = "enabled")]
    pub fiscal: bool,
    #[serde(default = "enabled")]
    pub payroll: bool,
    #[serde(default = "enabled")]
    pub inventory: bool,
    #[serde(default = "enabled")]
    pub reconciliation: bool,
    #[serde(default = "enabled")]
    pub documents: bool,
    #[serde(default = "enabled")]
    pub messaging: bool,
}

fn enabled() -> bool {
    true
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            fiscal: true,
            payroll: true,
            inventory: true,
            reconciliation: true,
            documents: true,
            messaging: true,
        }
    }
}

/// Fiscal document emitter environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmitterEnvironment {
    #[default]
    Homologation,
    Production,
}

/// Per-company fiscal emitter configuration.
///
/// The emission pipeline itself lives outside this core; the record is kept
/// here because it is edited through the tenant-settings pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterConfig {
    #[serde(default)]
    pub environment: EmitterEnvironment,
    #[serde(default)]
    pub certificate_alias: Option<String>,
    #[serde(default = "first_serie")]
    pub serie: u32,
    #[serde(default = "first_number")]
    pub next_number: u64,
}

fn first_serie() -> u32 {
    1
}

fn first_number() -> u64 {
    1
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            environment: EmitterEnvironment::default(),
            certificate_alias: None,
            serie: 1,
            next_number: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_object_deserializes_to_valid_configs() {
        let visual: VisualConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(visual, VisualConfig::default());

        let modules: ModuleConfig = serde_json::from_str("{}").unwrap();
        assert!(modules.fiscal && modules.messaging);

        let emitter: EmitterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(emitter.environment, EmitterEnvironment::Homologation);
        assert_eq!(emitter.serie, 1);
        assert_eq!(emitter.next_number, 1);
    }

    #[test]
    fn partial_emitter_config_keeps_remaining_defaults() {
        let emitter: EmitterConfig =
            serde_json::from_str(r#"{"environment":"production","serie":3}"#).unwrap();
        assert_eq!(emitter.environment, EmitterEnvironment::Production);
        assert_eq!(emitter.serie, 3);
        assert_eq!(emitter.next_number, 1);
        assert!(emitter.certificate_alias.is_none());
    }
}
