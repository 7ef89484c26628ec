//! Calculation engine configuration.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::CalcError;

/// Engine tuning. The manager override map generalizes what started life as
/// a single hardcoded name: a manager listed here is paid a flat percentage
/// of pooled revenue instead of the bucket sum.
#[derive(Debug, Clone, Deserialize)]
pub struct CalcConfig {
    /// Manager name key → flat commission percent of pooled revenue.
    /// Checked before the bucket-sum path.
    #[serde(default = "default_manager_overrides")]
    pub manager_overrides: HashMap<String, f64>,
}

fn default_manager_overrides() -> HashMap<String, f64> {
    let mut map = HashMap::new();
    map.insert("sam lopka".to_string(), 0.7);
    map
}

impl Default for CalcConfig {
    fn default() -> Self {
        Self {
            manager_overrides: default_manager_overrides(),
        }
    }
}

impl CalcConfig {
    pub fn from_toml(input: &str) -> Result<Self, CalcError> {
        let config: CalcConfig =
            toml::from_str(input).map_err(|e| CalcError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CalcError> {
        for (name, pct) in &self.manager_overrides {
            if !(*pct >= 0.0 && *pct <= 100.0) {
                return Err(CalcError::ConfigInvalid(format!(
                    "override for '{name}' must be a percent in [0, 100], got {pct}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_carries_known_override() {
        let c = CalcConfig::default();
        assert_eq!(c.manager_overrides.get("sam lopka"), Some(&0.7));
    }

    #[test]
    fn toml_replaces_override_table() {
        let c = CalcConfig::from_toml("[manager_overrides]\n\"jane doe\" = 0.5\n").unwrap();
        assert_eq!(c.manager_overrides.get("jane doe"), Some(&0.5));
        assert_eq!(c.manager_overrides.get("sam lopka"), None);
    }

    #[test]
    fn rejects_out_of_range_override() {
        assert!(CalcConfig::from_toml("[manager_overrides]\nx = 250.0\n").is_err());
    }
}
