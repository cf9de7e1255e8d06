use ecdar_core::{InitialLocationPolicy, ProjectPolicy};

pub const INITIAL_LOCATION_POLICY_VAR: &str = "ECDAR_INITIAL_LOCATION_POLICY";
pub const REQUIRE_ACYCLIC_SYSTEMS_VAR: &str = "ECDAR_REQUIRE_ACYCLIC_SYSTEMS";

/// Editor configuration from environment variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    pub initial_location: InitialLocationPolicy,
    pub require_acyclic_systems: bool,
}

impl Config {
    /// Load configuration from environment variables.
    /// ECDAR_INITIAL_LOCATION_POLICY defaults to "warn",
    /// ECDAR_REQUIRE_ACYCLIC_SYSTEMS defaults to "false".
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let initial_location = match lookup(INITIAL_LOCATION_POLICY_VAR) {
            Some(value) => value.parse().map_err(|_| {
                ConfigError::Invalid(INITIAL_LOCATION_POLICY_VAR, "must be ignore, warn or enforce")
            })?,
            None => InitialLocationPolicy::default(),
        };

        let require_acyclic_systems = match lookup(REQUIRE_ACYCLIC_SYSTEMS_VAR) {
            Some(value) => parse_bool(&value).ok_or(ConfigError::Invalid(
                REQUIRE_ACYCLIC_SYSTEMS_VAR,
                "must be true or false",
            ))?,
            None => false,
        };

        Ok(Config {
            initial_location,
            require_acyclic_systems,
        })
    }

    pub fn policy(&self) -> ProjectPolicy {
        ProjectPolicy {
            initial_location: self.initial_location,
            require_acyclic_systems: self.require_acyclic_systems,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(&'static str, &'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Invalid(var, msg) => write!(f, "Invalid value for {}: {}", var, msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.initial_location, InitialLocationPolicy::Warn);
        assert!(!config.require_acyclic_systems);
        assert_eq!(config.policy(), ProjectPolicy::default());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            (INITIAL_LOCATION_POLICY_VAR, "Enforce"),
            (REQUIRE_ACYCLIC_SYSTEMS_VAR, "true"),
        ])
        .unwrap();
        assert_eq!(config.initial_location, InitialLocationPolicy::Enforce);
        assert!(config.policy().require_acyclic_systems);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            load(&[(INITIAL_LOCATION_POLICY_VAR, "strict")]).unwrap_err(),
            ConfigError::Invalid(INITIAL_LOCATION_POLICY_VAR, "must be ignore, warn or enforce")
        );
        let err = load(&[(REQUIRE_ACYCLIC_SYSTEMS_VAR, "maybe")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for ECDAR_REQUIRE_ACYCLIC_SYSTEMS: must be true or false"
        );
    }
}
