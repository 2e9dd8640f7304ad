//! Bridge configuration from environment or a TOML file.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | AUTOBRIDGE_COMPONENT | AoJia CLSID | Component identifier (`{CLSID}` or ProgID). |
//! | AUTOBRIDGE_HELPER_MODULE | unset | Redirection helper module (exports `SetDllPathW`). |
//! | AUTOBRIDGE_COMPONENT_MODULE | unset | Component module to load without registration. |
//!
//! Redirected mode (both module paths set) needs a `{CLSID}` component identifier: a ProgID
//! can only be mapped to its class through the registry, so activation rejects it with
//! `CO_E_CLASSSTRING`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bridge::InvokeBridge;
use crate::error::ConfigError;
use crate::facility::{ActivationFacility, ComponentId};
use crate::redirect::PathRedirector;

/// Class id of the AoJia automation component.
pub const DEFAULT_COMPONENT: &str = "{4F27E588-5B1E-45B4-AD67-E32D45C4E9CA}";

fn default_component() -> String {
    DEFAULT_COMPONENT.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// AUTOBRIDGE_COMPONENT
    #[serde(default = "default_component")]
    pub component: String,
    /// AUTOBRIDGE_HELPER_MODULE
    #[serde(default)]
    pub helper_module: Option<PathBuf>,
    /// AUTOBRIDGE_COMPONENT_MODULE
    #[serde(default)]
    pub component_module: Option<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            component: default_component(),
            helper_module: None,
            component_module: None,
        }
    }
}

impl BridgeConfig {
    /// Load from environment. Unset or blank variables fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from any variable source (used by `from_env`).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let opt = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            component: opt("AUTOBRIDGE_COMPONENT").unwrap_or_else(default_component),
            helper_module: opt("AUTOBRIDGE_HELPER_MODULE").map(PathBuf::from),
            component_module: opt("AUTOBRIDGE_COMPONENT_MODULE").map(PathBuf::from),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn component_id(&self) -> ComponentId {
        ComponentId::new(self.component.clone())
    }

    /// Redirector and target path, when both module paths are configured.
    pub fn redirect(&self) -> Option<(PathRedirector, PathBuf)> {
        match (&self.helper_module, &self.component_module) {
            (Some(helper), Some(target)) => {
                Some((PathRedirector::from_module(helper.clone()), target.clone()))
            }
            _ => None,
        }
    }

    /// Build a bridge in redirected mode when configured for it, registered mode otherwise.
    pub fn build<F>(&self, facility: &F) -> InvokeBridge
    where
        F: ActivationFacility + ?Sized,
    {
        match self.redirect() {
            Some((redirector, target)) => {
                InvokeBridge::redirected(facility, self.component_id(), &redirector, &target)
            }
            None => InvokeBridge::registered(facility, self.component_id()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_unset() {
        let config = BridgeConfig::from_lookup(|_| None);
        assert_eq!(config, BridgeConfig::default());
        assert!(config.component_id().is_class_id());
        assert!(config.redirect().is_none());
    }

    #[test]
    fn test_lookup_trims_and_ignores_blank() {
        let vars: HashMap<&str, &str> = [
            ("AUTOBRIDGE_COMPONENT", "  AoJia.AoJiaD "),
            ("AUTOBRIDGE_HELPER_MODULE", "   "),
            ("AUTOBRIDGE_COMPONENT_MODULE", "C:/tools/AoJia64.dll"),
        ]
        .into_iter()
        .collect();
        let config = BridgeConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.component, "AoJia.AoJiaD");
        assert_eq!(config.helper_module, None);
        assert_eq!(
            config.component_module,
            Some(PathBuf::from("C:/tools/AoJia64.dll"))
        );
        assert!(config.redirect().is_none());
    }

    #[test]
    fn test_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autobridge.toml");
        std::fs::write(
            &path,
            "helper_module = \"ARegJ64.dll\"\ncomponent_module = \"AoJia64.dll\"\n",
        )
        .unwrap();
        let config = BridgeConfig::from_toml_file(&path).unwrap();
        assert_eq!(config.component, DEFAULT_COMPONENT);
        let (_, target) = config.redirect().unwrap();
        assert_eq!(target, PathBuf::from("AoJia64.dll"));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = BridgeConfig::from_toml_str("component = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = BridgeConfig::from_toml_file("/nonexistent/autobridge.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
