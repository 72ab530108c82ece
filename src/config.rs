//! Rule-table configuration for the stamping policy.
//!
//! A [`PolicyConfig`] maps lifecycle event names to per-field rules, where
//! each rule is a condition spelling out *when* the field gets stamped with
//! the current actor id: `"always"`, `"new"` (only while the record is
//! unsaved) or `"existing"` (only once it has been persisted).
//!
//! Conditions are kept as raw strings in the table and parsed when an event
//! fires, so a typo in one rule surfaces as [`PolicyError::InvalidCondition`]
//! the first time that event is handled. Hosts that prefer failing at startup
//! can call [`PolicyConfig::validate`] right after loading.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Default dot-path key under which the session stores the current actor id.
pub const DEFAULT_SESSION_KEY: &str = "Auth.User.id";

/// Default lifecycle event the policy listens on.
pub const DEFAULT_SAVE_EVENT: &str = "beforeSave";

/// When a rule applies, relative to the record's new/existing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Stamp on every save.
    Always,
    /// Stamp only records that have never been persisted ("new").
    OnCreate,
    /// Stamp only records that already exist ("existing").
    OnUpdate,
}

impl Condition {
    /// Parse a configured condition string. Returns `None` for anything
    /// other than the three recognized spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "always" => Some(Condition::Always),
            "new" => Some(Condition::OnCreate),
            "existing" => Some(Condition::OnUpdate),
            _ => None,
        }
    }
}

/// Per-event rules: field name -> raw condition string.
///
/// Keys are unique per event by construction; iteration order is the map's
/// stable key order.
pub type FieldRules = BTreeMap<String, String>;

/// Full configuration for a [`FieldStampPolicy`](crate::FieldStampPolicy).
///
/// Immutable once handed to a policy. When a configuration file supplies an
/// `events` table it fully replaces the default table rather than merging
/// with it; this mirrors the serde defaulting semantics and is intentional,
/// asymmetric behavior (a host that lists any event owns the whole table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Event name -> field rules.
    #[serde(default = "default_events")]
    pub events: BTreeMap<String, FieldRules>,
    /// Dot-path session key holding the current actor id.
    #[serde(default = "default_session_key", rename = "sessionKey")]
    pub session_key: String,
}

fn default_session_key() -> String {
    DEFAULT_SESSION_KEY.to_string()
}

fn default_events() -> BTreeMap<String, FieldRules> {
    let mut rules = FieldRules::new();
    rules.insert("creator_id".to_string(), "new".to_string());
    rules.insert("modifier_id".to_string(), "always".to_string());

    let mut events = BTreeMap::new();
    events.insert(DEFAULT_SAVE_EVENT.to_string(), rules);
    events
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            events: default_events(),
            session_key: default_session_key(),
        }
    }
}

impl PolicyConfig {
    /// Load a configuration from YAML. Missing keys fall back to defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse stamp policy YAML")
    }

    /// Load a configuration from JSON. Missing keys fall back to defaults.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse stamp policy JSON")
    }

    /// Eagerly check every condition string in the table.
    ///
    /// Optional: the policy also validates lazily when an event fires.
    /// Fails on the first unrecognized condition in key order.
    pub fn validate(&self) -> std::result::Result<(), PolicyError> {
        for (event, rules) in &self.events {
            for (field, when) in rules {
                if Condition::parse(when).is_none() {
                    return Err(PolicyError::InvalidCondition {
                        event: event.clone(),
                        field: field.clone(),
                        value: when.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The rules for one event, if any are configured.
    pub fn rules_for(&self, event_name: &str) -> Option<&FieldRules> {
        self.events.get(event_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_plugin_defaults() {
        let config = PolicyConfig::default();
        assert_eq!(config.session_key, "Auth.User.id");

        let rules = config.rules_for("beforeSave").expect("default event rules");
        assert_eq!(rules.get("creator_id").map(String::as_str), Some("new"));
        assert_eq!(rules.get("modifier_id").map(String::as_str), Some("always"));
    }

    #[test]
    fn test_condition_parse_recognizes_exactly_three_spellings() {
        assert_eq!(Condition::parse("always"), Some(Condition::Always));
        assert_eq!(Condition::parse("new"), Some(Condition::OnCreate));
        assert_eq!(Condition::parse("existing"), Some(Condition::OnUpdate));
        assert_eq!(Condition::parse("Always"), None);
        assert_eq!(Condition::parse("fat fingers"), None);
        assert_eq!(Condition::parse(""), None);
    }

    #[test]
    fn test_yaml_events_replace_defaults_wholesale() {
        let yaml = r#"
events:
  Something.special:
    date_specialed: always
"#;
        let config = PolicyConfig::from_yaml(yaml).unwrap();

        // Supplying any events table drops the default one entirely.
        assert!(config.rules_for("beforeSave").is_none());
        let rules = config.rules_for("Something.special").unwrap();
        assert_eq!(rules.get("date_specialed").map(String::as_str), Some("always"));

        // Untouched keys still default.
        assert_eq!(config.session_key, "Auth.User.id");
    }

    #[test]
    fn test_yaml_session_key_override_keeps_default_events() {
        let config = PolicyConfig::from_yaml("sessionKey: Auth.Staff.uuid").unwrap();
        assert_eq!(config.session_key, "Auth.Staff.uuid");
        assert!(config.rules_for("beforeSave").is_some());
    }

    #[test]
    fn test_json_round_trips_through_default() {
        let config = PolicyConfig::from_json("{}").unwrap();
        assert_eq!(config, PolicyConfig::default());
    }

    #[test]
    fn test_validate_accepts_default_and_flags_typos() {
        assert!(PolicyConfig::default().validate().is_ok());

        let mut config = PolicyConfig::default();
        config
            .events
            .get_mut("beforeSave")
            .unwrap()
            .insert("creator_id".to_string(), "fat fingers".to_string());

        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            PolicyError::InvalidCondition {
                event: "beforeSave".to_string(),
                field: "creator_id".to_string(),
                value: "fat fingers".to_string(),
            }
        );
    }
}
