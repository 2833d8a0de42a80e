//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`
//!
//! Sessions copy what they need at construction, so nothing reads the
//! singleton on the key path.

use std::sync::OnceLock;

use serde::Deserialize;

use crate::composition::CompositionLimits;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub composition: CompositionSettings,
    pub deletion: DeletionSettings,
    pub callback: CallbackSettings,
}

impl Settings {
    pub fn composition_limits(&self) -> CompositionLimits {
        CompositionLimits {
            max_text_length: self.composition.max_text_length,
            max_clause_count: self.composition.max_clause_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompositionSettings {
    pub max_text_length: usize,
    pub max_clause_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeletionSettings {
    pub max_count: usize,
    pub release_modifiers: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackSettings {
    pub max_follow_ups: usize,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings =
        toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive_usize {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive_usize!(composition.max_text_length);
    check_positive_usize!(composition.max_clause_count);
    check_positive_usize!(deletion.max_count);

    // A clause array always holds the leading 0 and the end offset.
    if s.composition.max_clause_count < 2 {
        return Err(SettingsError::InvalidValue {
            field: "composition.max_clause_count".to_string(),
            reason: "must be at least 2".to_string(),
        });
    }

    Ok(())
}
