//! Module options (configuration value object) and the factory that builds
//! them from a nested configuration mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Which user attribute an identity value is matched against.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityField {
    Email,
    Username,
}

/// Options for the user-authentication module.
///
/// Populated once (see [`ModuleOptionsFactory`]) and then shared read-only.
/// Keys are camelCase in configuration; snake_case aliases are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModuleOptions {
    /// Type name of the user entity the store hydrates.
    #[serde(alias = "entity_class")]
    pub entity_class: String,

    #[serde(alias = "login_redirect_route")]
    pub login_redirect_route: String,

    #[serde(alias = "logout_redirect_route")]
    pub logout_redirect_route: String,

    #[serde(alias = "use_redirect_parameter_if_present")]
    pub use_redirect_parameter_if_present: bool,

    /// Fields tried, in order, when resolving the submitted identity.
    #[serde(alias = "auth_identity_fields")]
    pub auth_identity_fields: Vec<IdentityField>,

    #[serde(alias = "enable_username")]
    pub enable_username: bool,

    #[serde(alias = "enable_display_name")]
    pub enable_display_name: bool,

    #[serde(alias = "enable_registration")]
    pub enable_registration: bool,

    /// Seconds a rendered login form stays valid.
    #[serde(alias = "login_form_timeout")]
    pub login_form_timeout: u64,

    /// bcrypt cost for stored credentials.
    #[serde(alias = "password_cost")]
    pub password_cost: u32,

    #[serde(alias = "enable_user_state")]
    pub enable_user_state: bool,

    #[serde(alias = "default_user_state")]
    pub default_user_state: i32,

    /// States allowed to log in when `enable_user_state` is on; `None` is a
    /// user without any state.
    #[serde(alias = "allowed_login_states")]
    pub allowed_login_states: Vec<Option<i32>>,

    /// Authentication adapters by priority (higher runs first).
    #[serde(alias = "auth_adapters")]
    pub auth_adapters: BTreeMap<i32, String>,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            entity_class: "loginkit::User".to_string(),
            login_redirect_route: "user".to_string(),
            logout_redirect_route: "user/login".to_string(),
            use_redirect_parameter_if_present: true,
            auth_identity_fields: vec![IdentityField::Email],
            enable_username: false,
            enable_display_name: false,
            enable_registration: true,
            login_form_timeout: 300,
            password_cost: 14,
            enable_user_state: false,
            default_user_state: 1,
            allowed_login_states: vec![None, Some(1)],
            auth_adapters: BTreeMap::from([(100, "credential".to_string())]),
        }
    }
}

impl ModuleOptions {
    /// Lowest/highest bcrypt cost accepted.
    pub const PASSWORD_COST_RANGE: core::ops::RangeInclusive<u32> = 4..=31;

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> DomainResult<()> {
        if !Self::PASSWORD_COST_RANGE.contains(&self.password_cost) {
            return Err(DomainError::validation(format!(
                "passwordCost must be within 4..=31 (got {})",
                self.password_cost
            )));
        }
        if self.auth_identity_fields.is_empty() {
            return Err(DomainError::validation(
                "authIdentityFields must name at least one field",
            ));
        }
        Ok(())
    }

    /// Whether a user in `state` may log in.
    pub fn is_login_state_allowed(&self, state: Option<i32>) -> bool {
        !self.enable_user_state || self.allowed_login_states.contains(&state)
    }
}

/// Builds [`ModuleOptions`] from application configuration.
///
/// The options live in the [`CONFIG_SECTION`](Self::CONFIG_SECTION) entry of
/// the configuration root. Absent keys fall back to defaults; present keys
/// are copied verbatim.
#[derive(Debug, Default, Copy, Clone)]
pub struct ModuleOptionsFactory;

impl ModuleOptionsFactory {
    pub const CONFIG_SECTION: &'static str = "zfc_user";

    pub fn new() -> Self {
        Self
    }

    pub fn create(&self, config: &Value) -> DomainResult<ModuleOptions> {
        let section = match config.get(Self::CONFIG_SECTION) {
            None | Some(Value::Null) => {
                tracing::debug!("no module options section; using defaults");
                return Ok(ModuleOptions::default());
            }
            Some(section) => section,
        };

        let options: ModuleOptions = serde_json::from_value(section.clone()).map_err(|e| {
            DomainError::validation(format!("{}: {e}", Self::CONFIG_SECTION))
        })?;
        options.validate()?;

        tracing::debug!(entity_class = %options.entity_class, "module options loaded");
        Ok(options)
    }

    /// Parse a JSON configuration document and build options from it.
    pub fn from_json_str(&self, raw: &str) -> DomainResult<ModuleOptions> {
        let config: Value = serde_json::from_str(raw)
            .map_err(|e| DomainError::validation(format!("configuration is not valid JSON: {e}")))?;
        self.create(&config)
    }
}
