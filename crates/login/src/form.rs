//! Login form: the input side of a login attempt.

use std::collections::BTreeMap;

use serde_json::Value;

use loginkit_auth::{CREDENTIAL_PARAM, IDENTITY_PARAM};
use loginkit_core::{IdentityField, LoginData, ModuleOptions};

/// Minimal form contract the login service holds on to.
pub trait Form {
    fn set_data(&mut self, data: LoginData);

    /// Validate the current data; messages are recomputed.
    fn is_valid(&mut self) -> bool;

    fn data(&self) -> &LoginData;

    /// Validation messages by field name, from the last `is_valid`.
    fn messages(&self) -> &BTreeMap<String, Vec<String>>;
}

const CREDENTIAL_MIN_LEN: usize = 6;

/// `identity` + `credential` form.
///
/// The identity must look like an e-mail address when e-mail is the only
/// configured identity field.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginForm {
    email_only: bool,
    data: LoginData,
    messages: BTreeMap<String, Vec<String>>,
}

impl LoginForm {
    pub fn new(options: &ModuleOptions) -> Self {
        Self {
            email_only: options.auth_identity_fields == [IdentityField::Email],
            data: LoginData::new(),
            messages: BTreeMap::new(),
        }
    }

    fn text(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.messages
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new(&ModuleOptions::default())
    }
}

impl Form for LoginForm {
    fn set_data(&mut self, data: LoginData) {
        self.data = data;
    }

    fn is_valid(&mut self) -> bool {
        self.messages.clear();

        match self.text(IDENTITY_PARAM).map(str::to_owned) {
            None => self.reject(IDENTITY_PARAM, "Value is required and can't be empty"),
            Some(identity) if self.email_only && !looks_like_email(&identity) => {
                self.reject(IDENTITY_PARAM, "The input is not a valid email address")
            }
            Some(_) => {}
        }

        match self.text(CREDENTIAL_PARAM).map(|c| c.chars().count()) {
            None => self.reject(CREDENTIAL_PARAM, "Value is required and can't be empty"),
            Some(len) if len < CREDENTIAL_MIN_LEN => self.reject(
                CREDENTIAL_PARAM,
                format!("The input is less than {CREDENTIAL_MIN_LEN} characters long"),
            ),
            Some(_) => {}
        }

        self.messages.is_empty()
    }

    fn data(&self) -> &LoginData {
        &self.data
    }

    fn messages(&self) -> &BTreeMap<String, Vec<String>> {
        &self.messages
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
