//! `loginkit-check <identity> <credential>`
//!
//! Runs one login (and logout) against a JSON user list and prints the result
//! code. Exits non-zero when the credentials are rejected.

use std::sync::Arc;

use anyhow::{Context, bail};
use serde_json::Value;

use loginkit_auth::{
    AdapterChain, CREDENTIAL_PARAM, ChainableAdapter, CredentialAdapter, IDENTITY_PARAM, InMemoryUserStore,
};
use loginkit_core::{LoginData, ModuleOptions, ModuleOptionsFactory};
use loginkit_events::{Event, WILDCARD};
use loginkit_login::{Form, LoginEvent, LoginForm, LoginService};

fn load_options() -> anyhow::Result<ModuleOptions> {
    let Ok(path) = std::env::var("LOGINKIT_CONFIG") else {
        tracing::warn!("LOGINKIT_CONFIG not set; using default module options");
        return Ok(ModuleOptions::default());
    };
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    Ok(ModuleOptionsFactory::new().from_json_str(&raw)?)
}

fn load_users() -> anyhow::Result<InMemoryUserStore> {
    let path = std::env::var("LOGINKIT_USERS").context("LOGINKIT_USERS must point at a JSON user list")?;
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    Ok(InMemoryUserStore::from_json_str(&raw)?)
}

fn main() -> anyhow::Result<()> {
    loginkit_observability::init();

    let mut args = std::env::args().skip(1);
    let (Some(identity), Some(credential)) = (args.next(), args.next()) else {
        bail!("usage: loginkit-check <identity> <credential>");
    };

    let options = Arc::new(load_options()?);
    let store = Arc::new(load_users()?);

    let chain = AdapterChain::from_options(&options, |name| {
        (name == CredentialAdapter::<InMemoryUserStore>::NAME).then(|| {
            Arc::new(CredentialAdapter::new(Arc::clone(&store), Arc::clone(&options))) as Arc<dyn ChainableAdapter>
        })
    })?;

    let mut data = LoginData::new();
    data.insert(IDENTITY_PARAM.to_string(), Value::String(identity));
    data.insert(CREDENTIAL_PARAM.to_string(), Value::String(credential));

    let mut form = LoginForm::new(&options);
    form.set_data(data.clone());
    if !form.is_valid() {
        for (field, messages) in form.messages() {
            eprintln!("{field}: {}", messages.join("; "));
        }
        bail!("login form rejected the input");
    }

    let service = LoginService::builder(form, Arc::clone(&options))
        .adapter_chain(Arc::new(chain))
        .build();
    service.event_manager().attach(WILDCARD, |event: &LoginEvent| {
        tracing::debug!(event = event.name(), at = %event.occurred_at(), "lifecycle event");
        Ok(())
    });

    let result = service.login(data)?;
    println!("{}", result.code());
    for message in result.messages() {
        println!("  {message}");
    }

    service.logout()?;

    if !result.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}
