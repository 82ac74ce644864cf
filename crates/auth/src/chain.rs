//! Prioritized chain of authentication adapters.

use std::sync::{Arc, PoisonError, RwLock};

use loginkit_core::{LoginData, ModuleOptions};

use crate::{Adapter, AdapterChainEvent, AdapterError, AdapterOutcome, AuthenticationResult, ChainableAdapter};

struct Link {
    priority: i32,
    adapter: Arc<dyn ChainableAdapter>,
}

/// An authentication strategy that tries several adapters in sequence.
///
/// Adapters run highest priority first (equal priorities in attach order)
/// until one returns [`AdapterOutcome::Stop`]. Every run starts from a fresh
/// [`AdapterChainEvent`].
///
/// A chain is usually shared between services, so per-request params travel
/// with the call: [`authenticate_with`](Self::authenticate_with) or an
/// [`attempt`](Self::attempt). Params stored with
/// [`set_event_params`](Self::set_event_params) are only the fallback for the
/// plain [`Adapter`] impl.
#[derive(Default)]
pub struct AdapterChain {
    links: RwLock<Vec<Link>>,
    params: RwLock<LoginData>,
}

impl AdapterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from `authAdapters`, resolving each configured name.
    pub fn from_options<F>(options: &ModuleOptions, mut resolve: F) -> Result<Self, AdapterError>
    where
        F: FnMut(&str) -> Option<Arc<dyn ChainableAdapter>>,
    {
        let chain = Self::new();
        for (priority, name) in &options.auth_adapters {
            let adapter = resolve(name)
                .ok_or_else(|| AdapterError::misconfigured(format!("unknown authentication adapter '{name}'")))?;
            chain.attach(*priority, adapter);
        }
        Ok(chain)
    }

    pub fn attach(&self, priority: i32, adapter: Arc<dyn ChainableAdapter>) -> &Self {
        let mut links = self.links.write().unwrap_or_else(PoisonError::into_inner);
        let at = links
            .iter()
            .position(|l| l.priority < priority)
            .unwrap_or(links.len());
        links.insert(at, Link { priority, adapter });
        self
    }

    /// Adapters in the order they will run.
    pub fn adapters(&self) -> Vec<Arc<dyn ChainableAdapter>> {
        self.links
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|l| Arc::clone(&l.adapter))
            .collect()
    }

    /// Default params for [`Adapter::authenticate`] on the chain itself.
    pub fn set_event_params(&self, params: LoginData) {
        *self.params.write().unwrap_or_else(PoisonError::into_inner) = params;
    }

    pub fn event_params(&self) -> LoginData {
        self.params.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Run the chain over `params`.
    pub fn authenticate_with(&self, params: LoginData) -> Result<AuthenticationResult, AdapterError> {
        let adapters = self.adapters();
        let mut event = AdapterChainEvent::new(params);

        let outcome = Self::run(&adapters, &mut event);
        for adapter in &adapters {
            adapter.reset();
        }
        outcome?;

        Ok(event.into_result())
    }

    /// Bind `params` to one run of this chain, for code that takes an
    /// [`Adapter`].
    pub fn attempt(&self, params: LoginData) -> ChainAttempt<'_> {
        ChainAttempt { chain: self, params }
    }

    /// Tell every adapter the identity is being cleared.
    pub fn logout(&self) {
        for adapter in self.adapters() {
            adapter.logout();
        }
    }

    fn run(adapters: &[Arc<dyn ChainableAdapter>], event: &mut AdapterChainEvent) -> Result<(), AdapterError> {
        for adapter in adapters {
            tracing::trace!(adapter = adapter.name(), "running authentication adapter");
            if adapter.authenticate(event)? == AdapterOutcome::Stop {
                tracing::debug!(adapter = adapter.name(), code = ?event.code(), "adapter stopped the chain");
                break;
            }
        }
        Ok(())
    }
}

impl Adapter for AdapterChain {
    fn authenticate(&self) -> Result<AuthenticationResult, AdapterError> {
        self.authenticate_with(self.event_params())
    }
}

/// One login attempt against an [`AdapterChain`], see [`AdapterChain::attempt`].
#[derive(Debug)]
pub struct ChainAttempt<'a> {
    chain: &'a AdapterChain,
    params: LoginData,
}

impl ChainAttempt<'_> {
    pub fn params(&self) -> &LoginData {
        &self.params
    }
}

impl Adapter for ChainAttempt<'_> {
    fn authenticate(&self) -> Result<AuthenticationResult, AdapterError> {
        self.chain.authenticate_with(self.params.clone())
    }
}

impl core::fmt::Debug for AdapterChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let links = self.links.read().unwrap_or_else(PoisonError::into_inner);
        let adapters: Vec<(i32, &str)> = links.iter().map(|l| (l.priority, l.adapter.name())).collect();
        f.debug_struct("AdapterChain").field("adapters", &adapters).finish_non_exhaustive()
    }
}
