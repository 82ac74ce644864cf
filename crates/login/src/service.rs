//! Login/logout orchestration.

use std::sync::Arc;

use loginkit_auth::{AdapterChain, AuthenticationResult, AuthenticationService, NonPersistentStorage, Storage};
use loginkit_core::{Identity, LoginData, ModuleOptions};
use loginkit_events::EventManager;

use crate::{Form, LoginError, LoginEvent, LoginForm};

/// Identifier every login service's event manager carries, so shared
/// listeners can target login services without naming the concrete type.
pub const IDENTIFIER: &str = "LoginService";

/// Logs users in and out.
///
/// A thin façade: login data goes to the adapter chain, the authentication
/// service runs the chain and keeps the identity, and the event manager
/// brackets both operations with `pre.*`/`post.*` events.
///
/// Nothing is caught or translated here. A failing listener or adapter
/// aborts the operation and its error is returned as-is; in particular a
/// `pre.login` listener error means authentication never runs.
///
/// All collaborators are held behind `Arc`; the accessors return the very
/// instance that was supplied.
pub struct LoginService<F = LoginForm, S = NonPersistentStorage> {
    form: F,
    options: Arc<ModuleOptions>,
    adapter_chain: Arc<AdapterChain>,
    authentication_service: Arc<AuthenticationService<S>>,
    event_manager: Arc<EventManager<LoginEvent>>,
}

impl<F: Form> LoginService<F, NonPersistentStorage> {
    /// Start wiring a service; collaborators not supplied get defaults.
    pub fn builder(form: F, options: impl Into<Arc<ModuleOptions>>) -> LoginServiceBuilder<F> {
        LoginServiceBuilder::new(form, options)
    }
}

impl<F: Form, S: Storage> LoginService<F, S> {
    /// Fully explicit wiring.
    pub fn new(
        form: F,
        options: impl Into<Arc<ModuleOptions>>,
        adapter_chain: Arc<AdapterChain>,
        authentication_service: Arc<AuthenticationService<S>>,
        event_manager: Arc<EventManager<LoginEvent>>,
    ) -> Self {
        Self::tag(&event_manager);
        Self {
            form,
            options: options.into(),
            adapter_chain,
            authentication_service,
            event_manager,
        }
    }

    /// Log in with `data`, passed verbatim to listeners and adapters.
    ///
    /// `data` travels with this call only, so services sharing one adapter
    /// chain may log in concurrently.
    ///
    /// Rejected credentials are an `Ok` result with a failure code.
    pub fn login(&self, data: LoginData) -> Result<AuthenticationResult, LoginError> {
        tracing::debug!(params = data.len(), "login requested");

        self.event_manager.trigger(&LoginEvent::pre_login(data.clone()))?;

        let attempt = self.adapter_chain.attempt(data);
        let result = self.authentication_service.authenticate(&attempt)?;

        tracing::info!(
            code = %result.code(),
            user_id = ?result.identity().map(Identity::user_id),
            "login attempt finished"
        );

        self.event_manager.trigger(&LoginEvent::post_login(result.clone()))?;

        Ok(result)
    }

    /// Clear the authenticated identity. Safe to call with nobody logged in.
    pub fn logout(&self) -> Result<(), LoginError> {
        self.event_manager.trigger(&LoginEvent::pre_logout())?;

        self.adapter_chain.logout();
        self.authentication_service.clear_identity();
        tracing::info!("identity cleared");

        self.event_manager.trigger(&LoginEvent::post_logout())?;
        Ok(())
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn options(&self) -> &Arc<ModuleOptions> {
        &self.options
    }

    pub fn adapter_chain(&self) -> &Arc<AdapterChain> {
        &self.adapter_chain
    }

    pub fn set_adapter_chain(&mut self, adapter_chain: Arc<AdapterChain>) -> &mut Self {
        self.adapter_chain = adapter_chain;
        self
    }

    pub fn authentication_service(&self) -> &Arc<AuthenticationService<S>> {
        &self.authentication_service
    }

    pub fn set_authentication_service(&mut self, authentication_service: Arc<AuthenticationService<S>>) -> &mut Self {
        self.authentication_service = authentication_service;
        self
    }

    pub fn event_manager(&self) -> &Arc<EventManager<LoginEvent>> {
        &self.event_manager
    }

    /// Attach `event_manager`, tagging it with this service's identifiers.
    pub fn set_event_manager(&mut self, event_manager: Arc<EventManager<LoginEvent>>) -> &mut Self {
        Self::tag(&event_manager);
        self.event_manager = event_manager;
        self
    }

    /// `[IDENTIFIER, <concrete type name>]`.
    pub fn identifiers() -> [&'static str; 2] {
        [IDENTIFIER, std::any::type_name::<Self>()]
    }

    fn tag(event_manager: &EventManager<LoginEvent>) {
        event_manager.set_identifiers(Self::identifiers());
    }
}

impl<F, S> core::fmt::Debug for LoginService<F, S>
where
    F: core::fmt::Debug,
    S: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginService")
            .field("form", &self.form)
            .field("options", &self.options)
            .field("adapter_chain", &self.adapter_chain)
            .field("authentication_service", &self.authentication_service)
            .field("event_manager", &self.event_manager)
            .finish()
    }
}

/// Wires a [`LoginService`], filling unset collaborators with defaults at
/// [`build`](Self::build) time: an empty adapter chain, a non-persistent
/// authentication service, and a fresh event manager.
pub struct LoginServiceBuilder<F, S = NonPersistentStorage> {
    form: F,
    options: Arc<ModuleOptions>,
    adapter_chain: Option<Arc<AdapterChain>>,
    authentication_service: Option<Arc<AuthenticationService<S>>>,
    event_manager: Option<Arc<EventManager<LoginEvent>>>,
}

impl<F: Form> LoginServiceBuilder<F> {
    pub fn new(form: F, options: impl Into<Arc<ModuleOptions>>) -> Self {
        Self {
            form,
            options: options.into(),
            adapter_chain: None,
            authentication_service: None,
            event_manager: None,
        }
    }
}

impl<F: Form, S: Storage + Default> LoginServiceBuilder<F, S> {
    pub fn adapter_chain(mut self, adapter_chain: Arc<AdapterChain>) -> Self {
        self.adapter_chain = Some(adapter_chain);
        self
    }

    /// Supply the authentication service (and with it, the storage type).
    pub fn authentication_service<T: Storage + Default>(
        self,
        authentication_service: Arc<AuthenticationService<T>>,
    ) -> LoginServiceBuilder<F, T> {
        LoginServiceBuilder {
            form: self.form,
            options: self.options,
            adapter_chain: self.adapter_chain,
            authentication_service: Some(authentication_service),
            event_manager: self.event_manager,
        }
    }

    pub fn event_manager(mut self, event_manager: Arc<EventManager<LoginEvent>>) -> Self {
        self.event_manager = Some(event_manager);
        self
    }

    pub fn build(self) -> LoginService<F, S> {
        LoginService::new(
            self.form,
            self.options,
            self.adapter_chain.unwrap_or_default(),
            self.authentication_service.unwrap_or_default(),
            self.event_manager.unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loginkit_auth::{AdapterChainEvent, AdapterError, AdapterOutcome, ChainableAdapter, ResultCode};
    use loginkit_core::UserId;
    use loginkit_events::{Event as _, ListenerError, SharedEventManager, WILDCARD};
    use proptest::prelude::*;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Accepts any attempt carrying an `identity` param; records what it saw.
    struct Recording {
        log: Log,
        seen: Mutex<Vec<LoginData>>,
    }

    impl ChainableAdapter for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn authenticate(&self, event: &mut AdapterChainEvent) -> Result<AdapterOutcome, AdapterError> {
            self.log.lock().unwrap().push("authenticate".to_string());
            self.seen.lock().unwrap().push(event.params().clone());
            match event.param_str("identity") {
                Some("offline") => Err(AdapterError::store("offline")),
                Some(login) => {
                    let login = login.to_string();
                    event.succeed(Identity::new(UserId::new(), login), "ok");
                    Ok(AdapterOutcome::Stop)
                }
                None => Ok(AdapterOutcome::Continue),
            }
        }

        fn logout(&self) {
            self.log.lock().unwrap().push("adapter logout".to_string());
        }
    }

    struct Harness {
        service: LoginService,
        log: Log,
        adapter: Arc<Recording>,
        events: Arc<Mutex<Vec<LoginEvent>>>,
    }

    fn harness() -> Harness {
        let log: Log = Arc::default();
        let adapter = Arc::new(Recording {
            log: Arc::clone(&log),
            seen: Mutex::default(),
        });
        let chain = Arc::new(AdapterChain::new());
        chain.attach(1, Arc::clone(&adapter) as Arc<dyn ChainableAdapter>);

        let service = LoginService::builder(LoginForm::default(), ModuleOptions::default())
            .adapter_chain(chain)
            .build();

        let events: Arc<Mutex<Vec<LoginEvent>>> = Arc::default();
        {
            let log = Arc::clone(&log);
            let events = Arc::clone(&events);
            service.event_manager().attach(WILDCARD, move |event: &LoginEvent| {
                log.lock().unwrap().push(event.name().to_string());
                events.lock().unwrap().push(event.clone());
                Ok(())
            });
        }

        Harness {
            service,
            log,
            adapter,
            events,
        }
    }

    fn data(value: Value) -> LoginData {
        value.as_object().cloned().unwrap()
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn builder_fills_missing_collaborators_with_defaults() {
        let service = LoginService::builder(LoginForm::default(), ModuleOptions::default()).build();

        assert!(service.adapter_chain().adapters().is_empty());
        assert!(!service.authentication_service().has_identity());
        assert_eq!(service.event_manager().identifiers()[0], IDENTIFIER);
    }

    #[test]
    fn accessors_return_the_supplied_instances() {
        let chain = Arc::new(AdapterChain::new());
        let auth = Arc::new(AuthenticationService::new(NonPersistentStorage::new()));
        let events = Arc::new(EventManager::new());
        let options = Arc::new(ModuleOptions::default());

        let service = LoginService::builder(LoginForm::default(), Arc::clone(&options))
            .adapter_chain(Arc::clone(&chain))
            .authentication_service(Arc::clone(&auth))
            .event_manager(Arc::clone(&events))
            .build();

        assert!(Arc::ptr_eq(service.adapter_chain(), &chain));
        assert!(Arc::ptr_eq(service.authentication_service(), &auth));
        assert!(Arc::ptr_eq(service.event_manager(), &events));
        assert!(Arc::ptr_eq(service.options(), &options));
    }

    #[test]
    fn setters_replace_collaborators() {
        let mut service = LoginService::builder(LoginForm::default(), ModuleOptions::default()).build();
        let chain = Arc::new(AdapterChain::new());
        let auth = Arc::new(AuthenticationService::default());
        let events = Arc::new(EventManager::new());

        service
            .set_adapter_chain(Arc::clone(&chain))
            .set_authentication_service(Arc::clone(&auth))
            .set_event_manager(Arc::clone(&events));

        assert!(Arc::ptr_eq(service.adapter_chain(), &chain));
        assert!(Arc::ptr_eq(service.authentication_service(), &auth));
        assert!(Arc::ptr_eq(service.event_manager(), &events));
    }

    #[test]
    fn attached_event_manager_is_tagged_with_service_identity() {
        let mut service = LoginService::builder(LoginForm::default(), ModuleOptions::default()).build();
        let events = Arc::new(EventManager::with_identifiers(["previous"]));

        service.set_event_manager(Arc::clone(&events));

        let ids = events.identifiers();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], IDENTIFIER);
        assert!(ids[1].contains("LoginService"));
    }

    #[test]
    fn shared_listeners_scoped_to_login_services_fire() {
        let shared = Arc::new(SharedEventManager::new());
        let hits = Arc::new(Mutex::new(0));
        {
            let hits = Arc::clone(&hits);
            shared.attach(IDENTIFIER, "pre.logout", move |_: &LoginEvent| {
                *hits.lock().unwrap() += 1;
                Ok(())
            });
        }

        let service = LoginService::builder(LoginForm::default(), ModuleOptions::default()).build();
        service.event_manager().set_shared_manager(shared);

        service.logout().unwrap();

        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn login_brackets_authentication_with_events() {
        let h = harness();
        let input = data(json!({ "identity": "ada@example.com", "credential": "analytical" }));

        let result = h.service.login(input.clone()).unwrap();

        assert!(result.is_valid());
        assert_eq!(entries(&h.log), vec!["pre.login", "authenticate", "post.login"]);

        let events = h.events.lock().unwrap();
        assert_eq!(events[0].data(), Some(&input));
        assert_eq!(events[1].result(), Some(&result));
        assert_eq!(h.adapter.seen.lock().unwrap()[0], input);
        assert_eq!(
            h.service.authentication_service().identity().as_ref(),
            result.identity()
        );
    }

    #[test]
    fn rejected_login_is_a_result_not_an_error() {
        let h = harness();

        let result = h.service.login(data(json!({ "credential": "x" }))).unwrap();

        assert_eq!(result.code(), ResultCode::FailureUncategorized);
        assert!(!h.service.authentication_service().has_identity());
        assert_eq!(entries(&h.log), vec!["pre.login", "authenticate", "post.login"]);
    }

    #[test]
    fn failing_pre_login_listener_aborts_before_authentication() {
        let h = harness();
        h.service
            .event_manager()
            .attach_with_priority("pre.login", 100, |_: &LoginEvent| Err(ListenerError::failed("locked out")));

        let err = h.service.login(data(json!({ "identity": "ada" }))).unwrap_err();

        assert_eq!(err, LoginError::Listener(ListenerError::failed("locked out")));
        assert!(entries(&h.log).is_empty());
        assert!(h.adapter.seen.lock().unwrap().is_empty());
        assert!(!h.service.authentication_service().has_identity());
    }

    #[test]
    fn failing_post_login_listener_propagates_after_authentication() {
        let h = harness();
        h.service
            .event_manager()
            .attach("post.login", |_: &LoginEvent| Err(ListenerError::failed("audit down")));

        let err = h.service.login(data(json!({ "identity": "ada" }))).unwrap_err();

        assert!(matches!(err, LoginError::Listener(_)));
        assert!(h.service.authentication_service().has_identity());
    }

    #[test]
    fn adapter_error_propagates_and_skips_post_login() {
        let h = harness();

        let err = h.service.login(data(json!({ "identity": "offline" }))).unwrap_err();

        assert_eq!(err, LoginError::Adapter(AdapterError::store("offline")));
        assert_eq!(entries(&h.log), vec!["pre.login", "authenticate"]);
    }

    #[test]
    fn logout_clears_identity_between_pre_and_post_events() {
        let h = harness();
        h.service.login(data(json!({ "identity": "ada" }))).unwrap();

        let states: Arc<Mutex<Vec<(String, bool)>>> = Arc::default();
        {
            let states = Arc::clone(&states);
            let auth = Arc::clone(h.service.authentication_service());
            h.service.event_manager().attach(WILDCARD, move |event: &LoginEvent| {
                states
                    .lock()
                    .unwrap()
                    .push((event.name().to_string(), auth.has_identity()));
                Ok(())
            });
        }
        h.log.lock().unwrap().clear();

        h.service.logout().unwrap();

        assert_eq!(entries(&h.log), vec!["pre.logout", "adapter logout", "post.logout"]);
        assert_eq!(
            *states.lock().unwrap(),
            vec![("pre.logout".to_string(), true), ("post.logout".to_string(), false)]
        );
    }

    #[test]
    fn logout_without_identity_still_fires_both_events() {
        let h = harness();

        h.service.logout().unwrap();
        h.service.logout().unwrap();

        assert_eq!(
            entries(&h.log),
            vec![
                "pre.logout",
                "adapter logout",
                "post.logout",
                "pre.logout",
                "adapter logout",
                "post.logout"
            ]
        );
    }

    #[test]
    fn subscribers_observe_the_lifecycle() {
        let h = harness();
        let subscription = h.service.event_manager().subscribe();

        h.service.login(data(json!({ "identity": "ada" }))).unwrap();
        h.service.logout().unwrap();

        let names: Vec<&str> = subscription.drain().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["pre.login", "post.login", "pre.logout", "post.logout"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: for any login data, pre.login fires exactly once before the
        /// adapters run and post.login exactly once after, with the data and the
        /// result as their payloads.
        #[test]
        fn login_fires_pre_and_post_exactly_once(
            fields in prop::collection::btree_map("[a-z]{1,8}", "[ -~]{0,12}", 0..6)
        ) {
            let h = harness();
            let input: LoginData = fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();

            let result = h.service.login(input.clone()).unwrap_or_else(|e| {
                // Only the "offline" identity makes the adapter fail.
                assert_eq!(input.get("identity"), Some(&json!("offline")), "{e}");
                AuthenticationResult::failure(ResultCode::Failure, "offline")
            });

            let log = entries(&h.log);
            prop_assert_eq!(log.first().map(String::as_str), Some("pre.login"));
            prop_assert_eq!(log.iter().filter(|e| *e == "pre.login").count(), 1);
            prop_assert_eq!(log.iter().filter(|e| *e == "authenticate").count(), 1);

            let events = h.events.lock().unwrap();
            prop_assert_eq!(events[0].data(), Some(&input));
            if result.code() != ResultCode::Failure {
                prop_assert_eq!(log.as_slice(), ["pre.login", "authenticate", "post.login"].as_slice());
                prop_assert_eq!(events.len(), 2);
                prop_assert_eq!(events[1].result(), Some(&result));
            }
        }
    }
}
