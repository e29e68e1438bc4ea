//! Session context and provider
//!
//! The provider owns the application's single [`SessionManager`] and shares it
//! with descendants through a Yew context. It also listens for session
//! invalidation and either hands the event to `on_invalidated` or sends the
//! browser to the login page.

use super::error_messages::invalidation_message;
use crate::config::default_client_config;
use crate::storage::BrowserStorage;
use singularity_core::SessionInvalidated;
use singularity_http::{ClientConfig, SessionManager};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use yew::prelude::*;

/// Session data shared with components
#[derive(Clone)]
pub struct SessionContext {
    manager: Rc<SessionManager>,
    invalidated: Option<SessionInvalidated>,
}

impl PartialEq for SessionContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.manager, &other.manager) && self.invalidated == other.invalidated
    }
}

impl SessionContext {
    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    /// Most recent invalidation seen by the provider
    pub fn invalidated(&self) -> Option<SessionInvalidated> {
        self.invalidated
    }

    /// User-facing explanation of the last invalidation
    pub fn invalidation_message(&self) -> Option<&'static str> {
        self.invalidated.map(|event| invalidation_message(event.reason))
    }

    pub fn is_authenticated(&self) -> bool {
        self.manager.is_authenticated()
    }
}

/// Session provider props
#[derive(Properties, PartialEq)]
pub struct SessionProviderProps {
    /// Client settings, derived from the page origin when not given
    #[prop_or_default]
    pub config: Option<ClientConfig>,
    /// Called when the backend ends the session. Without it the provider
    /// navigates to the configured login path.
    #[prop_or_default]
    pub on_invalidated: Option<Callback<SessionInvalidated>>,
    pub children: Children,
}

fn build_manager(config: &ClientConfig) -> Result<Rc<SessionManager>, String> {
    SessionManager::new(config, Arc::new(BrowserStorage))
        .map(Rc::new)
        .map_err(|e| e.to_string())
}

fn redirect_to(path: &str) {
    if let Some(window) = web_sys::window()
        && let Err(e) = window.location().set_href(path)
    {
        tracing::warn!(?e, "Failed to navigate to login");
    }
}

/// Session provider component
#[function_component(SessionProvider)]
pub fn session_provider(props: &SessionProviderProps) -> Html {
    let config = use_memo(props.config.clone(), |config| {
        config.clone().unwrap_or_else(default_client_config)
    });
    let manager = use_memo(config.clone(), |config| build_manager(config));
    let invalidated = use_state(|| Option::<SessionInvalidated>::None);

    // Listen for invalidation events for as long as this manager is in use
    {
        let manager = manager.clone();
        let invalidated = invalidated.clone();
        let on_invalidated = props.on_invalidated.clone();
        let login_path = config.login_path.clone();

        use_effect_with(config.clone(), move |_| {
            let active = Rc::new(Cell::new(true));

            if let Ok(manager) = manager.as_ref() {
                let mut events = manager.subscribe();
                let active = active.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    loop {
                        let event = match events.recv().await {
                            Ok(event) => event,
                            Err(RecvError::Lagged(_)) => continue,
                            Err(RecvError::Closed) => break,
                        };
                        if !active.get() {
                            break;
                        }

                        tracing::info!(reason = ?event.reason, "Session invalidated");
                        invalidated.set(Some(event));
                        match &on_invalidated {
                            Some(callback) => callback.emit(event),
                            None => redirect_to(&login_path),
                        }
                    }
                });
            }

            move || active.set(false)
        });
    }

    match manager.as_ref() {
        Ok(manager) => {
            let context = SessionContext {
                manager: manager.clone(),
                invalidated: *invalidated,
            };
            html! {
                <ContextProvider<SessionContext> {context}>
                    {props.children.clone()}
                </ContextProvider<SessionContext>>
            }
        }
        Err(message) => {
            tracing::error!(%message, "Failed to create session manager");
            html! {
                <div class="session-error">{ format!("Unable to start the client: {message}") }</div>
            }
        }
    }
}

/// Hook to use the session context
#[hook]
pub fn use_session() -> SessionContext {
    use_context::<SessionContext>()
        .expect("SessionContext not found. Make sure to wrap your component with SessionProvider")
}

/// Hook to check if a session exists
#[hook]
pub fn use_is_authenticated() -> bool {
    let session = use_session();
    session.is_authenticated()
}
