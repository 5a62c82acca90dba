use contracts::shared::provider::AuthContext;
use leptos::prelude::*;

use super::{api, storage};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub access_token: Option<String>,
    pub username: Option<String>,
    /// Сервер ответил 401: без входа работать нельзя
    pub login_required: bool,
}

impl AuthState {
    /// Сессия для провайдера данных
    pub fn context(&self) -> AuthContext {
        AuthContext {
            access_token: self.access_token.clone(),
        }
    }

    pub fn needs_login(&self) -> bool {
        self.login_required && self.access_token.is_none()
    }
}

/// Auth context provider component
#[component]
pub fn AuthProvider(children: Children) -> impl IntoView {
    let auth_state = RwSignal::new(AuthState {
        access_token: storage::get_access_token(),
        username: storage::get_username(),
        login_required: false,
    });

    provide_context(auth_state);

    children()
}

/// Hook to access auth state
pub fn use_auth() -> RwSignal<AuthState> {
    use_context::<RwSignal<AuthState>>().unwrap_or_else(|| {
        log::error!("AuthProvider not found in component tree");
        RwSignal::new(AuthState::default())
    })
}

/// Perform login and store the session
pub async fn do_login(
    auth: RwSignal<AuthState>,
    username: String,
    password: String,
) -> Result<(), String> {
    let response = api::login(username, password).await?;
    storage::save_session(&response.access_token, &response.username);
    log::info!("Signed in as {}", response.username);
    auth.set(AuthState {
        access_token: Some(response.access_token),
        username: Some(response.username),
        login_required: true,
    });
    Ok(())
}

/// Session expired or logout: forget the token and ask for login
pub fn sign_out(auth: RwSignal<AuthState>) {
    storage::clear_session();
    auth.set(AuthState {
        access_token: None,
        username: None,
        login_required: true,
    });
}
