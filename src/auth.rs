//! Sign-up, sign-in and session validation.

use crate::api::{Backend, SignUpRequest};
use crate::error::{Error, Result};
use crate::storage;
use crate::types::{AuthSession, UserRole};

pub const MIN_PASSWORD_LEN: usize = 6;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Implicit-flow URL returning an `id_token` in the fragment.
/// `redirect_uri` must already be URI-encoded.
pub fn google_sign_in_url(client_id: &str, redirect_uri: &str, nonce: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=id_token&scope=openid%20email%20profile&nonce={}",
        GOOGLE_AUTH_URL, client_id, redirect_uri, nonce
    )
}

/// Pull `id_token` out of a `#a=b&id_token=...` fragment.
pub fn credential_from_fragment(fragment: &str) -> Option<String> {
    fragment
        .trim_start_matches('#')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "id_token")
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Message shown for a failed auth call.
pub fn auth_error_message(err: &Error) -> String {
    match err {
        Error::Http { status: 401 | 404, .. } => "Invalid email or password".to_string(),
        Error::Http { message, .. } if !message.is_empty() => message.clone(),
        Error::Auth(msg) | Error::InvalidInput(msg) => msg.clone(),
        Error::Network(_) => "Could not reach the dojo server. Try again.".to_string(),
        _ => "Something went wrong. Try again.".to_string(),
    }
}

pub fn validate_registration(name: &str, email: &str, password: &str, confirm: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("Please enter your name".into()));
    }
    if !email.contains('@') {
        return Err(Error::InvalidInput("Please enter a valid email".into()));
    }
    if password != confirm {
        return Err(Error::InvalidInput("Passwords do not match".into()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(Error::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

pub async fn sign_up<B: Backend>(
    backend: &B,
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
    role: UserRole,
) -> Result<AuthSession> {
    validate_registration(name, email, password, confirm)?;
    let request = SignUpRequest {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        password: password.to_string(),
        role,
    };
    let session = backend.sign_up(&request).await.map_err(|e| Error::Auth(auth_error_message(&e)))?;
    storage::save_auth_session(&session);
    Ok(session)
}

pub async fn sign_in<B: Backend>(backend: &B, email: &str, password: &str) -> Result<AuthSession> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(Error::Auth("Enter your email and password".into()));
    }
    let session = backend
        .sign_in(email.trim(), password)
        .await
        .map_err(|e| Error::Auth(auth_error_message(&e)))?;
    storage::save_auth_session(&session);
    Ok(session)
}

pub async fn sign_in_with_google<B: Backend>(backend: &B, credential: &str) -> Result<AuthSession> {
    let session = backend
        .sign_in_with_google(credential)
        .await
        .map_err(|e| Error::Auth(auth_error_message(&e)))?;
    storage::save_auth_session(&session);
    Ok(session)
}

/// Check a stored session with the backend. An invalid token clears it;
/// an unreachable backend keeps it so the app still works offline.
pub async fn restore_session<B: Backend>(backend: &B, stored: Option<AuthSession>) -> Option<AuthSession> {
    let mut session = stored?;
    match backend.validate(&session.token).await {
        Ok(user) => {
            session.user = user;
            storage::save_auth_session(&session);
            Some(session)
        }
        Err(Error::Http { status: 401 | 403, .. }) => {
            tracing::info!("stored session expired");
            storage::clear_auth_session();
            None
        }
        Err(e) => {
            tracing::warn!("could not validate session, keeping it: {}", e);
            Some(session)
        }
    }
}

/// Local sign-out always succeeds; the server call is best effort.
pub async fn sign_out<B: Backend>(backend: &B, session: Option<AuthSession>) {
    storage::clear_auth_session();
    if let Some(session) = session {
        if let Err(e) = backend.sign_out(&session.token).await {
            tracing::warn!("sign out not acknowledged: {}", e);
        }
    }
}
