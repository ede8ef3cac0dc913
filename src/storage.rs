use serde::de::DeserializeOwned;
use serde::Serialize;
use crate::error::{Error, Result};
use crate::types::{AuthSession, Combination};

const AUTH_SESSION_KEY: &str = "kiai_auth_session";
const LOCAL_COMBINATIONS_KEY: &str = "kiai_local_combinations";
const AUTO_REFRESH_KEY: &str = "kiai_auto_refresh";

pub fn get_local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

pub fn save_json<T: Serialize>(key: &str, value: &T) -> Result<()> {
    let storage = get_local_storage().ok_or_else(|| Error::Storage("No localStorage".into()))?;
    let json = serde_json::to_string(value)?;
    storage
        .set_item(key, &json)
        .map_err(|_| Error::Storage(format!("Failed to save {}", key)))
}

pub fn load_json<T: DeserializeOwned>(key: &str) -> Option<T> {
    let storage = get_local_storage()?;
    let json = storage.get_item(key).ok()??;
    match serde_json::from_str(&json) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("discarding unreadable {}: {}", key, e);
            None
        }
    }
}

pub fn remove(key: &str) {
    if let Some(storage) = get_local_storage() {
        let _ = storage.remove_item(key);
    }
}

/// Saves are best effort: a failure is logged and reported as false.
pub fn log_save_failure(what: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("could not save {}: {}", what, e);
            false
        }
    }
}

// Auth session

pub fn save_auth_session(session: &AuthSession) {
    log_save_failure("auth session", save_json(AUTH_SESSION_KEY, session));
}

pub fn load_auth_session() -> Option<AuthSession> {
    load_json(AUTH_SESSION_KEY)
}

pub fn clear_auth_session() {
    remove(AUTH_SESSION_KEY);
}

// Combinations that never reached the backend, kept per user

pub fn local_combinations_key(user_id: &str) -> String {
    format!("{}:{}", LOCAL_COMBINATIONS_KEY, user_id)
}

pub fn load_local_combinations(user_id: &str) -> Vec<Combination> {
    load_json(&local_combinations_key(user_id)).unwrap_or_default()
}

pub fn cache_local_combination(user_id: &str, combination: &Combination) {
    let mut cached = load_local_combinations(user_id);
    if cached.iter().any(|c| c.combination_id == combination.combination_id) {
        return;
    }
    cached.push(combination.clone());
    log_save_failure("local combination", save_json(&local_combinations_key(user_id), &cached));
}

// Dashboard preferences

pub fn load_auto_refresh() -> bool {
    load_json(AUTO_REFRESH_KEY).unwrap_or(true)
}

pub fn save_auto_refresh(enabled: bool) {
    log_save_failure("auto refresh preference", save_json(AUTO_REFRESH_KEY, &enabled));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination_cache_is_per_user() {
        assert_eq!(local_combinations_key("u1"), "kiai_local_combinations:u1");
        assert_ne!(local_combinations_key("u1"), local_combinations_key("u2"));
    }

    #[test]
    fn failed_saves_are_reported() {
        assert!(log_save_failure("flag", Ok(())));
        assert!(!log_save_failure("flag", Err(Error::Storage("No localStorage".into()))));
    }
}
