//! Saving and loading the dark mode preference.

use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    AppState, Error, endpoints,
    storage::{DARK_MODE_KEY, KeyValueStore},
};

/// The state needed to change display preferences.
#[derive(Debug, Clone)]
pub struct PreferencesState {
    pub storage: Arc<dyn KeyValueStore>,
}

impl FromRef<AppState> for PreferencesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            storage: state.storage.clone(),
        }
    }
}

/// Whether dark mode is turned on.
///
/// A missing or unreadable preference is treated as off.
pub fn load_dark_mode(storage: &dyn KeyValueStore) -> bool {
    match storage.get(DARK_MODE_KEY) {
        Ok(Some(value)) => serde_json::from_str(&value).unwrap_or_else(|error| {
            tracing::warn!("Ignoring unreadable dark mode preference {value:?}: {error}");
            false
        }),
        Ok(None) => false,
        Err(error) => {
            tracing::error!("Could not load dark mode preference: {error}");
            false
        }
    }
}

/// Save whether dark mode is turned on.
///
/// # Errors
///
/// Returns an error if the preference could not be written to `storage`.
pub fn save_dark_mode(storage: &dyn KeyValueStore, dark_mode: bool) -> Result<(), Error> {
    let value = serde_json::to_string(&dark_mode)?;
    storage.set(DARK_MODE_KEY, &value)
}

/// A route handler that switches between light and dark mode and reloads the dashboard.
pub async fn toggle_dark_mode_endpoint(State(state): State<PreferencesState>) -> Response {
    let dark_mode = !load_dark_mode(state.storage.as_ref());

    if let Err(error) = save_dark_mode(state.storage.as_ref(), dark_mode) {
        tracing::error!("Could not save dark mode preference: {error}");
        return error.into_alert_response();
    }

    tracing::debug!("Set dark mode to {dark_mode}");

    (HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()), StatusCode::OK).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode};

    use super::{PreferencesState, load_dark_mode, save_dark_mode, toggle_dark_mode_endpoint};
    use crate::{
        endpoints,
        storage::{
            DARK_MODE_KEY, KeyValueStore,
            test_stores::{FailingStore, MemoryStore},
        },
        test_utils::assert_hx_redirect,
    };

    #[test]
    fn missing_preference_is_light_mode() {
        assert!(!load_dark_mode(&MemoryStore::default()));
    }

    #[test]
    fn unreadable_preference_is_light_mode() {
        let storage = MemoryStore::with_value(DARK_MODE_KEY, "yes please");

        assert!(!load_dark_mode(&storage));
    }

    #[test]
    fn saved_preference_is_loaded() {
        let storage = MemoryStore::default();

        save_dark_mode(&storage, true).unwrap();

        assert_eq!(storage.get(DARK_MODE_KEY), Ok(Some("true".to_owned())));
        assert!(load_dark_mode(&storage));
    }

    #[tokio::test]
    async fn toggle_flips_preference_and_redirects() {
        let storage = Arc::new(MemoryStore::default());
        let state = PreferencesState {
            storage: storage.clone(),
        };

        let response = toggle_dark_mode_endpoint(State(state.clone())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        assert!(load_dark_mode(storage.as_ref()));

        toggle_dark_mode_endpoint(State(state)).await;

        assert!(!load_dark_mode(storage.as_ref()));
    }

    #[tokio::test]
    async fn toggle_reports_failed_save() {
        let state = PreferencesState {
            storage: Arc::new(FailingStore),
        };

        let response = toggle_dark_mode_endpoint(State(state)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
