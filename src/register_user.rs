//! The registration endpoint, which creates a new user account.

use std::sync::{Arc, Mutex};

use axum::{Json, extract::FromRef, extract::State, http::StatusCode};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error,
    password::PasswordHash,
    state::AppState,
    user::create_user,
};

/// The state needed to register a new user.
#[derive(Clone)]
pub struct RegistrationState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The username and password for the account to create.
#[derive(Debug, Deserialize)]
pub struct RegistrationForm {
    /// The name the user will log in with.
    pub username: String,
    /// The user's password in plain text.
    pub password: String,
}

/// Handler for registration requests.
///
/// # Errors
/// Responds with 400 Bad Request if the username is empty or already taken,
/// or if the password is too weak.
pub async fn post_register_user(
    State(state): State<RegistrationState>,
    Json(form): Json<RegistrationForm>,
) -> Result<StatusCode, Error> {
    if form.username.is_empty() {
        return Err(Error::EmptyUsername);
    }

    let password_hash = PasswordHash::from_raw_password(&form.password, PasswordHash::DEFAULT_COST)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    create_user(&form.username, password_hash, &connection)?;

    Ok(StatusCode::OK)
}
