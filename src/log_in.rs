//! The log-in endpoint, which exchanges a username and password for a bearer
//! token.

use std::sync::{Arc, Mutex};

use axum::{Json, extract::FromRef, extract::State};
use jsonwebtoken::EncodingKey;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    Error,
    auth::create_token,
    state::AppState,
    user::get_user_by_username,
};

/// The state needed to log a user in.
#[derive(Clone)]
pub struct LogInState {
    /// The key used for signing bearer tokens.
    pub encoding_key: EncodingKey,
    /// How long issued tokens stay valid.
    pub token_duration: Duration,
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            encoding_key: state.encoding_key.clone(),
            token_duration: state.token_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The username and password submitted by the client.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// The name the user registered with.
    pub username: String,
    /// The user's password in plain text.
    pub password: String,
}

/// The response body for a successful log-in.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// A signed bearer token for use in the `Authorization` header.
    pub token: String,
}

/// Handler for log-in requests.
///
/// # Errors
/// Responds with 401 Unauthorized if the username is unknown or the password
/// does not match. The two cases are deliberately indistinguishable to the
/// client.
pub async fn post_log_in(
    State(state): State<LogInState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_username(&credentials.username, &connection)
            .map_err(|_| Error::InvalidCredentials)?
    };

    let password_matches = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_matches {
        return Err(Error::InvalidCredentials);
    }

    let token = create_token(user.id, state.token_duration, &state.encoding_key)?;

    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod log_in_tests {
    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};

    use crate::{
        password::PasswordHash,
        state::AppState,
        user::create_user,
    };

    use super::post_log_in;

    fn test_server() -> TestServer {
        let conn = Connection::open_in_memory().expect("Could not open in-memory database");
        let state = AppState::new(conn, "wow what a secret").expect("Could not create app state");

        {
            let conn = state.db_connection.lock().unwrap();
            let hash = PasswordHash::from_raw_password("correcthorsebatterystaple", 4)
                .expect("Could not hash password");
            create_user("alice", hash, &conn).expect("Could not create test user");
        }

        let app = Router::new()
            .route("/api/login", post(post_log_in))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server")
    }

    #[tokio::test]
    async fn log_in_with_valid_credentials_returns_token() {
        let server = test_server();

        let response = server
            .post("/api/login")
            .json(&json!({"username": "alice", "password": "correcthorsebatterystaple"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert!(
            !body["token"].as_str().unwrap_or_default().is_empty(),
            "response should contain a non-empty token"
        );
    }

    #[tokio::test]
    async fn log_in_with_wrong_password_is_unauthorized() {
        let server = test_server();

        let response = server
            .post("/api/login")
            .json(&json!({"username": "alice", "password": "wrong"}))
            .await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid username or password");
    }

    #[tokio::test]
    async fn log_in_with_unknown_user_is_unauthorized() {
        let server = test_server();

        let response = server
            .post("/api/login")
            .json(&json!({"username": "bob", "password": "correcthorsebatterystaple"}))
            .await;

        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid username or password");
    }
}
