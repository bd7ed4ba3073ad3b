//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;
use time::Duration;

use crate::{Error, auth::DEFAULT_TOKEN_DURATION, db::initialize};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key used for signing bearer tokens.
    pub encoding_key: EncodingKey,

    /// The key used for verifying bearer tokens.
    pub decoding_key: DecodingKey,

    /// The duration for which bearer tokens are valid.
    pub token_duration: Duration,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the
    /// domain models. `secret` is used to derive the token signing keys.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, secret: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            token_duration: DEFAULT_TOKEN_DURATION,
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
