//! The user model and its database queries.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, password::PasswordHash};

/// The ID of a [User].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    ///
    /// The caller should ensure that the ID refers to a user that exists in
    /// the database.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The integer value of the user ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The ID of the user.
    pub id: UserID,
    /// The name the user logs in with.
    pub username: String,
    /// The hash of the user's password.
    pub password_hash: PasswordHash,
}

/// Create the user table in the database.
///
/// # Errors
/// Returns an [Error::SqlError] if there was an unexpected SQL error.
pub fn create_user_table(connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            username TEXT UNIQUE NOT NULL,
            password TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Create a new user in the database.
///
/// # Errors
/// Returns an error if:
/// - `username` is empty ([Error::EmptyUsername]),
/// - `username` is already taken ([Error::DuplicateUsername]),
/// - or there was an unexpected SQL error ([Error::SqlError]).
pub fn create_user(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    if username.is_empty() {
        return Err(Error::EmptyUsername);
    }

    connection.execute(
        "INSERT INTO user (username, password) VALUES (?1, ?2)",
        (username, password_hash.as_str()),
    )?;

    let id = connection.last_insert_rowid();

    Ok(User {
        id: UserID::new(id),
        username: username.to_owned(),
        password_hash,
    })
}

/// Retrieve the user with the given `username` from the database.
///
/// # Errors
/// Returns [Error::NotFound] if there is no user with that username, or
/// [Error::SqlError] if there was an unexpected SQL error.
pub fn get_user_by_username(username: &str, connection: &Connection) -> Result<User, Error> {
    let user = connection
        .prepare("SELECT id, username, password FROM user WHERE username = ?1")?
        .query_row([username], |row| {
            let raw_hash: String = row.get(2)?;

            Ok(User {
                id: UserID::new(row.get(0)?),
                username: row.get(1)?,
                password_hash: PasswordHash::new_unchecked(&raw_hash),
            })
        })?;

    Ok(user)
}
