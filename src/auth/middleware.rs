//! Middleware that guards routes behind bearer token authentication.

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::DecodingKey;

use crate::{Error, state::AppState, user::UserID};

use super::token::decode_token;

/// The state needed to verify bearer tokens.
#[derive(Clone)]
pub struct AuthState {
    /// The key used for verifying bearer tokens.
    pub decoding_key: DecodingKey,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            decoding_key: state.decoding_key.clone(),
        }
    }
}

/// Middleware that rejects requests without a valid bearer token.
///
/// On success, the [UserID] the token was issued to is inserted into the
/// request extensions so that handlers can scope queries to that user.
///
/// # Errors
/// Responds with 401 Unauthorized if the `Authorization` header is missing,
/// is not a bearer token, or the token fails verification.
pub async fn auth_guard(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Result<Response, Error> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| Error::InvalidToken)?;

    let user_id = decode_token(bearer.token(), &state.decoding_key)?;

    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(user_id);

    Ok(next.run(request).await)
}
