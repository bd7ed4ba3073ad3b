//! Creating and verifying the signed bearer tokens used to authenticate API
//! requests.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{Error, user::UserID};

/// How long a bearer token stays valid after it is issued.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::days(7);

/// The claims encoded into a bearer token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// The ID of the user the token was issued to.
    sub: i64,
    /// The expiry time as a unix timestamp.
    exp: u64,
}

/// Create a signed bearer token for `user_id` that expires after `duration`.
///
/// # Errors
/// Returns [Error::TokenCreationError] if the token could not be signed.
pub fn create_token(
    user_id: UserID,
    duration: Duration,
    encoding_key: &EncodingKey,
) -> Result<String, Error> {
    let expiry = OffsetDateTime::now_utc() + duration;
    let claims = Claims {
        sub: user_id.as_i64(),
        exp: expiry.unix_timestamp() as u64,
    };

    encode(&Header::default(), &claims, encoding_key)
        .map_err(|error| Error::TokenCreationError(error.to_string()))
}

/// Verify a bearer token and extract the user ID it was issued to.
///
/// # Errors
/// Returns [Error::InvalidToken] if the token is malformed, was signed with a
/// different key, or has expired.
pub fn decode_token(token: &str, decoding_key: &DecodingKey) -> Result<UserID, Error> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|token_data| UserID::new(token_data.claims.sub))
        .map_err(|_| Error::InvalidToken)
}

#[cfg(test)]
mod token_tests {
    use jsonwebtoken::{DecodingKey, EncodingKey};
    use time::Duration;

    use crate::{Error, user::UserID};

    use super::{create_token, decode_token};

    const SECRET: &str = "test signing secret";

    fn test_keys() -> (EncodingKey, DecodingKey) {
        (
            EncodingKey::from_secret(SECRET.as_ref()),
            DecodingKey::from_secret(SECRET.as_ref()),
        )
    }

    #[test]
    fn decode_returns_user_id_from_valid_token() {
        let (encoding_key, decoding_key) = test_keys();
        let user_id = UserID::new(42);

        let token = create_token(user_id, Duration::days(1), &encoding_key)
            .expect("Could not create token");
        let decoded = decode_token(&token, &decoding_key).expect("Could not decode token");

        assert_eq!(decoded, user_id);
    }

    #[test]
    fn decode_fails_on_expired_token() {
        let (encoding_key, decoding_key) = test_keys();

        // The expiry needs to exceed the decoder's 60 second leeway.
        let token = create_token(UserID::new(42), Duration::minutes(-5), &encoding_key)
            .expect("Could not create token");
        let result = decode_token(&token, &decoding_key);

        assert_eq!(result, Err(Error::InvalidToken));
    }

    #[test]
    fn decode_fails_on_wrong_key() {
        let (encoding_key, _) = test_keys();
        let wrong_key = DecodingKey::from_secret("a different secret".as_ref());

        let token = create_token(UserID::new(42), Duration::days(1), &encoding_key)
            .expect("Could not create token");
        let result = decode_token(&token, &wrong_key);

        assert_eq!(result, Err(Error::InvalidToken));
    }

    #[test]
    fn decode_fails_on_garbage() {
        let (_, decoding_key) = test_keys();

        let result = decode_token("not.a.token", &decoding_key);

        assert_eq!(result, Err(Error::InvalidToken));
    }
}
