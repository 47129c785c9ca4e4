//! Google ID token verification.
//!
//! This is the external identity-provider collaborator: it turns a raw ID
//! token into a [`VerifiedIdentity`]. Everything downstream
//! ([`crate::services::auth::AuthService::login_with_google`]) consumes the
//! verified assertion and never sees the token.

use serde::Deserialize;
use thiserror::Error;

/// Google tokeninfo endpoint.
const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Errors that can occur while verifying a Google ID token.
#[derive(Debug, Error)]
pub enum GoogleAuthError {
    /// The provider rejected the token (expired, malformed, revoked).
    #[error("identity provider rejected the token")]
    Rejected,

    /// The token was issued for a different OAuth client.
    #[error("token audience does not match this application")]
    AudienceMismatch,

    /// The token payload is missing required claims.
    #[error("token payload missing claim: {0}")]
    MissingClaim(&'static str),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// A cryptographically verified external identity assertion.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Verified email address.
    pub email: String,
    /// Display name, falling back to the email when the provider sends none.
    pub name: String,
    /// Avatar URL, if the provider has one.
    pub picture: Option<String>,
    /// The provider's stable subject ID (`sub` claim).
    pub subject: String,
}

/// Claims returned by the tokeninfo endpoint. Only what we consume.
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Verifier for Google ID tokens.
#[derive(Clone)]
pub struct GoogleVerifier {
    client: reqwest::Client,
    client_id: String,
    endpoint: String,
}

impl GoogleVerifier {
    /// Create a new verifier for the given OAuth client ID.
    #[must_use]
    pub fn new(client_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.to_owned(),
            endpoint: TOKENINFO_URL.to_owned(),
        }
    }

    /// Point the verifier at a different endpoint (tests).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_owned();
        self
    }

    /// Verify an ID token and extract the identity it asserts.
    ///
    /// # Errors
    ///
    /// Returns `GoogleAuthError::Rejected` if the provider refuses the
    /// token, `AudienceMismatch` if it was issued for another client, and
    /// `MissingClaim` if the payload lacks an email.
    pub async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, GoogleAuthError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleAuthError::Rejected);
        }

        let info: TokenInfo = response.json().await?;
        identity_from_claims(info, &self.client_id)
    }
}

/// Check the audience and assemble the verified identity.
fn identity_from_claims(
    info: TokenInfo,
    client_id: &str,
) -> Result<VerifiedIdentity, GoogleAuthError> {
    if info.aud != client_id {
        return Err(GoogleAuthError::AudienceMismatch);
    }

    let email = info.email.ok_or(GoogleAuthError::MissingClaim("email"))?;
    let name = info.name.unwrap_or_else(|| email.clone());

    Ok(VerifiedIdentity {
        email,
        name,
        picture: info.picture,
        subject: info.sub,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn claims(aud: &str) -> TokenInfo {
        TokenInfo {
            aud: aud.to_owned(),
            sub: "1093847261".to_owned(),
            email: Some("an@example.com".to_owned()),
            name: Some("An Nguyen".to_owned()),
            picture: Some("https://lh3.example.com/photo.jpg".to_owned()),
        }
    }

    #[test]
    fn test_accepts_matching_audience() {
        let identity = identity_from_claims(claims("client-123"), "client-123").unwrap();
        assert_eq!(identity.email, "an@example.com");
        assert_eq!(identity.subject, "1093847261");
    }

    #[test]
    fn test_rejects_foreign_audience() {
        assert!(matches!(
            identity_from_claims(claims("someone-else"), "client-123"),
            Err(GoogleAuthError::AudienceMismatch)
        ));
    }

    #[test]
    fn test_missing_email_rejected() {
        let mut info = claims("client-123");
        info.email = None;
        assert!(matches!(
            identity_from_claims(info, "client-123"),
            Err(GoogleAuthError::MissingClaim("email"))
        ));
    }

    #[test]
    fn test_name_falls_back_to_email() {
        let mut info = claims("client-123");
        info.name = None;
        let identity = identity_from_claims(info, "client-123").unwrap();
        assert_eq!(identity.name, "an@example.com");
    }
}
