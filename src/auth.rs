//! Bearer-token access guard

use log::warn;

use crate::error::ApiError;

const SCHEME: &str = "Bearer ";

/// Guards requests with a single shared secret compared against the
/// `Authorization` header. Constructed only when auth is enabled; a
/// missing secret is a deployment mistake, reported as a server error
/// rather than an unauthorized client.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    secret: Option<String>,
}

impl AccessGuard {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    /// Validate the presented `Authorization` header value.
    pub fn verify(&self, presented: Option<&str>) -> Result<(), ApiError> {
        let secret = self
            .secret
            .as_deref()
            .ok_or(ApiError::MissingCredential("API_TOKEN"))?;

        match presented {
            Some(value) if value == format!("{}{}", SCHEME, secret) => Ok(()),
            Some(_) => {
                warn!("Rejected request with mismatched access token");
                Err(ApiError::Unauthorized)
            }
            None => {
                warn!("Rejected request with no Authorization header");
                Err(ApiError::Unauthorized)
            }
        }
    }
}
