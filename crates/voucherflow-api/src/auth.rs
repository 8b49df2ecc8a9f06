use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Credentials presented to the notifications API.
///
/// The API itself is fronted by a gateway; session login happens
/// elsewhere and hands us an access token, if one is needed at all.
#[derive(Debug, Clone, Default)]
pub enum Credentials {
    /// No `Authorization` header.
    #[default]
    Anonymous,
    /// `Authorization: Bearer <token>` on every request.
    Bearer(SecretString),
}

impl Credentials {
    /// Build from an optional token, treating blank tokens as absent.
    pub fn from_token(token: Option<SecretString>) -> Self {
        match token {
            Some(t) if !t.expose_secret().trim().is_empty() => Self::Bearer(t),
            _ => Self::Anonymous,
        }
    }

    pub(crate) fn authorization_header(&self) -> Result<Option<HeaderValue>, Error> {
        match self {
            Self::Anonymous => Ok(None),
            Self::Bearer(token) => {
                let mut value =
                    HeaderValue::from_str(&format!("Bearer {}", token.expose_secret().trim()))
                        .map_err(|e| Error::InvalidCredentials {
                            message: format!("invalid bearer token header value: {e}"),
                        })?;
                value.set_sensitive(true);
                Ok(Some(value))
            }
        }
    }
}
