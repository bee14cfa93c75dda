//! Provider credentials, loaded from the environment at process start.

use crate::error::{AcquisitionError, AcquisitionResult};

pub const CLIENT_ID_VAR: &str = "IMAGERY_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "IMAGERY_CLIENT_SECRET";

/// OAuth2 client credentials for the acquisition service.
///
/// Threaded explicitly into the client constructor rather than living in
/// process-global state.
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ProviderCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Read both values from the environment. Absence of either is fatal
    /// before any core logic runs.
    pub fn from_env() -> AcquisitionResult<Self> {
        let client_id = std::env::var(CLIENT_ID_VAR)
            .map_err(|_| AcquisitionError::MissingCredentials(CLIENT_ID_VAR.to_string()))?;
        let client_secret = std::env::var(CLIENT_SECRET_VAR)
            .map_err(|_| AcquisitionError::MissingCredentials(CLIENT_SECRET_VAR.to_string()))?;
        Ok(Self {
            client_id,
            client_secret,
        })
    }
}
