use super::ApiError;
use serde::{Deserialize, Serialize};

/// Response wrapper used by every backend endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload of a successful envelope.
    ///
    /// # Errors
    /// Returns [`ApiError::Rejected`] when the backend reports failure and
    /// [`ApiError::Parse`] when a successful envelope carries no data.
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.success {
            let message = self
                .message
                .map(|message| message.trim().to_string())
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| "Request failed.".to_string());
            return Err(ApiError::Rejected(message));
        }

        self.data
            .ok_or_else(|| ApiError::Parse("Response envelope has no data.".to_string()))
    }
}
