use super::client::{MojangClient, NameLookupResponse};
use crate::core::{Identity, RestoreError, Result};
use reqwest::StatusCode;
use tracing::debug;

impl MojangClient {
    /// Looks up the verified identity for an exact username.
    ///
    /// Anything but `200` with a body means there is no verified account.
    pub async fn lookup_identity(&self, username: &str) -> Result<Option<Identity>> {
        let url = Self::endpoint(&self.api_base, &["users", "profiles", "minecraft", username]);
        let failed = |reason: String| RestoreError::LookupFailed {
            username: username.to_string(),
            reason,
        };

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(username, %status, "no verified account");
            return Ok(None);
        }

        let body = response.text().await.map_err(|e| failed(e.to_string()))?;
        if body.trim().is_empty() {
            debug!(username, "empty lookup body");
            return Ok(None);
        }

        let parsed: NameLookupResponse =
            serde_json::from_str(&body).map_err(|e| failed(format!("malformed body: {}", e)))?;
        Identity::parse(&parsed.id)
            .map(Some)
            .ok_or_else(|| failed(format!("malformed id '{}'", parsed.id)))
    }
}
