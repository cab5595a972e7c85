use super::ProfileService;
use super::client::{MojangClient, ProfileResponse};
use crate::core::{Identity, RestoreError, Result, TextureDescriptor};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

impl MojangClient {
    /// Fetches the signed `textures` property of a verified profile.
    pub async fn profile_textures(&self, verified: &Identity) -> Result<Option<TextureDescriptor>> {
        let simple = verified.simple();
        let mut url =
            Self::endpoint(&self.session_base, &["session", "minecraft", "profile", &simple]);
        url.query_pairs_mut().append_pair("unsigned", "false");

        let failed = |reason: String| RestoreError::FetchFailed {
            identity: *verified,
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
            debug!(identity = %verified, %status, "no profile");
            return Ok(None);
        }

        let body = response.text().await.map_err(|e| failed(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let profile: ProfileResponse =
            serde_json::from_str(&body).map_err(|e| failed(format!("malformed body: {}", e)))?;

        Ok(profile
            .properties
            .into_iter()
            .find(|property| property.name == TextureDescriptor::PROPERTY_NAME)
            .map(|property| TextureDescriptor::new(property.value, property.signature)))
    }

    /// Username to skin in one call. See [`fetch_skin`].
    pub async fn fetch(&self, username: &str) -> Option<TextureDescriptor> {
        fetch_skin(self, username).await
    }
}

/// Resolves `username` and fetches the skin of the verified profile.
///
/// Every failure collapses to `None` after being logged.
pub async fn fetch_skin<S>(service: &S, username: &str) -> Option<TextureDescriptor>
where
    S: ProfileService + ?Sized,
{
    let verified = match service.resolve(username).await {
        Ok(Some(verified)) => verified,
        Ok(None) => {
            info!(username, "no verified account; no skin");
            return None;
        }
        Err(err) => {
            warn!(username, error = %err, "skin lookup failed");
            return None;
        }
    };

    match service.textures(&verified).await {
        Ok(Some(descriptor)) => Some(descriptor),
        Ok(None) => {
            info!(username, identity = %verified, "no textures property");
            None
        }
        Err(err) => {
            warn!(username, error = %err, "skin lookup failed");
            None
        }
    }
}
