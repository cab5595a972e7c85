use super::ProfileService;
use crate::config::RestoreConfig;
use crate::core::{Identity, RestoreError, Result, TextureDescriptor};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

/// HTTP client for the username lookup and session profile services
#[derive(Debug, Clone)]
pub struct MojangClient {
    pub(crate) http: Client,
    pub(crate) api_base: Url,
    pub(crate) session_base: Url,
}

/// Body of a successful username lookup
#[derive(Debug, Deserialize)]
pub(crate) struct NameLookupResponse {
    pub id: String,
}

/// Body of a successful profile fetch
#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResponse {
    #[serde(default)]
    pub properties: Vec<ProfileProperty>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileProperty {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub signature: Option<String>,
}

impl MojangClient {
    /// Create a client from the service URLs and timeout in `config`
    pub fn new(config: &RestoreConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("playerdata-restore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RestoreError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: parse_base(&config.api_base_url)?,
            session_base: parse_base(&config.session_base_url)?,
        })
    }

    /// `base` with `segments` appended, each percent-encoded
    pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
        let mut url = base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

fn parse_base(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| RestoreError::Config(format!("invalid service URL '{}': {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(RestoreError::Config(format!("'{}' cannot be a base URL", raw)));
    }
    Ok(url)
}

#[async_trait]
impl ProfileService for MojangClient {
    async fn resolve(&self, username: &str) -> Result<Option<Identity>> {
        self.lookup_identity(username).await
    }

    async fn textures(&self, verified: &Identity) -> Result<Option<TextureDescriptor>> {
        self.profile_textures(verified).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_encodes_segments() {
        let base = Url::parse("https://api.example.com").unwrap();
        let url = MojangClient::endpoint(&base, &["users", "profiles", "minecraft", "a b"]);
        assert_eq!(url.as_str(), "https://api.example.com/users/profiles/minecraft/a%20b");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = Url::parse("http://127.0.0.1:9000/mock").unwrap();
        let url = MojangClient::endpoint(&base, &["session", "minecraft", "profile", "abc"]);
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/mock/session/minecraft/profile/abc");
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        let config = RestoreConfig::new("/tmp/world").api_base_url("not a url");
        assert!(matches!(MojangClient::new(&config), Err(RestoreError::Config(_))));
    }
}
