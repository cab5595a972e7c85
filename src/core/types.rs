use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Account identity on the data store.
///
/// The same type carries both namespaces: the offline-derived (unverified)
/// identity a host assigns without authentication, and the verified identity
/// issued by the account service. Nothing in the value says which one it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parses either the dashed canonical form or the 32 hex digit form the
    /// account service sends.
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::try_parse(text.trim()).ok().map(Self)
    }

    /// Undashed lowercase hex, as used in profile service URLs.
    pub fn simple(&self) -> String {
        self.0.simple().to_string()
    }

    /// The identity an offline-mode host derives for `username`: a version 3
    /// UUID over the MD5 of `"OfflinePlayer:" + username`.
    pub fn offline(username: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(format!("OfflinePlayer:{}", username).as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hasher.finalize());
        Self(uuid::Builder::from_md5_bytes(bytes).into_uuid())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Identity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(s.trim()).map(Self)
    }
}

impl From<Uuid> for Identity {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Signed skin texture property as served by the profile service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureDescriptor {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl TextureDescriptor {
    /// Property name the descriptor is stored under on a game profile.
    pub const PROPERTY_NAME: &'static str = "textures";

    pub fn new(value: impl Into<String>, signature: Option<String>) -> Self {
        Self {
            value: value.into(),
            signature,
        }
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }
}

/// Per-identity files that make up a player's persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    PlayerState,
    Advancements,
    Statistics,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::PlayerState,
        ArtifactKind::Advancements,
        ArtifactKind::Statistics,
    ];

    /// Directory under the data root holding this kind of artifact.
    pub fn directory(&self) -> &'static str {
        match self {
            ArtifactKind::PlayerState => "playerdata",
            ArtifactKind::Advancements => "advancements",
            ArtifactKind::Statistics => "stats",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::PlayerState => "dat",
            ArtifactKind::Advancements | ArtifactKind::Statistics => "json",
        }
    }

    pub fn file_name(&self, identity: &Identity) -> String {
        format!("{}.{}", identity, self.extension())
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArtifactKind::PlayerState => "player-state",
            ArtifactKind::Advancements => "advancements",
            ArtifactKind::Statistics => "statistics",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_undashed_and_dashed() {
        let undashed = Identity::parse("069a79f444e94726a5befca90e38aaf5").unwrap();
        let dashed = Identity::parse("069a79f4-44e9-4726-a5be-fca90e38aaf5").unwrap();
        assert_eq!(undashed, dashed);
        assert_eq!(undashed.to_string(), "069a79f4-44e9-4726-a5be-fca90e38aaf5");
        assert_eq!(undashed.simple(), "069a79f444e94726a5befca90e38aaf5");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Identity::parse("not-a-uuid").is_none());
        assert!(Identity::parse("").is_none());
        assert!("069a79f444e94726".parse::<Identity>().is_err());
    }

    #[test]
    fn test_offline_identity_is_stable_v3() {
        let a = Identity::offline("Notch");
        let b = Identity::offline("Notch");
        assert_eq!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 3);
        assert_ne!(a, Identity::offline("notch"));
    }

    #[test]
    fn test_artifact_file_names() {
        let id = Identity::parse("069a79f444e94726a5befca90e38aaf5").unwrap();
        assert_eq!(
            ArtifactKind::PlayerState.file_name(&id),
            "069a79f4-44e9-4726-a5be-fca90e38aaf5.dat"
        );
        assert_eq!(ArtifactKind::Statistics.directory(), "stats");
        assert_eq!(ArtifactKind::Advancements.extension(), "json");
    }

    #[test]
    fn test_texture_signature_is_optional_on_the_wire() {
        let unsigned: TextureDescriptor = serde_json::from_str(r#"{"value":"abc"}"#).unwrap();
        assert!(!unsigned.is_signed());
        let json = serde_json::to_string(&unsigned).unwrap();
        assert_eq!(json, r#"{"value":"abc"}"#);
    }
}
