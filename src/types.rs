use chrono::{DateTime, Utc};
use keyward_crypto::Algorithm;
use serde::{Deserialize, Serialize};

// ============================================================================
// Key records
// ============================================================================

/// Lifecycle state of a key. `Revoked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyState {
    Active,
    Revoked,
}

/// What a caller wants to do with unwrapped key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUse {
    Encrypt,
    Decrypt,
}

/// A stored key. `wrapped_key` is the master-wrapped material and is only
/// ever serialized by stores.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyRecord {
    pub id: String,
    pub name: String,
    pub algorithm: Algorithm,
    #[serde(with = "wrapped_key_b64")]
    pub wrapped_key: Vec<u8>,
    pub version: u32,
    pub state: KeyState,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub rotated_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl KeyRecord {
    pub fn is_active(&self) -> bool {
        self.state == KeyState::Active
    }

    pub fn is_revoked(&self) -> bool {
        self.state == KeyState::Revoked
    }

    /// Time of the last material change: rotation if any, else creation.
    pub fn last_rotation(&self) -> DateTime<Utc> {
        self.rotated_at.unwrap_or(self.created_at)
    }

    /// Access-for-use policy. Encryption needs an active key; decryption is
    /// also allowed on revoked keys so legacy ciphertext stays readable.
    pub fn permits(&self, key_use: KeyUse) -> bool {
        match (key_use, self.state) {
            (KeyUse::Encrypt, KeyState::Active) => true,
            (KeyUse::Encrypt, KeyState::Revoked) => false,
            (KeyUse::Decrypt, KeyState::Active | KeyState::Revoked) => true,
        }
    }
}

impl std::fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .field("wrapped_key", &format_args!("<{} bytes>", self.wrapped_key.len()))
            .field("version", &self.version)
            .field("state", &self.state)
            .field("owner_id", &self.owner_id)
            .field("created_at", &self.created_at)
            .field("rotated_at", &self.rotated_at)
            .field("revoked_at", &self.revoked_at)
            .finish()
    }
}

mod wrapped_key_b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Externally visible key metadata. Never carries key material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyView {
    pub id: String,
    pub name: String,
    pub algorithm: Algorithm,
    pub version: u32,
    pub is_active: bool,
    pub is_revoked: bool,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub rotated_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl From<&KeyRecord> for KeyView {
    fn from(record: &KeyRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            algorithm: record.algorithm,
            version: record.version,
            is_active: record.is_active(),
            is_revoked: record.is_revoked(),
            owner_id: record.owner_id.clone(),
            created_at: record.created_at,
            rotated_at: record.rotated_at,
            revoked_at: record.revoked_at,
        }
    }
}

// ============================================================================
// Requests and responses
// ============================================================================

/// The algorithm arrives as its tag string so unknown tags surface as
/// `UnsupportedAlgorithm` rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateKeyRequest {
    pub name: String,
    pub algorithm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    pub key_id: String,
    pub plaintext: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptResponse {
    /// Standard base64 of the sealed bytes.
    pub ciphertext: String,
    pub key_id: String,
    pub version: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRequest {
    pub key_id: String,
    pub ciphertext: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptResponse {
    pub plaintext: String,
    pub key_id: String,
    pub version: u32,
}

// ============================================================================
// Caller context
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Who is calling, as established by the (external) authentication layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// `None` when the caller could not be authenticated.
    pub actor_id: Option<String>,
    pub role: Role,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn admin(actor_id: impl Into<String>) -> Self {
        Self::authenticated(actor_id, Role::Admin)
    }

    pub fn user(actor_id: impl Into<String>) -> Self {
        Self::authenticated(actor_id, Role::User)
    }

    fn authenticated(actor_id: impl Into<String>, role: Role) -> Self {
        Self {
            actor_id: Some(actor_id.into()),
            role,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            actor_id: None,
            role: Role::User,
            ip_address: None,
            user_agent: None,
        }
    }

    pub fn with_ip_address(mut self, ip_address: impl Into<String>) -> Self {
        self.ip_address = Some(ip_address.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
