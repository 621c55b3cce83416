//! Process configuration: master secret, audit secret, rotation policy.
//!
//! Secrets are decoded once and held in zeroizing buffers for the process
//! lifetime. A value that parses as hex is hex-decoded; anything else is
//! taken as its UTF-8 bytes.

use chrono::Duration;
use zeroize::Zeroizing;

use crate::error::{KmsError, Result};

pub const ENV_MASTER_KEY: &str = "KEYWARD_MASTER_KEY";
pub const ENV_AUDIT_SECRET: &str = "KEYWARD_AUDIT_SECRET";
pub const ENV_ROTATION_MAX_AGE_DAYS: &str = "KEYWARD_ROTATION_MAX_AGE_DAYS";

/// Minimum decoded length of both secrets (256 bits).
pub const MIN_SECRET_LENGTH: usize = 32;

pub const DEFAULT_ROTATION_MAX_AGE_DAYS: u32 = 90;

pub struct EngineConfig {
    master_secret: Zeroizing<Vec<u8>>,
    audit_secret: Zeroizing<Vec<u8>>,
    rotation_max_age_days: u32,
}

impl EngineConfig {
    /// Build a config from already-decoded secrets.
    pub fn new(master_secret: &[u8], audit_secret: &[u8]) -> Result<Self> {
        check_length(ENV_MASTER_KEY, master_secret)?;
        check_length(ENV_AUDIT_SECRET, audit_secret)?;
        Ok(Self {
            master_secret: Zeroizing::new(master_secret.to_vec()),
            audit_secret: Zeroizing::new(audit_secret.to_vec()),
            rotation_max_age_days: DEFAULT_ROTATION_MAX_AGE_DAYS,
        })
    }

    pub fn with_rotation_max_age_days(mut self, days: u32) -> Result<Self> {
        if days == 0 {
            return Err(KmsError::Configuration(
                "rotation max age must be at least one day".into(),
            ));
        }
        self.rotation_max_age_days = days;
        Ok(self)
    }

    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    ///
    /// # Arguments
    /// * `lookup` - Returns the raw value for a variable name, if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let master = required_secret(&lookup, ENV_MASTER_KEY)?;
        let audit = required_secret(&lookup, ENV_AUDIT_SECRET)?;
        let config = Self::new(&master, &audit)?;

        match lookup(ENV_ROTATION_MAX_AGE_DAYS) {
            Some(raw) if !raw.trim().is_empty() => {
                let days = raw.trim().parse::<u32>().map_err(|_| {
                    KmsError::Configuration(format!(
                        "{ENV_ROTATION_MAX_AGE_DAYS} must be a whole number of days, got {raw:?}"
                    ))
                })?;
                config.with_rotation_max_age_days(days)
            }
            _ => Ok(config),
        }
    }

    pub fn master_secret(&self) -> &[u8] {
        &self.master_secret
    }

    pub fn audit_secret(&self) -> &[u8] {
        &self.audit_secret
    }

    pub fn rotation_max_age_days(&self) -> u32 {
        self.rotation_max_age_days
    }

    pub fn rotation_max_age(&self) -> Duration {
        Duration::days(i64::from(self.rotation_max_age_days))
    }
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("master_secret", &"<redacted>")
            .field("audit_secret", &"<redacted>")
            .field("rotation_max_age_days", &self.rotation_max_age_days)
            .finish()
    }
}

fn required_secret<F>(lookup: &F, name: &str) -> Result<Zeroizing<Vec<u8>>>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = Zeroizing::new(
        lookup(name).ok_or_else(|| KmsError::Configuration(format!("{name} is not set")))?,
    );
    let decoded = decode_secret(raw.trim());
    check_length(name, &decoded)?;
    Ok(decoded)
}

fn decode_secret(value: &str) -> Zeroizing<Vec<u8>> {
    match hex::decode(value) {
        Ok(bytes) if !bytes.is_empty() => Zeroizing::new(bytes),
        _ => Zeroizing::new(value.as_bytes().to_vec()),
    }
}

fn check_length(name: &str, secret: &[u8]) -> Result<()> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(KmsError::Configuration(format!(
            "{name} must decode to at least {MIN_SECRET_LENGTH} bytes, got {}",
            secret.len()
        )));
    }
    Ok(())
}
