//! API credential handling.
//!
//! The orchestrator never looks a credential up on its own: callers pass one
//! in, usually read from a [`CredentialStore`].

use crate::config::ServiceConfig;
use std::fmt;
use std::sync::RwLock;

/// An API key for the generation service.
///
/// `Debug` is redacted so keys never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Build a credential from user input, trimming whitespace.
    ///
    /// Returns `None` for blank input.
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            None
        } else {
            Some(Self(key.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Resolve the credential from the service config (`${ENV_VAR}` aware).
    pub fn from_config(config: &ServiceConfig) -> Option<Self> {
        resolve_env_var(&config.api_key).and_then(Self::new)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        write!(f, "Credential(…{tail})")
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Supplies and retracts the API credential.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<Credential>;

    fn set(&self, credential: Credential) -> std::io::Result<()>;

    fn clear(&self) -> std::io::Result<()>;
}

/// Session-only credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            inner: RwLock::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.inner.read().ok().and_then(|guard| guard.clone())
    }

    fn set(&self, credential: Credential) -> std::io::Result<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| std::io::Error::other("credential store lock poisoned"))?;
        *guard = Some(credential);
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| std::io::Error::other("credential store lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_trims_and_rejects_blank() {
        assert_eq!(Credential::new("  key-123 \n").unwrap().expose(), "key-123");
        assert!(Credential::new("   ").is_none());
        assert!(Credential::new("").is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let cred = Credential::new("secret-abcd").unwrap();
        let debug = format!("{cred:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("abcd"));
    }

    #[test]
    fn test_resolve_env_var() {
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        assert_eq!(resolve_env_var(""), None);
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_from_config_literal_key() {
        let config = ServiceConfig {
            api_key: "literal".into(),
            ..ServiceConfig::default()
        };
        assert_eq!(Credential::from_config(&config).unwrap().expose(), "literal");
    }

    #[test]
    fn test_memory_store_get_set_clear() {
        let store = MemoryCredentialStore::new();
        assert!(store.get().is_none());

        store.set(Credential::new("k1").unwrap()).unwrap();
        assert_eq!(store.get().unwrap().expose(), "k1");

        store.set(Credential::new("k2").unwrap()).unwrap();
        assert_eq!(store.get().unwrap().expose(), "k2");

        store.clear().unwrap();
        assert!(store.get().is_none());
    }
}
