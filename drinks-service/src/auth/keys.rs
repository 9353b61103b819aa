//! Signing keys used to verify bearer tokens, indexed by key id.

use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::DecodingKey;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

/// Immutable `kid -> key` map.
#[derive(Clone, Default)]
pub struct SigningKeys {
    keys: HashMap<String, DecodingKey>,
}

impl SigningKeys {
    /// Single shared-secret key, for HMAC-signed tokens.
    pub fn from_secret(kid: impl Into<String>, secret: &[u8]) -> Self {
        let mut keys = HashMap::new();
        keys.insert(kid.into(), DecodingKey::from_secret(secret));
        Self { keys }
    }

    /// Keys of a published JWKS document. Entries without a `kid` or with
    /// unsupported parameters are skipped.
    pub fn from_jwks(set: &JwkSet) -> Self {
        let mut keys = HashMap::new();
        for jwk in &set.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                tracing::warn!("Skipping JWKS entry without kid");
                continue;
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, key);
                }
                Err(e) => tracing::warn!(kid = %kid, error = %e, "Skipping unusable JWKS entry"),
            }
        }
        Self { keys }
    }

    pub fn get(&self, kid: &str) -> Option<&DecodingKey> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

struct JwksSource {
    client: reqwest::Client,
    url: String,
    max_age: Duration,
}

impl JwksSource {
    async fn fetch(&self) -> Result<SigningKeys, anyhow::Error> {
        let set = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;

        let keys = SigningKeys::from_jwks(&set);
        if keys.is_empty() {
            anyhow::bail!("JWKS at {} contains no usable keys", self.url);
        }
        Ok(keys)
    }
}

struct Cached {
    keys: Arc<SigningKeys>,
    fetched_at: Instant,
}

/// Current signing keys, optionally backed by a remote JWKS that is
/// re-fetched once the cached copy is older than its max age.
pub struct KeyCache {
    source: Option<JwksSource>,
    cached: RwLock<Cached>,
    refreshing: Mutex<()>,
}

impl KeyCache {
    /// Keys that never change.
    pub fn fixed(keys: SigningKeys) -> Self {
        Self {
            source: None,
            cached: RwLock::new(Cached {
                keys: Arc::new(keys),
                fetched_at: Instant::now(),
            }),
            refreshing: Mutex::new(()),
        }
    }

    /// Fetches the JWKS once up front; startup fails if it can't be read.
    pub async fn remote(url: impl Into<String>, max_age: Duration) -> Result<Self, anyhow::Error> {
        let source = JwksSource {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?,
            url: url.into(),
            max_age,
        };

        let keys = source.fetch().await?;
        tracing::info!(url = %source.url, keys = keys.len(), "Loaded signing keys");

        Ok(Self {
            source: Some(source),
            cached: RwLock::new(Cached {
                keys: Arc::new(keys),
                fetched_at: Instant::now(),
            }),
            refreshing: Mutex::new(()),
        })
    }

    pub async fn current(&self) -> Arc<SigningKeys> {
        if let Some(source) = &self.source {
            let stale = self.cached.read().await.fetched_at.elapsed() >= source.max_age;
            if stale {
                self.refresh(source).await;
            }
        }
        self.cached.read().await.keys.clone()
    }

    /// One caller fetches while the rest keep using the current keys. The
    /// write lock is only held to swap the result in.
    async fn refresh(&self, source: &JwksSource) {
        let Ok(_refreshing) = self.refreshing.try_lock() else {
            return;
        };
        if self.cached.read().await.fetched_at.elapsed() < source.max_age {
            return;
        }

        let fetched = source.fetch().await;

        let mut cached = self.cached.write().await;
        match fetched {
            Ok(keys) => {
                tracing::info!(url = %source.url, keys = keys.len(), "Refreshed signing keys");
                cached.keys = Arc::new(keys);
            }
            Err(e) => {
                tracing::warn!(url = %source.url, error = %e, "JWKS refresh failed, keeping previous keys");
            }
        }
        cached.fetched_at = Instant::now();
    }
}
