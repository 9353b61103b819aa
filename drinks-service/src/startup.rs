use crate::auth::{KeyCache, SigningKeys, TokenValidator};
use crate::config::DrinksConfig;
use crate::models::{Ingredient, NewDrink, Recipe};
use crate::services::{DrinkStore, MemoryStore, PgDrinkStore};
use crate::{build_router, AppState};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: DrinksConfig) -> Result<Self, AppError> {
        let store = build_store(&config).await?;

        if config.seed {
            seed_store(store.as_ref()).await?;
        }

        let validator = Arc::new(build_validator(&config).await?);
        let state = AppState::new(store, validator);

        let app = build_router(state);

        let addr = config.common.socket_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn build_store(config: &DrinksConfig) -> Result<Arc<dyn DrinkStore>, AppError> {
    match &config.database.url {
        Some(url) => {
            let store = PgDrinkStore::connect(
                url,
                config.database.max_connections,
                config.database.min_connections,
            )
            .await?;
            store.run_migrations().await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, drinks are kept in memory");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn build_validator(config: &DrinksConfig) -> Result<TokenValidator, AppError> {
    let auth = &config.auth;

    let keys = match &auth.shared_secret {
        Some(secret) => {
            tracing::info!(kid = %auth.shared_kid, "Using shared-secret signing key");
            KeyCache::fixed(SigningKeys::from_secret(
                auth.shared_kid.clone(),
                secret.as_bytes(),
            ))
        }
        None => KeyCache::remote(auth.jwks_url.clone(), auth.jwks_refresh())
            .await
            .map_err(|e| {
                tracing::error!(url = %auth.jwks_url, error = %e, "Failed to load JWKS");
                AppError::ConfigError(e)
            })?,
    };

    Ok(TokenValidator::new(
        keys,
        auth.audience.clone(),
        auth.issuer(),
        auth.algorithms.clone(),
    ))
}

/// Puts a single starter drink into an empty store.
pub async fn seed_store(store: &dyn DrinkStore) -> Result<(), AppError> {
    if !store.list().await?.is_empty() {
        return Ok(());
    }

    let water = NewDrink {
        title: "water".to_string(),
        recipe: Recipe::new(vec![Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: 1.into(),
        }]),
    };
    let drink = store.insert(water).await?;
    tracing::info!(drink_id = drink.id, "Seeded starter drink");
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_only_fills_empty_store() {
        let store = MemoryStore::new();
        seed_store(&store).await.unwrap();
        seed_store(&store).await.unwrap();

        let drinks = store.list().await.unwrap();
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].title, "water");
    }
}
