use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

use crate::models::{Drink, NewDrink};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Title already taken: {0}")]
    TitleTaken(String),

    #[error("Drink {0} does not exist")]
    Missing(i64),

    #[error("Stored recipe for drink {id} is unreadable: {source}")]
    CorruptRecipe {
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode recipe: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Every store failure reaching a handler is a server-side problem; the
/// handlers run their own guard checks before touching the store.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

/// Persistence contract consumed by the drink handlers.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Drink>, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<Drink>, StoreError>;

    /// Persists the drink and returns it with its assigned id.
    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError>;

    async fn update(&self, drink: &Drink) -> Result<(), StoreError>;

    async fn delete(&self, drink: &Drink) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
