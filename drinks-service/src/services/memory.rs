use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::store::{DrinkStore, StoreError};
use crate::models::{Drink, NewDrink, Recipe};

/// Row as a database would hold it: recipe kept in its encoded form.
#[derive(Debug, Clone)]
struct StoredDrink {
    title: String,
    recipe: String,
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<i64, StoredDrink>,
    last_id: i64,
}

/// Process-local store used when no database is configured, and by tests.
/// Mirrors the relational backend: ids start at 1, titles are unique.
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn load(id: i64, row: &StoredDrink) -> Result<Drink, StoreError> {
        let recipe = Recipe::decode(&row.recipe)
            .map_err(|source| StoreError::CorruptRecipe { id, source })?;
        Ok(Drink {
            id,
            title: row.title.clone(),
            recipe,
        })
    }

    fn title_taken(table: &Table, title: &str, except: Option<i64>) -> bool {
        table
            .rows
            .iter()
            .any(|(id, row)| Some(*id) != except && row.title == title)
    }
}

#[async_trait]
impl DrinkStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Drink>, StoreError> {
        let table = self.table.read().await;
        table
            .rows
            .iter()
            .map(|(id, row)| Self::load(*id, row))
            .collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Drink>, StoreError> {
        let table = self.table.read().await;
        table.rows.get(&id).map(|row| Self::load(id, row)).transpose()
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, StoreError> {
        let recipe = drink.recipe.encode()?;
        let mut table = self.table.write().await;

        if Self::title_taken(&table, &drink.title, None) {
            return Err(StoreError::TitleTaken(drink.title));
        }

        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(
            id,
            StoredDrink {
                title: drink.title.clone(),
                recipe,
            },
        );

        Ok(drink.into_drink(id))
    }

    async fn update(&self, drink: &Drink) -> Result<(), StoreError> {
        let recipe = drink.recipe.encode()?;
        let mut table = self.table.write().await;

        if Self::title_taken(&table, &drink.title, Some(drink.id)) {
            return Err(StoreError::TitleTaken(drink.title.clone()));
        }

        let row = table
            .rows
            .get_mut(&drink.id)
            .ok_or(StoreError::Missing(drink.id))?;
        row.title = drink.title.clone();
        row.recipe = recipe;
        Ok(())
    }

    async fn delete(&self, drink: &Drink) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        table
            .rows
            .remove(&drink.id)
            .map(|_| ())
            .ok_or(StoreError::Missing(drink.id))
    }
}
