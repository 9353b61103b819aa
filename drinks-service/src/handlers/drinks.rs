use service_core::{
    axum::{
        body::Bytes,
        extract::{Path, State},
        Json,
    },
    error::AppError,
};

use crate::dtos::{json_object, CreateDrinkRequest, DeleteResponse, DrinksResponse, UpdateDrinkRequest};
use crate::middleware::AuthUser;
use crate::models::{Drink, DrinkLong, DrinkShort, NewDrink};
use crate::AppState;

/// Path ids that aren't integers can't name a drink.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::NotFound(anyhow::anyhow!("drink {} not found", raw)))
}

async fn find_drink(state: &AppState, id: i64) -> Result<Drink, AppError> {
    state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("drink {} not found", id)))
}

/// `GET /drinks`: public listing, short projection.
pub async fn list_drinks(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkShort>>, AppError> {
    let drinks = state.store.list().await?;
    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::short).collect(),
    )))
}

/// `GET /drinks-detail`: full recipes.
pub async fn list_drinks_detail(
    State(state): State<AppState>,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let drinks = state.store.list().await?;
    Ok(Json(DrinksResponse::new(
        drinks.iter().map(Drink::long).collect(),
    )))
}

/// `POST /drinks`
pub async fn create_drink(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    body: Bytes,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let request = CreateDrinkRequest::try_from(json_object(&body)?)?;

    // Read-then-insert: two concurrent creates with the same title can both
    // pass this check; the store's own constraint is the backstop.
    let existing = state.store.list().await?;
    if existing
        .iter()
        .any(|drink| drink.short().title == request.title)
    {
        return Err(AppError::NotAcceptable(anyhow::anyhow!(
            "a drink titled '{}' already exists",
            request.title
        )));
    }

    let drink = state
        .store
        .insert(NewDrink {
            title: request.title,
            recipe: request.recipe,
        })
        .await?;

    tracing::info!(drink_id = drink.id, title = %drink.title, actor = ?claims.sub, "Drink created");

    Ok(Json(DrinksResponse::new(vec![drink.long()])))
}

/// `PATCH /drinks/<id>`
pub async fn update_drink(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<DrinksResponse<DrinkLong>>, AppError> {
    let id = parse_id(&id)?;
    let mut drink = find_drink(&state, id).await?;

    let request = UpdateDrinkRequest::try_from(json_object(&body)?)?;
    if let Some(title) = request.title {
        drink.title = title;
    }
    if let Some(recipe) = request.recipe {
        drink.recipe = recipe;
    }

    state.store.update(&drink).await?;

    tracing::info!(drink_id = drink.id, actor = ?claims.sub, "Drink updated");

    Ok(Json(DrinksResponse::new(vec![drink.long()])))
}

/// `DELETE /drinks/<id>`
pub async fn delete_drink(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_id(&id)?;
    if id == 0 {
        return Err(AppError::BadRequest(anyhow::anyhow!("a drink id is required")));
    }

    let drink = find_drink(&state, id).await?;
    state.store.delete(&drink).await?;

    tracing::info!(drink_id = id, actor = ?claims.sub, "Drink deleted");

    Ok(Json(DeleteResponse {
        success: true,
        delete: id,
    }))
}
