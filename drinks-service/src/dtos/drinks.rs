use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use service_core::error::AppError;
use validator::{Validate, ValidationError};

use crate::models::Recipe;

/// `{"success": true, "drinks": [...]}`
#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// `{"success": true, "delete": <id>}`
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub delete: i64,
}

/// Parses a request body that must be a non-empty JSON object.
pub fn json_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) if !map.is_empty() => Ok(map),
        Ok(_) => Err(AppError::BadRequest(anyhow::anyhow!(
            "request body must be a non-empty JSON object"
        ))),
        Err(e) => Err(AppError::BadRequest(anyhow::anyhow!(
            "request body is not valid JSON: {}",
            e
        ))),
    }
}

/// Blank values (null, false, 0, "", [], {}) count as not supplied and are
/// dropped before the body is deserialized.
fn without_blanks(mut body: Map<String, Value>) -> Map<String, Value> {
    body.retain(|_, value| match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    });
    body
}

fn from_body<T: DeserializeOwned>(body: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(without_blanks(body)))
        .map_err(|e| AppError::Unprocessable(anyhow::anyhow!("invalid drink: {}", e)))
}

fn validate_recipe(recipe: &Recipe) -> Result<(), ValidationError> {
    if recipe.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("recipe is required".into());
        return Err(err);
    }
    Ok(())
}

/// Validated body of `POST /drinks`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDrinkRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,

    #[serde(default)]
    #[validate(custom(function = "validate_recipe"))]
    pub recipe: Recipe,
}

impl TryFrom<Map<String, Value>> for CreateDrinkRequest {
    type Error = AppError;

    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        let request: Self = from_body(body)?;
        request.validate()?;
        Ok(request)
    }
}

/// Validated body of `PATCH /drinks/<id>`. At least one field is set.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDrinkRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,

    #[validate(custom(function = "validate_recipe"))]
    pub recipe: Option<Recipe>,
}

impl TryFrom<Map<String, Value>> for UpdateDrinkRequest {
    type Error = AppError;

    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        let request: Self = from_body(body)?;

        if request.title.is_none() && request.recipe.is_none() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "supply a title or a recipe to update"
            )));
        }

        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_body_must_be_non_empty_object() {
        assert!(matches!(json_object(b"{not json"), Err(AppError::BadRequest(_))));
        assert!(matches!(json_object(b""), Err(AppError::BadRequest(_))));
        assert!(matches!(json_object(b"{}"), Err(AppError::BadRequest(_))));
        assert!(matches!(json_object(b"[1]"), Err(AppError::BadRequest(_))));
        assert!(json_object(br#"{"title":"Latte"}"#).is_ok());
    }

    fn latte_recipe() -> Value {
        json!([{"name": "milk", "color": "white", "parts": 1}])
    }

    #[test]
    fn test_create_requires_title_and_recipe() {
        let missing_recipe = object(json!({"title": "Latte"}));
        assert!(matches!(
            CreateDrinkRequest::try_from(missing_recipe),
            Err(AppError::ValidationError(_))
        ));

        let blank_title = object(json!({"title": "", "recipe": latte_recipe()}));
        assert!(matches!(
            CreateDrinkRequest::try_from(blank_title),
            Err(AppError::ValidationError(_))
        ));

        let empty_recipe = object(json!({"title": "Latte", "recipe": []}));
        assert!(matches!(
            CreateDrinkRequest::try_from(empty_recipe),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_create_rejects_wrong_shapes() {
        let bad_recipe = object(json!({"title": "Latte", "recipe": [{"name": "milk"}]}));
        assert!(matches!(
            CreateDrinkRequest::try_from(bad_recipe),
            Err(AppError::Unprocessable(_))
        ));

        let numeric_title = object(json!({"title": 7, "recipe": latte_recipe()}));
        assert!(matches!(
            CreateDrinkRequest::try_from(numeric_title),
            Err(AppError::Unprocessable(_))
        ));
    }

    #[test]
    fn test_create_wraps_bare_recipe() {
        let request = CreateDrinkRequest::try_from(object(json!({
            "title": "Water",
            "recipe": {"name": "water", "color": "blue", "parts": 1}
        })))
        .unwrap();
        assert_eq!(request.title, "Water");
        assert_eq!(request.recipe.ingredients().len(), 1);
    }

    #[test]
    fn test_update_needs_one_field() {
        let nothing = object(json!({"colour": "red"}));
        assert!(matches!(
            UpdateDrinkRequest::try_from(nothing),
            Err(AppError::BadRequest(_))
        ));

        let blanks = object(json!({"title": "", "recipe": null}));
        assert!(matches!(
            UpdateDrinkRequest::try_from(blanks),
            Err(AppError::BadRequest(_))
        ));

        let title_only = UpdateDrinkRequest::try_from(object(json!({"title": "Mocha"}))).unwrap();
        assert_eq!(title_only.title.as_deref(), Some("Mocha"));
        assert!(title_only.recipe.is_none());
    }
}
