//! Drink model and its two public projections.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Number;

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    /// Kept as a JSON number so `1` stays `1` and `0.5` stays `0.5`.
    pub parts: Number,
}

/// Accepted encodings of a recipe: a list of ingredients, or a single bare
/// ingredient object written by older clients.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecipeShape {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

/// Ordered ingredient list. Always serialized as a sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Recipe(Vec<Ingredient>);

impl<'de> Deserialize<'de> for Recipe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RecipeShape::deserialize(deserializer)? {
            RecipeShape::Many(items) => Recipe(items),
            RecipeShape::One(item) => Recipe(vec![item]),
        })
    }
}

impl Recipe {
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Self(ingredients)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text form written to the store.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    /// Reads stored text, wrapping a legacy bare object into a sequence.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Persisted drink.
#[derive(Debug, Clone, PartialEq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Recipe,
}

/// Drink awaiting an id from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Recipe,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientShort {
    pub color: String,
    pub parts: Number,
}

/// Public view: recipe lines without ingredient names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrinkShort {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<IngredientShort>,
}

/// Detailed view, full recipe lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrinkLong {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .ingredients()
                .iter()
                .map(|i| IngredientShort {
                    color: i.color.clone(),
                    parts: i.parts.clone(),
                })
                .collect(),
        }
    }

    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.ingredients().to_vec(),
        }
    }
}

impl NewDrink {
    pub fn into_drink(self, id: i64) -> Drink {
        Drink {
            id,
            title: self.title,
            recipe: self.recipe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn water() -> Ingredient {
        Ingredient {
            name: "water".to_string(),
            color: "blue".to_string(),
            parts: Number::from(1),
        }
    }

    #[test]
    fn test_bare_object_is_wrapped() {
        let recipe =
            serde_json::from_value::<Recipe>(json!({"name": "water", "color": "blue", "parts": 1})).unwrap();
        assert_eq!(recipe, Recipe::new(vec![water()]));
        assert_eq!(
            recipe.encode().unwrap(),
            r#"[{"name":"water","color":"blue","parts":1}]"#
        );
    }

    #[test]
    fn test_legacy_stored_object_decodes_as_sequence() {
        let recipe = Recipe::decode(r#"{"name":"water","color":"blue","parts":1}"#).unwrap();
        assert_eq!(recipe.ingredients().len(), 1);
    }

    #[test]
    fn test_missing_ingredient_field_is_rejected() {
        assert!(serde_json::from_value::<Recipe>(json!([{"name": "milk", "color": "white"}])).is_err());
        assert!(serde_json::from_value::<Recipe>(json!("espresso")).is_err());
    }

    #[test]
    fn test_short_projection_hides_names() {
        let drink = Drink {
            id: 3,
            title: "Cortado".to_string(),
            recipe: serde_json::from_value::<Recipe>(json!([
                {"name": "espresso", "color": "brown", "parts": 1},
                {"name": "milk", "color": "white", "parts": 0.5}
            ]))
            .unwrap(),
        };

        let short = serde_json::to_value(drink.short()).unwrap();
        assert_eq!(
            short,
            json!({
                "id": 3,
                "title": "Cortado",
                "recipe": [
                    {"color": "brown", "parts": 1},
                    {"color": "white", "parts": 0.5}
                ]
            })
        );

        let long = serde_json::to_value(drink.long()).unwrap();
        assert_eq!(long["recipe"][1]["name"], "milk");
    }
}
