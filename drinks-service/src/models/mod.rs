pub mod drink;

pub use drink::{Drink, DrinkLong, DrinkShort, Ingredient, IngredientShort, NewDrink, Recipe};
