pub mod drinks;

pub use drinks::{json_object, CreateDrinkRequest, DeleteResponse, DrinksResponse, UpdateDrinkRequest};
