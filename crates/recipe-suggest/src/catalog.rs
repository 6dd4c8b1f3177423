/// The static recipe catalog, embedded at compile time and loaded
/// once at startup. Read-only for the life of the process.
use crate::error::AppError;
use crate::model::RecipeRecord;

const CATALOG_JSON: &str = include_str!("catalog.json");

pub fn load() -> Result<Vec<RecipeRecord>, AppError> {
    let recipes: Vec<RecipeRecord> = serde_json::from_str(CATALOG_JSON)
        .map_err(|e| AppError::Catalog(format!("embedded catalog is invalid: {e}")))?;
    if recipes.is_empty() {
        return Err(AppError::Catalog("embedded catalog is empty".to_string()));
    }
    Ok(recipes)
}
