use serde::{Deserialize, Serialize};

/// Static catalog ids are small fixed integers; model-generated
/// records are allocated from 1000 upward so the two ranges never
/// collide, and the emergency tier owns the 9000 range.
pub const GENERATED_ID_START: i64 = 1000;
pub const EMERGENCY_ID_START: i64 = 9000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
}

/// A fully-specified recipe, either from the static catalog or
/// synthesized from model output. Every field defaults so leniently
/// parsed model items never fail deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeRecord {
    pub id: i64,
    pub name: String,
    pub cuisine: String,
    pub time: u32,
    pub diet: String,
    pub difficulty: String,
    pub taste: String,
    pub image: String,
    pub short: String,
    pub ingredients: Vec<String>,
    pub meal_types: Vec<String>,
    pub instructions: String,
    pub nutrition: Nutrition,
}

/// A parsed suggestion query. Filter fields are already trimmed and
/// lowercased; empty means "not constrained".
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub ingredients: String,
    pub cuisine: String,
    pub diet: String,
    pub difficulty: String,
    pub taste: String,
    pub meal: String,
    pub broaden: bool,
}

impl Query {
    pub fn tokens(&self) -> Vec<String> {
        crate::tokenize::tokenize(&self.ingredients)
    }
}

/// The outward card shape for the chat UI.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub short: String,
    pub matched_tokens: Vec<String>,
}

impl Card {
    pub fn is_emergency(&self) -> bool {
        self.id >= EMERGENCY_ID_START
    }
}
