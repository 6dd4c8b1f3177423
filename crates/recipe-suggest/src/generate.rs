/// The model-generated suggestion path.
///
/// When a text-generation capability is configured it replaces the
/// exact/partial catalog tiers: primary prompt, then a simplified
/// secondary prompt, then the static emergency list. The entry point
/// is total; every failure mode downgrades to the next rung and the
/// emergency tier can neither fail nor come back empty.
use recipe_common::extract;
use recipe_common::images::ImageClient;
use recipe_common::llm::TextGeneration;
use serde_json::json;
use tracing::{info, warn};

use crate::card::{has_url_scheme, truncate_short};
use crate::error::AppError;
use crate::model::{Card, Query, RecipeRecord, EMERGENCY_ID_START, GENERATED_ID_START};
use crate::score;
use crate::store::GeneratedStore;

pub const SUGGEST_CAP: usize = 3;

/// How many parsed items the validator considers per response.
const VALIDATION_POOL: usize = 6;

/// Ids handed to secondary-prompt items the model left unnumbered.
const SECONDARY_ID_START: i64 = 2000;

const PRIMARY_SYSTEM_PROMPT: &str = "You are a helpful cooking assistant. Respond ONLY with a \
JSON array (no explanatory text). Return up to 3 recipe objects. Each object should include \
the fields: id (number), name (string), cuisine (string), short (string), image (string; \
optional), ingredients (array of strings), instructions (string), nutrition (object with \
calories, protein, fat, carbs), difficulty (string). IMPORTANT: Follow these difficulty \
guidelines strictly: - For 'easy': Use 3-6 ingredients max and 3-5 simple steps. Keep \
instructions concise. - For 'moderate': Use 6-10 ingredients and 6-8 detailed steps. Include \
more cooking techniques. - For 'complex': Use 10+ ingredients and 8+ comprehensive steps. \
Include advanced techniques and timing. Always include the difficulty field matching the \
requested difficulty level.";

pub async fn suggest_generated<G: TextGeneration + ?Sized>(
    llm: &G,
    images: &ImageClient,
    store: &GeneratedStore,
    query: &Query,
    tokens: &[String],
) -> Vec<Card> {
    match primary(llm, images, store, query, tokens).await {
        Ok(cards) if !cards.is_empty() => return cards,
        Ok(_) => info!("no generated items passed validation, trying simplified prompt"),
        Err(e) => warn!(error = %e, "primary generation failed, trying simplified prompt"),
    }

    match secondary(llm, images, store, query, tokens).await {
        Ok(cards) if !cards.is_empty() => return cards,
        Ok(_) => info!("simplified prompt produced no usable items"),
        Err(e) => warn!(error = %e, "secondary generation failed"),
    }

    warn!(ingredients = %query.ingredients, "generation exhausted, serving emergency recipes");
    emergency_cards(&query.ingredients)
}

async fn primary<G: TextGeneration + ?Sized>(
    llm: &G,
    images: &ImageClient,
    store: &GeneratedStore,
    query: &Query,
    tokens: &[String],
) -> Result<Vec<Card>, AppError> {
    let criteria = json!({
        "ingredients": query.ingredients,
        "cuisine": query.cuisine,
        "diet": query.diet,
        "difficulty": query.difficulty,
        "meal": query.meal,
        "broaden": query.broaden,
    });
    let user = format!("Suggest recipes for this criteria: {criteria}. Return only JSON array.");

    let text = llm
        .generate(Some(PRIMARY_SYSTEM_PROMPT), &user, 800, 0.6)
        .await?;

    let mut cards = Vec::new();
    for item in parse_items(&text)?.into_iter().take(VALIDATION_POOL) {
        if !score::accepts_generated(&item, query) {
            info!(name = %item.name, score = score::lenient_score(&item, query), "generated item rejected");
            continue;
        }
        let matched = score::display_tokens(&item, tokens);
        let card = admit(item, matched, None, images, store, query).await;
        cards.push(card);
        if cards.len() == SUGGEST_CAP {
            break;
        }
    }
    Ok(cards)
}

async fn secondary<G: TextGeneration + ?Sized>(
    llm: &G,
    images: &ImageClient,
    store: &GeneratedStore,
    query: &Query,
    tokens: &[String],
) -> Result<Vec<Card>, AppError> {
    let cuisine_hint = if query.cuisine.is_empty() {
        String::new()
    } else {
        format!(" in {} style", query.cuisine)
    };
    let difficulty_hint = if query.difficulty.is_empty() {
        " Keep it simple and accessible.".to_string()
    } else {
        format!(" Keep it {}.", query.difficulty)
    };
    let prompt = format!(
        "Generate 1-3 simple recipe ideas using these ingredients: {}{}.{}\n\n\
Focus on practical, achievable recipes that home cooks can make. Include common pantry \
ingredients as needed.\n\n\
Return ONLY a JSON array of recipe objects with id, name, cuisine, short, image, \
ingredients, instructions and difficulty fields.",
        query.ingredients, cuisine_hint, difficulty_hint
    );

    let text = llm.generate(None, &prompt, 600, 0.7).await?;

    let mut cards = Vec::new();
    for (i, item) in parse_items(&text)?
        .into_iter()
        .take(SUGGEST_CAP)
        .enumerate()
    {
        // The simplified prompt trusts the model fully; no validator.
        let fallback_id = SECONDARY_ID_START + i as i64;
        let card = admit(item, tokens.to_vec(), Some(fallback_id), images, store, query).await;
        cards.push(card);
    }
    Ok(cards)
}

/// Parse model text into lenient recipe records. Items that fail to
/// deserialize individually are skipped rather than failing the
/// whole response.
fn parse_items(text: &str) -> Result<Vec<RecipeRecord>, AppError> {
    let value = extract::extract_array(text).ok_or_else(|| {
        AppError::MalformedOutput("no JSON array found in model response".to_string())
    })?;
    let items = value
        .as_array()
        .map(|array| {
            array
                .iter()
                .filter_map(|v| serde_json::from_value::<RecipeRecord>(v.clone()).ok())
                .collect()
        })
        .unwrap_or_default();
    Ok(items)
}

/// Default missing fields, assign an id from the generated range,
/// resolve the image, store the record and shape the card.
async fn admit(
    mut item: RecipeRecord,
    matched_tokens: Vec<String>,
    fallback_id: Option<i64>,
    images: &ImageClient,
    store: &GeneratedStore,
    query: &Query,
) -> Card {
    if item.name.is_empty() {
        item.name = format!("Recipe with {}", query.ingredients);
    }
    if item.short.is_empty() {
        item.short = format!("A delicious recipe using {}", query.ingredients);
    }
    if item.difficulty.is_empty() {
        item.difficulty = if query.difficulty.is_empty() {
            "easy".to_string()
        } else {
            query.difficulty.clone()
        };
    }
    if item.cuisine.is_empty() {
        item.cuisine = if query.cuisine.is_empty() {
            "International".to_string()
        } else {
            query.cuisine.clone()
        };
    }

    // Model-supplied ids are usually small (1, 2, 3) and would
    // collide with the static catalog, so only ids already in the
    // generated range survive.
    if item.id < GENERATED_ID_START {
        item.id = fallback_id.unwrap_or_else(|| store.allocate_id());
    }

    if !has_url_scheme(item.image.trim()) {
        item.image = images.resolve(&item.name, &item.cuisine).await;
    }

    let card = Card {
        id: item.id,
        name: item.name.clone(),
        image: item.image.clone(),
        short: truncate_short(&item.short),
        matched_tokens,
    };
    store.insert(item).await;
    card
}

/// The terminal tier: a fixed list keyed by a coarse ingredient
/// category. Pure, never fails, never empty.
pub fn emergency_cards(ingredients: &str) -> Vec<Card> {
    let lowered = ingredients.trim().to_lowercase();
    let lowered = if lowered.is_empty() {
        "chicken".to_string()
    } else {
        lowered
    };

    let fixed = |id: i64, name: &str, image: &str, short: &str| Card {
        id,
        name: name.to_string(),
        image: image.to_string(),
        short: short.to_string(),
        matched_tokens: Vec::new(),
    };

    if lowered.contains("chicken") {
        vec![
            fixed(
                EMERGENCY_ID_START + 1,
                "Simple Chicken Stir Fry",
                "/static/images/chicken_stir_fry_pexels.jpg",
                "Quick and easy chicken stir fry with vegetables. Ready in 15 minutes.",
            ),
            fixed(
                EMERGENCY_ID_START + 2,
                "Chicken Rice Bowl",
                "/static/images/chicken_rice_bowl_pexels.jpg",
                "Nutritious chicken and rice bowl with simple seasonings.",
            ),
        ]
    } else if lowered.contains("pasta") {
        vec![
            fixed(
                EMERGENCY_ID_START + 3,
                "Classic Spaghetti",
                "/static/images/spaghetti.jpg",
                "Traditional spaghetti with tomato sauce and herbs.",
            ),
            fixed(
                EMERGENCY_ID_START + 4,
                "Pasta Aglio e Olio",
                "/static/images/aglio_e_olio_pasta_pexels.jpg",
                "Simple Italian pasta with garlic and olive oil.",
            ),
        ]
    } else if lowered.contains("rice") {
        vec![
            fixed(
                EMERGENCY_ID_START + 5,
                "Vegetable Rice",
                "/static/images/rice_vegetable_pulao_pexels.jpg",
                "Healthy vegetable rice with mixed spices.",
            ),
            fixed(
                EMERGENCY_ID_START + 6,
                "Simple Fried Rice",
                "/static/images/fried_rice_pexels.jpg",
                "Quick fried rice with vegetables and soy sauce.",
            ),
        ]
    } else if ["vegetable", "broccoli", "carrot", "potato"]
        .iter()
        .any(|v| lowered.contains(v))
    {
        vec![
            fixed(
                EMERGENCY_ID_START + 7,
                "Mixed Vegetable Curry",
                "/static/images/vegetable_curry_pexels.jpg",
                "Hearty vegetable curry with aromatic spices.",
            ),
            fixed(
                EMERGENCY_ID_START + 8,
                "Vegetable Stir Fry",
                "/static/images/vegetable_stir_fry_pexels.jpg",
                "Colorful mixed vegetables stir-fried to perfection.",
            ),
        ]
    } else {
        vec![
            fixed(
                EMERGENCY_ID_START + 9,
                "Quick & Easy Recipe",
                "/static/images/quinoa_salad.jpg",
                &format!("A delicious recipe using {lowered} with simple preparation."),
            ),
            fixed(
                EMERGENCY_ID_START + 10,
                "Healthy Bowl",
                "/static/images/healthy_bowl_pexels.jpg",
                &format!("Nutritious bowl featuring {lowered} and fresh ingredients."),
            ),
        ]
    }
}
