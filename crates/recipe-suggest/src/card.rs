/// Shaping selected recipes into outward cards.
///
/// Total by construction: image resolution has its own internal
/// fallback and everything else is a pure copy, so a selection always
/// shapes into cards.
use recipe_common::images::ImageClient;

use crate::cascade::Selection;
use crate::model::{Card, RecipeRecord};
use crate::tokenize::{token_in_text, word_in_text};

pub const SHORT_MAX_LEN: usize = 140;

pub fn truncate_short(short: &str) -> String {
    short.chars().take(SHORT_MAX_LEN).collect()
}

/// Matched tokens recomputed against the final record for display
/// highlighting: ingredient lines first (variant-aware), then the
/// name/short text as a plain whole-word fallback.
pub fn highlight_tokens(recipe: &RecipeRecord, tokens: &[String]) -> Vec<String> {
    let name_short = format!("{} {}", recipe.name, recipe.short);
    tokens
        .iter()
        .filter(|tok| {
            recipe
                .ingredients
                .iter()
                .any(|ing| token_in_text(tok, ing))
                || word_in_text(tok, &name_short)
        })
        .cloned()
        .collect()
}

/// A record-supplied absolute path or URL is kept as-is; anything
/// else goes through the image capability.
pub async fn resolve_image(recipe: &RecipeRecord, images: &ImageClient) -> String {
    let img = recipe.image.trim();
    if img.starts_with('/') || has_url_scheme(img) {
        return img.to_string();
    }
    images.resolve(&recipe.name, &recipe.cuisine).await
}

pub fn has_url_scheme(reference: &str) -> bool {
    let lower = reference.to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

pub async fn shape_cards(
    selection: &Selection,
    tokens: &[String],
    images: &ImageClient,
) -> Vec<Card> {
    let mut cards = Vec::with_capacity(selection.recipes.len());
    for recipe in &selection.recipes {
        cards.push(Card {
            id: recipe.id,
            name: recipe.name.clone(),
            image: resolve_image(recipe, images).await,
            short: truncate_short(&recipe.short),
            matched_tokens: highlight_tokens(recipe, tokens),
        });
    }
    cards
}
