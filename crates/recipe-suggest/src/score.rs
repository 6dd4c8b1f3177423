/// Per-recipe match scoring against a query.
///
/// Static catalog entries go through hard filters plus soft
/// ingredient-token scoring. Model-generated items instead use the
/// lenient point-scoring validator: model output is trusted more than
/// the catalog, so mismatches cost points rather than rejecting
/// outright.
use crate::difficulty;
use crate::model::{Query, RecipeRecord};
use crate::tokenize::token_in_text;

/// Cuisine values that mean "no cuisine constraint".
const ANY_CUISINE: &[&str] = &["", "something else", "other"];

/// Acceptance floor for the lenient validator. Tuned in the field;
/// the numeric contract is deliberately kept as-is.
pub const LENIENT_ACCEPT_MIN: i32 = -2;

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub match_count: usize,
    pub matched_tokens: Vec<String>,
}

/// Hard filters. A failed filter removes the recipe from
/// consideration entirely unless the query asks to broaden.
pub fn passes_filters(recipe: &RecipeRecord, query: &Query) -> bool {
    if query.broaden {
        return true;
    }
    if !ANY_CUISINE.contains(&query.cuisine.as_str())
        && recipe.cuisine.to_lowercase() != query.cuisine
    {
        return false;
    }
    if !query.diet.is_empty()
        && query.diet != "none"
        && !recipe.diet.to_lowercase().contains(&query.diet)
    {
        return false;
    }
    if !difficulty::meets_band(recipe, &query.difficulty) {
        return false;
    }
    if !query.taste.is_empty() && recipe.taste.to_lowercase() != query.taste {
        return false;
    }
    if !query.meal.is_empty()
        && !recipe
            .meal_types
            .iter()
            .any(|m| m.to_lowercase() == query.meal)
    {
        return false;
    }
    true
}

/// Soft ingredient scoring: each token counts once if any ingredient
/// line contains it as a whole word (variants included). Matched
/// tokens preserve query order.
pub fn ingredient_matches(recipe: &RecipeRecord, tokens: &[String]) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    for tok in tokens {
        if recipe
            .ingredients
            .iter()
            .any(|ing| token_in_text(tok, ing))
        {
            outcome.match_count += 1;
            outcome.matched_tokens.push(tok.clone());
        }
    }
    outcome
}

/// Full scoring for one catalog recipe: `None` when a hard filter
/// rejects it, otherwise the ingredient-match outcome. An empty token
/// set produces a valid zero-count candidate.
pub fn score_recipe(
    recipe: &RecipeRecord,
    query: &Query,
    tokens: &[String],
) -> Option<MatchOutcome> {
    if !passes_filters(recipe, query) {
        return None;
    }
    Some(ingredient_matches(recipe, tokens))
}

/// Point-scoring validator for model-generated items. Filters score
/// instead of rejecting: cuisine +2/-1, difficulty +2 exact, +1 when
/// the complexity bands agree, -1 otherwise, diet +1/-1, meal +1/-1.
/// Constraints the item leaves unspecified score nothing.
pub fn lenient_score(item: &RecipeRecord, query: &Query) -> i32 {
    let mut score = 0;

    if !ANY_CUISINE.contains(&query.cuisine.as_str()) && !item.cuisine.is_empty() {
        if item.cuisine.trim().to_lowercase() == query.cuisine {
            score += 2;
        } else {
            score -= 1;
        }
    }

    if !query.difficulty.is_empty() {
        if !item.difficulty.is_empty()
            && item.difficulty.trim().to_lowercase() == query.difficulty
        {
            score += 2;
        } else if difficulty::meets_band(item, &query.difficulty) {
            score += 1;
        } else {
            score -= 1;
        }
    }

    if !query.diet.is_empty() && query.diet != "none" && !item.diet.is_empty() {
        if item.diet.to_lowercase().contains(&query.diet) {
            score += 1;
        } else {
            score -= 1;
        }
    }

    if !query.meal.is_empty() && !item.meal_types.is_empty() {
        if item
            .meal_types
            .iter()
            .any(|m| m.to_lowercase() == query.meal)
        {
            score += 1;
        } else {
            score -= 1;
        }
    }

    score
}

/// Whether a generated item survives validation. Broadened queries
/// accept everything; otherwise the point score must reach the floor.
pub fn accepts_generated(item: &RecipeRecord, query: &Query) -> bool {
    query.broaden || lenient_score(item, query) >= LENIENT_ACCEPT_MIN
}

/// Relaxed token matching for generated items: the ingredient check
/// widens to name and short-description text, since model output
/// often names the dish after the ingredient instead of listing it.
pub fn display_tokens(item: &RecipeRecord, tokens: &[String]) -> Vec<String> {
    let haystack = format!(
        "{} {} {}",
        item.name,
        item.short,
        item.ingredients.join(" ")
    );
    tokens
        .iter()
        .filter(|tok| token_in_text(tok, &haystack))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> RecipeRecord {
        RecipeRecord {
            id: 1,
            name: "Test Curry".to_string(),
            cuisine: "Indian".to_string(),
            diet: "vegetarian".to_string(),
            difficulty: "easy".to_string(),
            taste: "spicy".to_string(),
            ingredients: vec![
                "2 cups chickpeas".to_string(),
                "1 onion".to_string(),
                "tomatoes".to_string(),
            ],
            meal_types: vec!["lunch".to_string(), "dinner".to_string()],
            instructions: "Chop the onion. Simmer the sauce. Add chickpeas. Serve hot."
                .to_string(),
            ..RecipeRecord::default()
        }
    }

    fn query() -> Query {
        Query::default()
    }

    #[test]
    fn cuisine_filter_is_exact_and_case_insensitive() {
        let r = recipe();
        let mut q = query();
        q.cuisine = "indian".to_string();
        assert!(passes_filters(&r, &q));
        q.cuisine = "italian".to_string();
        assert!(!passes_filters(&r, &q));
    }

    #[test]
    fn sentinel_cuisines_do_not_filter() {
        let r = recipe();
        for sentinel in ["", "something else", "other"] {
            let mut q = query();
            q.cuisine = sentinel.to_string();
            assert!(passes_filters(&r, &q), "sentinel {sentinel:?} should pass");
        }
    }

    #[test]
    fn diet_is_substring_and_none_is_ignored() {
        let r = recipe();
        let mut q = query();
        q.diet = "vegetarian".to_string();
        assert!(passes_filters(&r, &q));
        q.diet = "none".to_string();
        assert!(passes_filters(&r, &q));
        q.diet = "vegan".to_string();
        assert!(!passes_filters(&r, &q));
    }

    #[test]
    fn broaden_disables_every_hard_filter() {
        let r = recipe();
        let mut q = query();
        q.cuisine = "italian".to_string();
        q.diet = "vegan".to_string();
        q.taste = "sweet".to_string();
        q.meal = "breakfast".to_string();
        q.broaden = true;
        assert!(passes_filters(&r, &q));
    }

    #[test]
    fn token_counting_counts_each_token_once() {
        let r = recipe();
        let tokens = vec!["onion".to_string(), "chickpea".to_string(), "kale".to_string()];
        let outcome = ingredient_matches(&r, &tokens);
        assert_eq!(outcome.match_count, 2);
        assert_eq!(outcome.matched_tokens, vec!["onion", "chickpea"]);
    }

    #[test]
    fn no_tokens_is_still_a_candidate() {
        let r = recipe();
        let q = query();
        let outcome = score_recipe(&r, &q, &[]).expect("candidate");
        assert_eq!(outcome.match_count, 0);
        assert!(outcome.matched_tokens.is_empty());
    }

    #[test]
    fn lenient_validator_tolerates_a_single_mismatch() {
        let r = recipe();
        let mut q = query();
        q.cuisine = "mexican".to_string();
        // -1 for cuisine only: still above the floor.
        assert_eq!(lenient_score(&r, &q), -1);
        assert!(accepts_generated(&r, &q));
    }

    #[test]
    fn lenient_validator_rejects_total_mismatches() {
        let r = recipe();
        let mut q = query();
        q.cuisine = "mexican".to_string();
        q.difficulty = "complex".to_string();
        q.diet = "vegan".to_string();
        q.meal = "breakfast".to_string();
        assert_eq!(lenient_score(&r, &q), -4);
        assert!(!accepts_generated(&r, &q));
    }

    #[test]
    fn lenient_validator_rewards_exact_difficulty() {
        let r = recipe();
        let mut q = query();
        q.difficulty = "easy".to_string();
        assert_eq!(lenient_score(&r, &q), 2);
    }

    #[test]
    fn display_tokens_fall_back_to_name_text() {
        let r = recipe();
        let tokens = vec!["curry".to_string(), "chickpeas".to_string()];
        assert_eq!(display_tokens(&r, &tokens), vec!["curry", "chickpeas"]);
    }
}
