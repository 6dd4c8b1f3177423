/// The tiered selection cascade over the static catalog.
///
/// Tiers are an explicit ordered list, each a strictly weaker
/// matching policy than the one before; the first tier to produce a
/// non-empty selection wins. The cuisine and top-N tiers only serve
/// token-free queries: when the user named ingredients and no match
/// tier found anything, the result is deliberately empty rather than
/// a set of unrelated recipes.
use std::collections::HashMap;

use tracing::debug;

use crate::model::{Query, RecipeRecord};
use crate::score::{self, MatchOutcome};
use crate::tokenize::word_in_text;

/// No tier returns more than this many recipes.
pub const TIER_CAP: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Exact,
    Partial,
    Relaxed,
    NameMatch,
    Cuisine,
    TopN,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub tier: Tier,
    pub recipes: Vec<RecipeRecord>,
    /// Matched tokens per recipe id, in query-token order.
    pub matched: HashMap<i64, Vec<String>>,
}

struct TierCtx<'a> {
    catalog: &'a [RecipeRecord],
    query: &'a Query,
    tokens: &'a [String],
    /// Filter-passing recipes with their match outcomes, catalog order.
    candidates: Vec<(usize, MatchOutcome)>,
}

type TierFn = for<'a> fn(&'a TierCtx<'a>) -> Option<Selection>;

const TIERS: &[(Tier, TierFn)] = &[
    (Tier::Exact, tier_exact),
    (Tier::Partial, tier_partial),
    (Tier::Relaxed, tier_relaxed),
    (Tier::NameMatch, tier_name_match),
    (Tier::Cuisine, tier_cuisine),
    (Tier::TopN, tier_top_n),
];

/// Run the cascade. `None` means the query carried ingredient tokens
/// that nothing matched; the caller turns that into an empty card
/// list. Token-free queries always select something.
pub fn select(catalog: &[RecipeRecord], query: &Query) -> Option<Selection> {
    let tokens = query.tokens();
    let candidates = catalog
        .iter()
        .enumerate()
        .filter_map(|(i, r)| score::score_recipe(r, query, &tokens).map(|o| (i, o)))
        .collect();
    let ctx = TierCtx {
        catalog,
        query,
        tokens: &tokens,
        candidates,
    };

    for (tier, run) in TIERS {
        if let Some(selection) = run(&ctx) {
            debug!(
                ?tier,
                selected = selection.recipes.len(),
                "cascade tier selected"
            );
            return Some(selection);
        }
    }

    debug!("no cascade tier matched the provided ingredients");
    None
}

fn tier_exact(ctx: &TierCtx) -> Option<Selection> {
    if ctx.tokens.is_empty() {
        return None;
    }
    let picks: Vec<&(usize, MatchOutcome)> = ctx
        .candidates
        .iter()
        .filter(|(_, o)| o.match_count == ctx.tokens.len())
        .take(TIER_CAP)
        .collect();
    build(ctx, Tier::Exact, &picks)
}

fn tier_partial(ctx: &TierCtx) -> Option<Selection> {
    let mut picks: Vec<&(usize, MatchOutcome)> = ctx
        .candidates
        .iter()
        .filter(|(_, o)| o.match_count > 0)
        .collect();
    // Stable sort keeps catalog order on ties.
    picks.sort_by(|a, b| b.1.match_count.cmp(&a.1.match_count));
    picks.truncate(TIER_CAP);
    build(ctx, Tier::Partial, &picks)
}

fn tier_relaxed(ctx: &TierCtx) -> Option<Selection> {
    if !ctx.query.broaden || ctx.tokens.is_empty() {
        return None;
    }
    // Ingredient scoring over the whole catalog, hard filters ignored.
    let scored: Vec<(usize, MatchOutcome)> = ctx
        .catalog
        .iter()
        .enumerate()
        .map(|(i, r)| (i, score::ingredient_matches(r, ctx.tokens)))
        .filter(|(_, o)| o.match_count > 0)
        .collect();
    let mut picks: Vec<&(usize, MatchOutcome)> = scored.iter().collect();
    picks.sort_by(|a, b| b.1.match_count.cmp(&a.1.match_count));
    picks.truncate(TIER_CAP);
    build(ctx, Tier::Relaxed, &picks)
}

fn tier_name_match(ctx: &TierCtx) -> Option<Selection> {
    if ctx.tokens.is_empty() {
        return None;
    }
    let mut recipes = Vec::new();
    let mut matched = HashMap::new();
    for (i, _) in &ctx.candidates {
        let recipe = &ctx.catalog[*i];
        let name_short = format!("{} {}", recipe.name, recipe.short);
        let hits: Vec<String> = ctx
            .tokens
            .iter()
            .filter(|tok| word_in_text(tok, &name_short))
            .cloned()
            .collect();
        if !hits.is_empty() {
            matched.insert(recipe.id, hits);
            recipes.push(recipe.clone());
            if recipes.len() == TIER_CAP {
                break;
            }
        }
    }
    if recipes.is_empty() {
        return None;
    }
    Some(Selection {
        tier: Tier::NameMatch,
        recipes,
        matched,
    })
}

fn tier_cuisine(ctx: &TierCtx) -> Option<Selection> {
    if !ctx.tokens.is_empty() {
        return None;
    }
    let picks: Vec<&(usize, MatchOutcome)> = ctx
        .candidates
        .iter()
        .filter(|(i, _)| {
            ctx.query.cuisine.is_empty()
                || ctx.catalog[*i].cuisine.to_lowercase() == ctx.query.cuisine
        })
        .take(TIER_CAP)
        .collect();
    build(ctx, Tier::Cuisine, &picks)
}

fn tier_top_n(ctx: &TierCtx) -> Option<Selection> {
    if !ctx.tokens.is_empty() {
        return None;
    }
    let recipes: Vec<RecipeRecord> = ctx.catalog.iter().take(TIER_CAP).cloned().collect();
    if recipes.is_empty() {
        return None;
    }
    let matched = recipes.iter().map(|r| (r.id, Vec::new())).collect();
    Some(Selection {
        tier: Tier::TopN,
        recipes,
        matched,
    })
}

fn build(ctx: &TierCtx, tier: Tier, picks: &[&(usize, MatchOutcome)]) -> Option<Selection> {
    if picks.is_empty() {
        return None;
    }
    let mut recipes = Vec::with_capacity(picks.len());
    let mut matched = HashMap::with_capacity(picks.len());
    for (i, outcome) in picks {
        let recipe = &ctx.catalog[*i];
        matched.insert(recipe.id, outcome.matched_tokens.clone());
        recipes.push(recipe.clone());
    }
    Some(Selection {
        tier,
        recipes,
        matched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn load_catalog() -> Vec<RecipeRecord> {
        catalog::load().expect("catalog")
    }

    fn query_with_ingredients(ingredients: &str) -> Query {
        Query {
            ingredients: ingredients.to_string(),
            ..Query::default()
        }
    }

    fn ids(selection: &Selection) -> Vec<i64> {
        selection.recipes.iter().map(|r| r.id).collect()
    }

    #[test]
    fn chicken_exact_matches_kung_pao() {
        let catalog = load_catalog();
        let q = query_with_ingredients("chicken");
        let selection = select(&catalog, &q).expect("selection");
        assert_eq!(selection.tier, Tier::Exact);
        assert_eq!(ids(&selection), vec![5]);
        assert_eq!(selection.matched[&5], vec!["chicken"]);
    }

    #[test]
    fn exact_tier_excludes_partial_matches() {
        let catalog = load_catalog();
        // garlic+ginger: fully matched by Chana Masala and Kung Pao,
        // only partially by Spaghetti Aglio e Olio.
        let q = query_with_ingredients("garlic, ginger");
        let selection = select(&catalog, &q).expect("selection");
        assert_eq!(selection.tier, Tier::Exact);
        assert_eq!(ids(&selection), vec![1, 5]);
        assert!(!ids(&selection).contains(&3));
    }

    #[test]
    fn partial_tier_sorts_by_coverage_with_stable_ties() {
        let catalog = load_catalog();
        let q = query_with_ingredients("onion tomato peanut");
        let selection = select(&catalog, &q).expect("selection");
        assert_eq!(selection.tier, Tier::Partial);
        // Three 2-token matches in catalog order; the 1-token quinoa
        // salad match falls outside the cap.
        assert_eq!(ids(&selection), vec![1, 2, 5]);
        assert_eq!(selection.matched[&1], vec!["onion", "tomato"]);
        assert_eq!(selection.matched[&5], vec!["onion", "peanut"]);
    }

    #[test]
    fn no_tier_exceeds_the_cap() {
        let catalog = load_catalog();
        for ingredients in ["onion", "tomato", "garlic", ""] {
            let q = query_with_ingredients(ingredients);
            if let Some(selection) = select(&catalog, &q) {
                assert!(selection.recipes.len() <= TIER_CAP);
            }
        }
    }

    #[test]
    fn cascade_is_idempotent() {
        let catalog = load_catalog();
        let q = query_with_ingredients("onion tomato");
        let a = select(&catalog, &q).expect("selection");
        let b = select(&catalog, &q).expect("selection");
        assert_eq!(a.tier, b.tier);
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(a.matched, b.matched);
    }

    #[test]
    fn name_fallback_catches_dish_names() {
        let catalog = load_catalog();
        // "salad" appears in a recipe name but in no ingredient line.
        let q = query_with_ingredients("salad");
        let selection = select(&catalog, &q).expect("selection");
        assert_eq!(selection.tier, Tier::NameMatch);
        assert_eq!(ids(&selection), vec![4]);
        assert_eq!(selection.matched[&4], vec!["salad"]);
    }

    #[test]
    fn token_free_query_falls_to_cuisine_tier() {
        let catalog = load_catalog();
        let q = Query {
            cuisine: "indian".to_string(),
            ..Query::default()
        };
        let selection = select(&catalog, &q).expect("selection");
        assert_eq!(selection.tier, Tier::Cuisine);
        assert_eq!(ids(&selection), vec![1, 2]);
    }

    #[test]
    fn token_free_filterless_query_returns_leading_recipes() {
        let catalog = load_catalog();
        let selection = select(&catalog, &Query::default()).expect("selection");
        assert_eq!(selection.tier, Tier::Cuisine);
        assert_eq!(ids(&selection), vec![1, 2, 3]);
    }

    #[test]
    fn unmatched_tokens_produce_no_selection() {
        let catalog = load_catalog();
        let q = query_with_ingredients("xylophone gravel");
        assert!(select(&catalog, &q).is_none());

        let mut broadened = query_with_ingredients("xylophone gravel");
        broadened.broaden = true;
        assert!(select(&catalog, &broadened).is_none());
    }

    #[test]
    fn broaden_recovers_recipes_hidden_by_filters() {
        let catalog = load_catalog();
        let mut q = query_with_ingredients("chicken");
        q.cuisine = "italian".to_string();
        // Strict: Kung Pao is Chinese, the cuisine filter hides it
        // and no Italian recipe contains chicken.
        assert!(select(&catalog, &q).is_none());

        q.broaden = true;
        let selection = select(&catalog, &q).expect("selection");
        assert_eq!(ids(&selection), vec![5]);
    }

    #[test]
    fn difficulty_filter_narrows_token_free_queries() {
        let catalog = load_catalog();
        let q = Query {
            difficulty: "easy".to_string(),
            ..Query::default()
        };
        let selection = select(&catalog, &q).expect("selection");
        // Only recipes whose ingredient and step counts sit in the
        // easy band survive the filter.
        assert_eq!(ids(&selection), vec![2, 3, 4]);
    }

    #[test]
    fn taste_filter_applies_to_cuisine_tier() {
        let catalog = load_catalog();
        let q = Query {
            taste: "spicy".to_string(),
            ..Query::default()
        };
        let selection = select(&catalog, &q).expect("selection");
        assert_eq!(ids(&selection), vec![1, 5]);
    }
}
