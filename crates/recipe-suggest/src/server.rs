/// HTTP boundary. JSON in, JSON out; the suggest endpoint is total
/// and never returns an error status, while the detail and expansion
/// endpoints surface explicit 4xx/5xx codes.
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use recipe_common::extract;
use recipe_common::images::ImageClient;
use recipe_common::llm::TextGeneration;

use crate::card;
use crate::cascade::{self, Tier};
use crate::error::AppError;
use crate::generate;
use crate::journal::Journal;
use crate::model::{Card, Query, RecipeRecord};
use crate::store::GeneratedStore;

const EXPAND_SYSTEM_PROMPT: &str = "You are an expert chef and recipe writer. Given a recipe \
name, ingredients, and rough instructions, produce a JSON object with two fields: \
'ingredients_detailed' (an array of ingredient lines with quantities and units, include oil \
and spice amounts), and 'instructions_detailed' (an ordered array of clear step-by-step \
instructions, with times where relevant). Be explicit about amounts (grams, cups, teaspoons, \
tablespoons) and keep the language simple and friendly. Return ONLY the JSON object, no \
extra commentary.";

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Vec<RecipeRecord>>,
    pub store: GeneratedStore,
    pub images: Arc<ImageClient>,
    /// `None` when no text-generation key is configured; the catalog
    /// cascade then serves every suggest request.
    pub llm: Option<Arc<dyn TextGeneration>>,
    pub journal: Journal,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/suggest", post(suggest))
        .route("/api/recipes", post(suggest))
        .route("/api/recipe/{id}", get(recipe_detail))
        .route("/api/expand-recipe", post(expand_recipe))
        .route("/api/feedback", post(feedback))
        .route("/api/recipe-feedback", post(recipe_feedback))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SuggestRequest {
    pub ingredients: String,
    pub cuisine: String,
    pub diet: String,
    pub difficulty: String,
    pub taste: String,
    pub meal: String,
    pub broaden: bool,
}

impl SuggestRequest {
    fn into_query(self) -> Query {
        fn norm(field: String) -> String {
            field.trim().to_lowercase()
        }
        Query {
            ingredients: self.ingredients,
            cuisine: norm(self.cuisine),
            diet: norm(self.diet),
            difficulty: norm(self.difficulty),
            taste: norm(self.taste),
            meal: norm(self.meal),
            broaden: self.broaden,
        }
    }
}

async fn suggest(State(state): State<AppState>, Json(req): Json<SuggestRequest>) -> Json<Value> {
    let query = req.into_query();
    let tokens = query.tokens();
    info!(
        ingredients = %query.ingredients,
        cuisine = %query.cuisine,
        broaden = query.broaden,
        generated = state.llm.is_some(),
        "suggest request"
    );

    let (cards, tier) = match &state.llm {
        Some(llm) => {
            let cards = generate::suggest_generated(
                llm.as_ref(),
                &state.images,
                &state.store,
                &query,
                &tokens,
            )
            .await;
            let tier = if cards.iter().any(Card::is_emergency) {
                state.journal.log_emergency(&query.ingredients).await;
                "emergency"
            } else {
                "generated"
            };
            (cards, tier)
        }
        None => match cascade::select(&state.catalog, &query) {
            Some(selection) => {
                let tier = tier_label(selection.tier);
                let cards = card::shape_cards(&selection, &tokens, &state.images).await;
                (cards, tier)
            }
            None => {
                info!(ingredients = %query.ingredients, "no recipes matched");
                (Vec::new(), "none")
            }
        },
    };

    state
        .journal
        .log_request(&query.ingredients, tier, cards.len())
        .await;
    Json(json!({ "cards": cards }))
}

fn tier_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Exact => "exact",
        Tier::Partial => "partial",
        Tier::Relaxed => "relaxed",
        Tier::NameMatch => "name_match",
        Tier::Cuisine => "cuisine",
        Tier::TopN => "top_n",
    }
}

async fn recipe_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let record = find_recipe(&state, id).await.ok_or(AppError::NotFound(id))?;
    let mut value = serde_json::to_value(&record)
        .map_err(|e| AppError::Catalog(format!("recipe failed to serialize: {e}")))?;
    if let Some(expanded) = state.store.expansion(id).await {
        if let Value::Object(map) = &mut value {
            map.insert("expanded".to_string(), expanded);
        }
    }
    Ok(Json(value))
}

async fn expand_recipe(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, AppError> {
    let Some(id) = body.get("id").and_then(Value::as_i64) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing_id" })),
        )
            .into_response());
    };
    let base = find_recipe(&state, id).await.ok_or(AppError::NotFound(id))?;

    if let Some(cached) = state.store.expansion(id).await {
        return Ok(Json(json!({ "expanded": cached })).into_response());
    }

    let llm = state
        .llm
        .as_ref()
        .ok_or(AppError::Capability("text generation"))?;

    let payload = json!({
        "name": base.name,
        "cuisine": base.cuisine,
        "short": base.short,
        "ingredients": base.ingredients,
        "instructions": base.instructions,
    });
    let user = format!(
        "Expand this recipe into detailed ingredients with quantities and step-by-step \
instructions: {payload}"
    );
    let text = llm.generate(Some(EXPAND_SYSTEM_PROMPT), &user, 500, 0.2).await?;
    let expanded = extract::extract_object(&text).ok_or_else(|| {
        AppError::MalformedOutput("no JSON object found in expansion response".to_string())
    })?;

    // First expansion wins; concurrent requests converge on one value.
    let cached = state.store.attach_expansion(id, expanded).await;
    info!(id, "recipe expanded");
    Ok(Json(json!({ "expanded": cached })).into_response())
}

async fn find_recipe(state: &AppState, id: i64) -> Option<RecipeRecord> {
    if let Some(generated) = state.store.get(id).await {
        return Some(generated);
    }
    state.catalog.iter().find(|r| r.id == id).cloned()
}

async fn feedback(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.journal.log_feedback(json!({ "feedback": body })).await;
    (StatusCode::CREATED, Json(json!({ "status": "ok" })))
}

async fn recipe_feedback(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    let entry = json!({
        "type": "recipe_feedback",
        "recipe": body.get("recipe").cloned().unwrap_or(json!("Unknown Recipe")),
        "rating": body.get("rating").cloned().unwrap_or(json!(0)),
        "comment": body.get("comment").cloned().unwrap_or(json!("")),
        "timestamp": body.get("timestamp").cloned().unwrap_or(json!("")),
    });
    state.journal.log_recipe_feedback(entry).await;
    Json(json!({ "status": "success", "message": "Feedback received" }))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Config(_) | AppError::Catalog(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
            AppError::Capability(_) => (StatusCode::BAD_GATEWAY, "capability_unavailable"),
            AppError::MalformedOutput(_) => (StatusCode::BAD_GATEWAY, "no_json_returned"),
            AppError::Llm(_) => (StatusCode::BAD_GATEWAY, "upstream_failed"),
        };
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        (
            status,
            Json(json!({ "error": code, "detail": self.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_common::images::ImageClientConfig;
    use recipe_common::llm::LlmError;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Scripted {
        responses: Mutex<VecDeque<Option<String>>>,
    }

    #[async_trait::async_trait]
    impl TextGeneration for Scripted {
        async fn generate(
            &self,
            _system: Option<&str>,
            _user: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<String, LlmError> {
            let next = self.responses.lock().unwrap().pop_front().flatten();
            next.ok_or(LlmError::NotConfigured)
        }
    }

    fn scripted(responses: Vec<Option<&str>>) -> Arc<dyn TextGeneration> {
        Arc::new(Scripted {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            ),
        })
    }

    fn state(llm: Option<Arc<dyn TextGeneration>>) -> AppState {
        let images = ImageClient::new(ImageClientConfig {
            api_key: None,
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_millis(10),
            static_root: "/static/images".to_string(),
        })
        .expect("client");
        let journal = Journal::new(
            std::env::temp_dir().join(format!("recipe-suggest-server-{}", std::process::id())),
        );
        AppState {
            catalog: Arc::new(crate::catalog::load().expect("catalog")),
            store: GeneratedStore::new(),
            images: Arc::new(images),
            llm,
            journal,
        }
    }

    fn request(ingredients: &str) -> SuggestRequest {
        SuggestRequest {
            ingredients: ingredients.to_string(),
            ..SuggestRequest::default()
        }
    }

    fn cards_of(body: &Value) -> &Vec<Value> {
        body["cards"].as_array().expect("cards array")
    }

    #[tokio::test]
    async fn suggest_serves_catalog_matches_without_a_capability() {
        let state = state(None);
        let Json(body) = suggest(State(state), Json(request("chicken"))).await;
        let cards = cards_of(&body);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0]["name"], "Kung Pao Chicken");
        assert_eq!(cards[0]["matched_tokens"], json!(["chicken"]));
    }

    #[tokio::test]
    async fn suggest_returns_empty_cards_for_unmatched_tokens() {
        let state = state(None);
        let Json(body) = suggest(State(state), Json(request("xylophone gravel"))).await;
        assert!(cards_of(&body).is_empty());
    }

    #[tokio::test]
    async fn suggest_degrades_to_emergency_when_generation_fails() {
        let state = state(Some(scripted(vec![None, None])));
        let Json(body) = suggest(State(state), Json(request("chicken"))).await;
        let cards = cards_of(&body);
        assert!(!cards.is_empty());
        for card in cards {
            assert!(card["id"].as_i64().expect("id") >= crate::model::EMERGENCY_ID_START);
        }
    }

    #[tokio::test]
    async fn recipe_detail_finds_catalog_entries() {
        let state = state(None);
        let Json(body) = recipe_detail(State(state), Path(1)).await.expect("detail");
        assert_eq!(body["name"], "Chana Masala");
        assert!(body.get("expanded").is_none());
    }

    #[tokio::test]
    async fn recipe_detail_prefers_the_generated_store() {
        let state = state(None);
        state
            .store
            .insert(RecipeRecord {
                id: 1000,
                name: "Generated Dish".to_string(),
                ..RecipeRecord::default()
            })
            .await;
        let Json(body) = recipe_detail(State(state), Path(1000)).await.expect("detail");
        assert_eq!(body["name"], "Generated Dish");
    }

    #[tokio::test]
    async fn recipe_detail_unknown_id_is_not_found() {
        let state = state(None);
        let err = recipe_detail(State(state), Path(424242)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(424242)));
    }

    #[tokio::test]
    async fn expand_requires_an_id() {
        let state = state(None);
        let response = expand_recipe(State(state), Json(json!({})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn expand_without_capability_is_a_gateway_error() {
        let state = state(None);
        let err = expand_recipe(State(state), Json(json!({ "id": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Capability(_)));
    }

    #[tokio::test]
    async fn expand_caches_the_first_expansion() {
        let expansion = r#"{"ingredients_detailed": ["1 cup chickpeas"],
                            "instructions_detailed": ["Soak overnight."]}"#;
        // One scripted response only: the second request must be
        // served from cache without touching the capability.
        let state = state(Some(scripted(vec![Some(expansion)])));

        let first = expand_recipe(State(state.clone()), Json(json!({ "id": 1 })))
            .await
            .expect("first expansion");
        assert_eq!(first.status(), StatusCode::OK);

        let second = expand_recipe(State(state.clone()), Json(json!({ "id": 1 })))
            .await
            .expect("cached expansion");
        assert_eq!(second.status(), StatusCode::OK);

        let cached = state.store.expansion(1).await.expect("cached value");
        assert_eq!(cached["ingredients_detailed"][0], "1 cup chickpeas");
    }

    #[tokio::test]
    async fn expand_rejects_prose_only_output() {
        let state = state(Some(scripted(vec![Some("no json here at all")])));
        let err = expand_recipe(State(state), Json(json!({ "id": 1 })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedOutput(_)));
    }

    #[test]
    fn error_statuses_map_to_their_classes() {
        assert_eq!(
            AppError::NotFound(7).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Capability("text generation").into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Catalog("bad".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn filters_are_normalized_into_the_query() {
        let req = SuggestRequest {
            ingredients: "Chicken, Rice".to_string(),
            cuisine: "  Indian ".to_string(),
            difficulty: "EASY".to_string(),
            ..SuggestRequest::default()
        };
        let query = req.into_query();
        assert_eq!(query.ingredients, "Chicken, Rice");
        assert_eq!(query.cuisine, "indian");
        assert_eq!(query.difficulty, "easy");
    }
}
