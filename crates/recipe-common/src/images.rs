/// Image resolution against the Pexels search API.
///
/// From the caller's point of view `resolve` is total: every rung of
/// the ladder that can fail falls through to the next one, and the
/// last rung is a fixed local path. Without an API key no network
/// call is ever made and resolution runs purely off the keyword map.
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

/// Neutral image used when nothing better can be resolved.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/quinoa_salad.jpg";

/// Ingredient words that make good standalone photo queries.
const INGREDIENT_KEYWORDS: &[&str] = &[
    "fish", "chicken", "beef", "pork", "lamb", "mutton", "shrimp", "prawn", "paneer", "tofu",
    "egg", "potato", "tomato", "rice", "pasta", "noodles", "lentil", "bean", "chickpea",
    "vegetable", "mushroom", "cheese",
];

const GENERIC_QUERIES: &[&str] = &[
    "homemade food",
    "cooking food",
    "delicious meal",
    "food dish",
    "kitchen cooking",
    "restaurant food",
];

/// Dish/ingredient keywords mapped to bundled static images.
const LOCAL_IMAGES: &[(&str, &str)] = &[
    ("curry", "chicken_curry_pexels.jpg"),
    ("masala", "paneer_butter_masala_pexels.jpg"),
    ("paneer", "paneer_butter_masala_pexels.jpg"),
    ("chana", "chana_masala.jpg"),
    ("chickpea", "chana_masala.jpg"),
    ("biryani", "rice_vegetable_pulao_pexels.jpg"),
    ("pulao", "rice_vegetable_pulao_pexels.jpg"),
    ("pasta", "pasta_penne_pexels.jpg"),
    ("spaghetti", "pasta_penne_pexels.jpg"),
    ("noodles", "pasta_penne_pexels.jpg"),
    ("chicken", "chicken_curry_pexels.jpg"),
    ("beef", "beef_tacos_pexels.jpg"),
    ("rice", "rice_vegetable_pulao_pexels.jpg"),
    ("potato", "potato_vegetable_curry_pexels.jpg"),
    ("tomato", "tomato_rasam_pexels.jpg"),
    ("vegetable", "vegetable_stir_fry_pexels.jpg"),
    ("salad", "quinoa_salad.jpg"),
    ("soup", "quinoa_salad.jpg"),
    ("lentil", "quinoa_salad.jpg"),
];

const CUISINE_IMAGES: &[(&str, &str)] = &[
    ("indian", "paneer_butter_masala_pexels.jpg"),
    ("italian", "pasta_penne_pexels.jpg"),
    ("chinese", "vegetable_stir_fry_pexels.jpg"),
    ("mediterranean", "quinoa_salad.jpg"),
    ("mexican", "beef_tacos_pexels.jpg"),
];

#[derive(Clone, Debug)]
pub struct ImageClientConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
    pub static_root: String,
}

impl ImageClientConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("PEXELS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        let base_url = std::env::var("PEXELS_BASE_URL")
            .unwrap_or_else(|_| "https://api.pexels.com/v1".to_string());

        let timeout = std::env::var("PEXELS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(8));

        let static_root = std::env::var("STATIC_IMAGE_ROOT")
            .unwrap_or_else(|_| "/static/images".to_string());

        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            static_root: static_root.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ImageClient {
    config: ImageClientConfig,
    http: reqwest::Client,
}

impl ImageClient {
    pub fn new(config: ImageClientConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent("recipe-suggest/images")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ImageClientConfig {
        &self.config
    }

    /// Resolve a displayable image reference for a recipe.
    ///
    /// Query ladder: exact dish name, "name dish", the main
    /// ingredient with cooking/dish/food suffixes, generic food
    /// queries, then the local keyword map. Always returns a value.
    pub async fn resolve(&self, name_hint: &str, cuisine_hint: &str) -> String {
        let name = name_hint.trim().to_lowercase();

        if self.config.api_key.is_none() {
            return self.local_fallback(&name, cuisine_hint);
        }

        if !name.is_empty() {
            if let Some(url) = self.try_search(&name).await {
                return url;
            }
            if let Some(url) = self.try_search(&format!("{name} dish")).await {
                return url;
            }
        }

        if let Some(ingredient) = main_ingredient(&name) {
            for suffix in ["cooking", "dish", "food"] {
                if let Some(url) = self.try_search(&format!("{ingredient} {suffix}")).await {
                    return url;
                }
            }
        }

        for generic in GENERIC_QUERIES {
            if let Some(url) = self.try_search(generic).await {
                return url;
            }
        }

        debug!(name = %name_hint, "all image searches failed, using local fallback");
        self.local_fallback(&name, cuisine_hint)
    }

    async fn try_search(&self, query: &str) -> Option<String> {
        let api_key = self.config.api_key.as_deref()?;
        let url = format!("{}/search", self.config.base_url);
        let result = self
            .http
            .get(&url)
            .header("Authorization", api_key)
            .query(&[("query", query), ("per_page", "1")])
            .timeout(self.config.timeout)
            .send()
            .await;

        let resp = match result {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                warn!(query, status = %resp.status(), "image search returned error status");
                return None;
            }
            Err(e) => {
                warn!(query, error = %e, "image search request failed");
                return None;
            }
        };

        let body = match resp.json::<PhotoSearchResponse>().await {
            Ok(body) => body,
            Err(e) => {
                warn!(query, error = %e, "image search response was not valid JSON");
                return None;
            }
        };

        body.photos
            .into_iter()
            .next()
            .and_then(|p| p.src.medium.or(p.src.original))
            .filter(|u| !u.is_empty())
    }

    fn local_fallback(&self, name: &str, cuisine_hint: &str) -> String {
        for (keyword, file) in LOCAL_IMAGES {
            if name.contains(keyword) {
                return format!("{}/{file}", self.config.static_root);
            }
        }
        let cuisine = cuisine_hint.trim().to_lowercase();
        for (keyword, file) in CUISINE_IMAGES {
            if cuisine.contains(keyword) {
                return format!("{}/{file}", self.config.static_root);
            }
        }
        PLACEHOLDER_IMAGE.to_string()
    }
}

fn main_ingredient(name: &str) -> Option<&'static str> {
    INGREDIENT_KEYWORDS
        .iter()
        .find(|kw| name.contains(*kw))
        .copied()
}

#[derive(Debug, Deserialize)]
struct PhotoSearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSrc,
}

#[derive(Debug, Deserialize, Default)]
struct PhotoSrc {
    medium: Option<String>,
    original: Option<String>,
}
