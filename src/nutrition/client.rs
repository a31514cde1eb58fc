//! Client for the natural-language nutrients API.
//!
//! The webhook talks to the lookup service only through the
//! [`NutrientLookup`] trait so the conversation layer can be driven by a
//! test double.

use crate::config::NutritionConfig;
use crate::models::{FoodNutrientRecord, NutrientsResponse, UtteranceQuery};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Ways a lookup can fail.
#[derive(Debug, Error)]
pub enum LookupError {
    /// DNS, connect or timeout failure.
    #[error("nutrient lookup transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("nutrient lookup returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body did not contain a list of foods.
    #[error("nutrient lookup returned a malformed body: {0}")]
    Malformed(String),

    /// The service recognized no food in the query.
    #[error("nutrient lookup matched no foods")]
    NoMatch,
}

/// Translates free text into per-food nutrient records.
#[async_trait]
pub trait NutrientLookup: Send + Sync {
    /// Look up every food described in the query.
    ///
    /// An empty vector means the call succeeded but nothing was recognized.
    async fn lookup(&self, query: &UtteranceQuery) -> Result<Vec<FoodNutrientRecord>, LookupError>;
}

/// Request body of the natural-language nutrients endpoint.
#[derive(Debug, Serialize)]
struct NutrientsRequest<'a> {
    query: &'a str,
    locale: &'a str,
}

/// HTTP client for the Nutritionix natural-language nutrients endpoint.
pub struct NutritionixClient {
    http_client: reqwest::Client,
    endpoint: String,
    app_id: String,
    app_key: String,
    timeout_seconds: u64,
}

impl NutritionixClient {
    /// Create a client from the nutrition settings.
    ///
    /// Fails when either credential is missing.
    pub fn new(config: &NutritionConfig) -> Result<Self> {
        let (app_id, app_key) = config.credentials()?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        info!(
            "Nutrient lookup via {} (timeout {}s)",
            config.endpoint, config.timeout_seconds
        );

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            app_id: app_id.to_string(),
            app_key: app_key.to_string(),
            timeout_seconds: config.timeout_seconds,
        })
    }
}

#[async_trait]
impl NutrientLookup for NutritionixClient {
    async fn lookup(&self, query: &UtteranceQuery) -> Result<Vec<FoodNutrientRecord>, LookupError> {
        debug!("Looking up nutrients for: {:?}", query.text);

        let request = NutrientsRequest {
            query: &query.text,
            locale: &query.locale,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("x-app-id", &self.app_id)
            .header("x-app-key", &self.app_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LookupError::Transport(format!(
                        "request timed out after {}s",
                        self.timeout_seconds
                    ))
                } else if e.is_connect() {
                    LookupError::Transport(format!("cannot connect to {}", self.endpoint))
                } else {
                    LookupError::Transport(e.to_string())
                }
            })?;

        let status = response.status();

        // Nutritionix answers 404 when none of the foods could be matched
        if status == StatusCode::NOT_FOUND {
            debug!("Lookup matched no foods");
            return Err(LookupError::NoMatch);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Nutrient lookup failed with {}", status);
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let parsed: NutrientsResponse =
            serde_json::from_slice(&bytes).map_err(|e| LookupError::Malformed(e.to_string()))?;

        debug!(
            "Lookup returned {} foods: {:?}",
            parsed.foods.len(),
            parsed
                .foods
                .iter()
                .filter_map(|f| f.food_name.as_deref())
                .collect::<Vec<_>>()
        );

        Ok(parsed.foods)
    }
}
