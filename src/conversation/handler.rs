//! Turn handling: dispatch on the intent and build the reply.

use super::intent::Intent;
use super::request::WebhookRequest;
use super::response::Reply;
use crate::config::Config;
use crate::models::{UserProfile, UtteranceQuery};
use crate::nutrition::{aggregate, format_summary, LookupError, NutrientLookup};
use std::sync::Arc;
use tracing::{debug, info, warn};

const WELCOME_CONTEXT: &str = "Hello, and welcome to macroS! To get to know you better";

const CAPABILITIES: &str = "You can ask me for nutritional info about anything, or, tell me \
what you just ate and I'll log it and you can track what you eat on your macroS account!";

const ASK_AGAIN: &str = "Ask me something else!";

const NOTHING_HEARD: &str = "Sorry, I didn't catch what you ate. Tell me something like \
\"I ate 1 banana\".";

const NO_MATCH: &str = "Sorry, I couldn't find any foods in that. Try naming the food and \
how much of it you had.";

const LOOKUP_FAILED: &str = "Sorry, I couldn't look up that nutrition info right now. \
Please try again in a moment.";

const UNKNOWN_INTENT: &str = "Sorry, I can't help with that yet. Tell me what you ate and \
I'll break down the nutrition for you.";

/// Fulfills one conversation turn at a time.
///
/// Built once at startup and shared by every request; holds no
/// per-request state.
pub struct FulfillmentHandler {
    lookup: Arc<dyn NutrientLookup>,
    locale: String,
    suggestions: Vec<String>,
}

impl FulfillmentHandler {
    pub fn new(config: &Config, lookup: Arc<dyn NutrientLookup>) -> Self {
        Self {
            lookup,
            locale: config.nutrition.locale.clone(),
            suggestions: config.conversation.suggestions.clone(),
        }
    }

    /// Produce the reply for one webhook request.
    pub async fn handle(&self, request: &WebhookRequest) -> Reply {
        let intent = request.intent();
        info!("Handling intent: {}", intent);
        debug!(
            "Response id: {:?}, session: {:?}",
            request.response_id, request.session
        );

        match intent {
            Intent::Welcome => Reply::permission(WELCOME_CONTEXT, &["NAME"]),
            Intent::PermissionResponse => self.permission_reply(request),
            Intent::NutritionQuery => self.nutrition_reply(request, false).await,
            Intent::LogFood => self.nutrition_reply(request, true).await,
            Intent::Unknown => Reply::new(UNKNOWN_INTENT).with_suggestions(&self.suggestions),
        }
    }

    fn permission_reply(&self, request: &WebhookRequest) -> Reply {
        if !request.permission_granted() {
            debug!("Name permission declined");
            return Reply::new(format!("Ok, no worries. {}", CAPABILITIES))
                .with_suggestions(&self.suggestions);
        }

        let greeting = match request
            .user_display_name()
            .and_then(UserProfile::from_display_name)
        {
            Some(profile) => format!("Thanks, {}. {}", profile.first_name, CAPABILITIES),
            None => {
                warn!("Name permission granted but no display name was provided");
                format!("Thanks! {}", CAPABILITIES)
            }
        };

        Reply::new(greeting).with_suggestions(&self.suggestions)
    }

    async fn nutrition_reply(&self, request: &WebhookRequest, logged: bool) -> Reply {
        let query = UtteranceQuery::new(request.utterance_text().unwrap_or_default(), &self.locale);

        if query.is_blank() {
            debug!("Empty utterance; not calling the nutrient lookup");
            return Reply::new(NOTHING_HEARD).with_suggestions(&self.suggestions);
        }

        match self.lookup.lookup(&query).await {
            Ok(foods) if foods.is_empty() => {
                info!("Lookup recognized no foods");
                Reply::new(NO_MATCH).with_suggestions(&self.suggestions)
            }
            Ok(foods) => {
                let totals = aggregate(&foods);
                info!(
                    "Aggregated {} foods: {} kcal{}",
                    foods.len(),
                    totals.calories,
                    if logged { " (logged)" } else { "" }
                );
                Reply::new(format_summary(&totals, logged)).then(ASK_AGAIN)
            }
            Err(LookupError::NoMatch) => {
                info!("Lookup recognized no foods");
                Reply::new(NO_MATCH).with_suggestions(&self.suggestions)
            }
            Err(e) => {
                warn!("Nutrient lookup failed: {}", e);
                Reply::new(LOOKUP_FAILED).with_suggestions(&self.suggestions)
            }
        }
    }
}
