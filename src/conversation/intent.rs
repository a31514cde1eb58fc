//! Intent routing table.

use std::fmt;

/// The intents this webhook fulfills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    /// Conversation start; asks for the user's name.
    Welcome,
    /// Answer to the name permission prompt.
    PermissionResponse,
    /// "How much protein is in ..." style questions.
    NutritionQuery,
    /// "I ate ..." statements.
    LogFood,
    /// Anything the agent routed here that we don't handle.
    Unknown,
}

impl Intent {
    /// Map a Dialogflow intent display name to an intent.
    ///
    /// Accepts the agent's display names as well as the short kebab-case
    /// aliases.
    pub fn from_display_name(name: &str) -> Self {
        match name.trim() {
            "Default Welcome Intent" | "welcome" => Intent::Welcome,
            "actions_intent_PERMISSION" | "permission-response" => Intent::PermissionResponse,
            "nutrition data" | "nutrition-query" => Intent::NutritionQuery,
            "log food" | "log-food" => Intent::LogFood,
            _ => Intent::Unknown,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Welcome => write!(f, "welcome"),
            Intent::PermissionResponse => write!(f, "permission-response"),
            Intent::NutritionQuery => write!(f, "nutrition-query"),
            Intent::LogFood => write!(f, "log-food"),
            Intent::Unknown => write!(f, "unknown"),
        }
    }
}
