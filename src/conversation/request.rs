//! Dialogflow webhook request payload.
//!
//! Only the fields the fulfillment reads are modelled; everything else in
//! the request is ignored. All fields are optional so a sparse request
//! still parses.

use super::intent::Intent;
use serde::Deserialize;

/// Name of the argument carrying the permission prompt result.
const PERMISSION_ARGUMENT: &str = "PERMISSION";

/// A Dialogflow v2 fulfillment request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    #[serde(default)]
    pub response_id: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub query_result: QueryResult,
    #[serde(default)]
    pub original_detect_intent_request: Option<OriginalDetectIntentRequest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub query_text: Option<String>,
    #[serde(default)]
    pub intent: Option<IntentRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRef {
    #[serde(default)]
    pub display_name: String,
}

/// The request as the Actions on Google platform sent it to Dialogflow.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalDetectIntentRequest {
    #[serde(default)]
    pub payload: Option<GooglePayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GooglePayload {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub inputs: Vec<Input>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    #[serde(default)]
    pub raw_inputs: Vec<RawInput>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInput {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text_value: Option<String>,
    #[serde(default)]
    pub bool_value: Option<bool>,
}

impl WebhookRequest {
    /// The intent Dialogflow matched for this turn.
    pub fn intent(&self) -> Intent {
        self.query_result
            .intent
            .as_ref()
            .map(|i| Intent::from_display_name(&i.display_name))
            .unwrap_or(Intent::Unknown)
    }

    fn payload(&self) -> Option<&GooglePayload> {
        self.original_detect_intent_request
            .as_ref()
            .and_then(|r| r.payload.as_ref())
    }

    fn first_input(&self) -> Option<&Input> {
        self.payload().and_then(|p| p.inputs.first())
    }

    /// What the user said this turn.
    ///
    /// Prefers the first raw argument's text, then the raw input query,
    /// then Dialogflow's own query text.
    pub fn utterance_text(&self) -> Option<&str> {
        let input = self.first_input();

        input
            .and_then(|i| i.arguments.first())
            .and_then(|a| a.text_value.as_deref())
            .or_else(|| {
                input
                    .and_then(|i| i.raw_inputs.first())
                    .and_then(|r| r.query.as_deref())
            })
            .or(self.query_result.query_text.as_deref())
    }

    /// Whether the user accepted the permission prompt.
    pub fn permission_granted(&self) -> bool {
        self.first_input()
            .into_iter()
            .flat_map(|i| i.arguments.iter())
            .find(|a| a.name == PERMISSION_ARGUMENT)
            .map(|a| {
                a.bool_value
                    .or_else(|| a.text_value.as_deref().map(|t| t == "true"))
                    .unwrap_or(false)
            })
            .unwrap_or(false)
    }

    /// The user's full display name, if the platform shared it.
    pub fn user_display_name(&self) -> Option<&str> {
        self.payload()
            .and_then(|p| p.user.as_ref())
            .and_then(|u| u.profile.as_ref())
            .and_then(|p| p.display_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERMISSION_GRANTED: &str = r#"{
        "responseId": "abc-123",
        "session": "projects/macros/agent/sessions/1",
        "queryResult": {
            "queryText": "actions_intent_PERMISSION",
            "intent": {"displayName": "actions_intent_PERMISSION"},
            "languageCode": "en"
        },
        "originalDetectIntentRequest": {
            "source": "google",
            "payload": {
                "user": {
                    "profile": {"displayName": "Jane Doe", "givenName": "Jane"},
                    "permissions": ["NAME"],
                    "locale": "en-US"
                },
                "inputs": [{
                    "intent": "actions.intent.PERMISSION",
                    "rawInputs": [{"inputType": "VOICE", "query": "yes"}],
                    "arguments": [{"name": "PERMISSION", "textValue": "true", "boolValue": true}]
                }]
            }
        }
    }"#;

    #[test]
    fn test_parse_permission_granted() {
        let request: WebhookRequest = serde_json::from_str(PERMISSION_GRANTED).unwrap();
        assert_eq!(request.intent(), Intent::PermissionResponse);
        assert!(request.permission_granted());
        assert_eq!(request.user_display_name(), Some("Jane Doe"));
    }

    #[test]
    fn test_permission_text_value_fallback() {
        let json = r#"{
            "queryResult": {"intent": {"displayName": "actions_intent_PERMISSION"}},
            "originalDetectIntentRequest": {"payload": {"inputs": [{
                "arguments": [{"name": "PERMISSION", "textValue": "false"}]
            }]}}
        }"#;
        let request: WebhookRequest = serde_json::from_str(json).unwrap();
        assert!(!request.permission_granted());
        assert_eq!(request.user_display_name(), None);
    }

    #[test]
    fn test_utterance_prefers_argument_text() {
        let json = r#"{
            "queryResult": {"queryText": "i ate one banana", "intent": {"displayName": "log food"}},
            "originalDetectIntentRequest": {"payload": {"inputs": [{
                "rawInputs": [{"query": "I ate one banana"}],
                "arguments": [{"name": "text", "textValue": "I ate 1 banana"}]
            }]}}
        }"#;
        let request: WebhookRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.intent(), Intent::LogFood);
        assert_eq!(request.utterance_text(), Some("I ate 1 banana"));
    }

    #[test]
    fn test_utterance_falls_back() {
        let raw_only = r#"{
            "queryResult": {"queryText": "query text"},
            "originalDetectIntentRequest": {"payload": {"inputs": [{
                "rawInputs": [{"query": "raw query"}]
            }]}}
        }"#;
        let request: WebhookRequest = serde_json::from_str(raw_only).unwrap();
        assert_eq!(request.utterance_text(), Some("raw query"));

        let dialogflow_only = r#"{"queryResult": {"queryText": "7 apples"}}"#;
        let request: WebhookRequest = serde_json::from_str(dialogflow_only).unwrap();
        assert_eq!(request.utterance_text(), Some("7 apples"));
        assert_eq!(request.intent(), Intent::Unknown);
    }

    #[test]
    fn test_empty_request_parses() {
        let request: WebhookRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.intent(), Intent::Unknown);
        assert_eq!(request.utterance_text(), None);
        assert!(!request.permission_granted());
    }
}
