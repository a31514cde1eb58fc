//! Conversational replies and their Dialogflow fulfillment encoding.

use serde::Serialize;

/// Platform intent that asks the user for a permission.
const PERMISSION_INTENT: &str = "actions.intent.PERMISSION";

/// Type tag of the permission helper's value spec.
const PERMISSION_VALUE_SPEC: &str = "type.googleapis.com/google.actions.v2.PermissionValueSpec";

/// Speech shown while the platform renders its own permission prompt.
const PERMISSION_PLACEHOLDER: &str = "PLACEHOLDER_FOR_PERMISSION";

/// A permission request attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    /// Spoken before the platform's "can I get your name" question.
    pub context: String,
    /// Requested permissions, e.g. `NAME`.
    pub permissions: Vec<String>,
}

/// What the webhook says back for one turn.
///
/// A reply always has at least one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    messages: Vec<String>,
    suggestions: Vec<String>,
    permission: Option<PermissionRequest>,
}

impl Reply {
    /// Start a reply with its first message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            messages: vec![message.into()],
            suggestions: Vec::new(),
            permission: None,
        }
    }

    /// A reply consisting only of a permission prompt.
    pub fn permission(context: impl Into<String>, permissions: &[&str]) -> Self {
        let context = context.into();
        Self {
            messages: vec![context.clone()],
            suggestions: Vec::new(),
            permission: Some(PermissionRequest {
                context,
                permissions: permissions.iter().map(|p| p.to_string()).collect(),
            }),
        }
    }

    /// Append another message.
    pub fn then(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Attach suggestion chips.
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions.extend(suggestions.into_iter().map(Into::into));
        self
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn permission_request(&self) -> Option<&PermissionRequest> {
        self.permission.as_ref()
    }

    /// All messages joined into one text block.
    pub fn text(&self) -> String {
        self.messages.join("\n")
    }

    /// Encode as a Dialogflow v2 webhook response with an Actions on
    /// Google payload.
    pub fn to_fulfillment(&self) -> FulfillmentResponse {
        let items = match self.permission {
            Some(_) => vec![RichItem::speech(PERMISSION_PLACEHOLDER)],
            None => self.messages.iter().map(|m| RichItem::speech(m)).collect(),
        };

        let system_intent = self.permission.as_ref().map(|p| SystemIntent {
            intent: PERMISSION_INTENT.to_string(),
            data: PermissionValueSpec {
                type_url: PERMISSION_VALUE_SPEC.to_string(),
                opt_context: p.context.clone(),
                permissions: p.permissions.clone(),
            },
        });

        FulfillmentResponse {
            fulfillment_text: self.text(),
            payload: Payload {
                google: GoogleResponse {
                    expect_user_response: true,
                    rich_response: RichResponse {
                        items,
                        suggestions: self
                            .suggestions
                            .iter()
                            .map(|title| Suggestion {
                                title: title.clone(),
                            })
                            .collect(),
                    },
                    system_intent,
                },
            },
        }
    }
}

/// Dialogflow v2 webhook response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResponse {
    pub fulfillment_text: String,
    pub payload: Payload,
}

#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    pub google: GoogleResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleResponse {
    pub expect_user_response: bool,
    pub rich_response: RichResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_intent: Option<SystemIntent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RichResponse {
    pub items: Vec<RichItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RichItem {
    pub simple_response: SimpleResponse,
}

impl RichItem {
    fn speech(text: &str) -> Self {
        Self {
            simple_response: SimpleResponse {
                text_to_speech: text.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleResponse {
    pub text_to_speech: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemIntent {
    pub intent: String,
    pub data: PermissionValueSpec,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionValueSpec {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub opt_context: String,
    pub permissions: Vec<String>,
}
