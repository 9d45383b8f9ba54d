//! NLU service contract.
//!
//! The query layer only sees [`NluResponse`]; adapters such as
//! [`WatsonAssistant`] turn raw service payloads into it.

mod watson;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::Entity;

pub use watson::{WatsonAssistant, WatsonConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageInput {
    #[serde(default)]
    pub text: String,
}

/// One tagged span found in the input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeEntity {
    pub entity: String,
    pub value: String,
    #[serde(default)]
    pub confidence: f64,
}

impl RuntimeEntity {
    pub fn new(entity: Entity, value: impl Into<String>) -> Self {
        Self {
            entity: entity.tag().to_owned(),
            value: value.into(),
            confidence: 1.0,
        }
    }

    /// Category of this entity, if it is one the query layer knows.
    pub fn category(&self) -> Option<Entity> {
        Entity::from_tag(&self.entity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeIntent {
    pub intent: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Structured result of one NLU message call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NluResponse {
    #[serde(default)]
    pub input: MessageInput,
    #[serde(default)]
    pub entities: Vec<RuntimeEntity>,
    #[serde(default)]
    pub intents: Vec<RuntimeIntent>,
}

impl NluResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            input: MessageInput { text: text.into() },
            ..Self::default()
        }
    }

    pub fn with_entity(mut self, entity: Entity, value: impl Into<String>) -> Self {
        self.entities.push(RuntimeEntity::new(entity, value));
        self
    }

    pub fn with_intent(mut self, intent: impl Into<String>, confidence: f64) -> Self {
        self.intents.push(RuntimeIntent {
            intent: intent.into(),
            confidence,
        });
        self
    }

    pub fn text(&self) -> &str {
        &self.input.text
    }

    /// Values of every entity in `category`, in response order.
    pub fn values_of(&self, category: Entity) -> impl Iterator<Item = &str> + '_ {
        self.entities
            .iter()
            .filter(move |entity| entity.category() == Some(category))
            .map(|entity| entity.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NluErrorKind {
    Unavailable,
    Unauthorized,
    InvalidResponse,
}

/// Failure talking to the NLU service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NluError {
    kind: NluErrorKind,
    message: String,
}

impl NluError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: NluErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: NluErrorKind::Unauthorized,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: NluErrorKind::InvalidResponse,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> NluErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            NluErrorKind::Unavailable => "nlu.unavailable",
            NluErrorKind::Unauthorized => "nlu.unauthorized",
            NluErrorKind::InvalidResponse => "nlu.invalid_response",
        }
    }
}

impl Display for NluError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for NluError {}

/// Sends free text to an NLU service and returns its entities and intents.
pub trait NluClient: Send + Sync {
    fn message<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<NluResponse, NluError>> + Send + 'a>>;
}
