//! Outbound interaction responses.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of an interaction response.
///
/// Serialised as its integer wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ResponseType {
    /// Acknowledge a ping.
    Pong,
    /// Respond with a message.
    ChannelMessageWithSource,
    /// Acknowledge now, edit the original message later.
    DeferredChannelMessageWithSource,
    /// Acknowledge a component interaction without a visible change.
    DeferredUpdateMessage,
    /// Edit the message the component was attached to.
    UpdateMessage,
    /// Respond to an autocomplete query with choices.
    ApplicationCommandAutocompleteResult,
    /// Respond with a popup modal.
    Modal,
}

impl From<ResponseType> for u8 {
    fn from(kind: ResponseType) -> Self {
        match kind {
            ResponseType::Pong => 1,
            ResponseType::ChannelMessageWithSource => 4,
            ResponseType::DeferredChannelMessageWithSource => 5,
            ResponseType::DeferredUpdateMessage => 6,
            ResponseType::UpdateMessage => 7,
            ResponseType::ApplicationCommandAutocompleteResult => 8,
            ResponseType::Modal => 9,
        }
    }
}

impl TryFrom<u8> for ResponseType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Pong),
            4 => Ok(Self::ChannelMessageWithSource),
            5 => Ok(Self::DeferredChannelMessageWithSource),
            6 => Ok(Self::DeferredUpdateMessage),
            7 => Ok(Self::UpdateMessage),
            8 => Ok(Self::ApplicationCommandAutocompleteResult),
            9 => Ok(Self::Modal),
            other => Err(format!("unknown response type {other}")),
        }
    }
}

/// Message flag bitset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageFlags(u64);

impl MessageFlags {
    /// Do not include embeds when serialising the message.
    pub const SUPPRESS_EMBEDS: Self = Self(1 << 2);
    /// The message is urgent.
    pub const URGENT: Self = Self(1 << 4);
    /// Only the invoking user can see the message.
    pub const EPHEMERAL: Self = Self(1 << 6);

    /// Returns the raw bits.
    pub fn bits(self) -> u64 {
        self.0
    }

    /// Returns `true` if all bits of `other` are set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MessageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for MessageFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// A single autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteChoice {
    /// Label shown to the user.
    pub name: String,
    /// Value submitted when picked.
    pub value: Value,
}

impl AutocompleteChoice {
    /// Creates a choice whose value is a string.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Callback data carried by a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Message flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<MessageFlags>,
    /// Autocomplete suggestions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<AutocompleteChoice>>,
    /// Modal identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    /// Modal title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Message or modal components, as raw JSON.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Value>,
}

/// A response to an interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    /// Response kind.
    #[serde(rename = "type")]
    pub kind: ResponseType,
    /// Optional callback data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    /// Acknowledges a ping.
    pub fn pong() -> Self {
        Self {
            kind: ResponseType::Pong,
            data: None,
        }
    }

    /// Replies with a public message.
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: ResponseType::ChannelMessageWithSource,
            data: Some(ResponseData {
                content: Some(content.into()),
                ..Default::default()
            }),
        }
    }

    /// Replies with a message only the invoking user can see.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::message(content).with_flags(MessageFlags::EPHEMERAL)
    }

    /// Acknowledges now; the original message is edited later.
    pub fn deferred(ephemeral: bool) -> Self {
        Self {
            kind: ResponseType::DeferredChannelMessageWithSource,
            data: ephemeral.then(|| ResponseData {
                flags: Some(MessageFlags::EPHEMERAL),
                ..Default::default()
            }),
        }
    }

    /// Acknowledges a component or modal interaction without a visible change.
    pub fn deferred_update() -> Self {
        Self {
            kind: ResponseType::DeferredUpdateMessage,
            data: None,
        }
    }

    /// Answers an autocomplete query.
    pub fn autocomplete(choices: Vec<AutocompleteChoice>) -> Self {
        Self {
            kind: ResponseType::ApplicationCommandAutocompleteResult,
            data: Some(ResponseData {
                choices: Some(choices),
                ..Default::default()
            }),
        }
    }

    /// Opens a modal with the given action rows.
    pub fn modal(
        custom_id: impl Into<String>,
        title: impl Into<String>,
        components: Vec<Value>,
    ) -> Self {
        Self {
            kind: ResponseType::Modal,
            data: Some(ResponseData {
                custom_id: Some(custom_id.into()),
                title: Some(title.into()),
                components,
                ..Default::default()
            }),
        }
    }

    /// Adds message flags to the response data.
    pub fn with_flags(mut self, flags: MessageFlags) -> Self {
        let data = self.data.get_or_insert_with(ResponseData::default);
        let current = data.flags.unwrap_or_default();
        data.flags = Some(current | flags);
        self
    }

    /// Returns the message content, if any.
    pub fn content(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.content.as_deref())
    }

    /// Returns `true` if the response is only visible to the invoking user.
    pub fn is_ephemeral(&self) -> bool {
        self.data
            .as_ref()
            .and_then(|d| d.flags)
            .is_some_and(|f| f.contains(MessageFlags::EPHEMERAL))
    }
}
