//! Inbound interaction payloads.
//!
//! Every webhook event carries an integer `type` discriminant. Decoding peeks
//! at that field first and then deserialises the matching variant in a single
//! pass, the same way an adapter picks the most specific event type:
//!
//! ```text
//! Interaction
//! ├── Ping                 type = 1
//! ├── ApplicationCommand   type = 2   data.name
//! ├── MessageComponent     type = 3   data.custom_id
//! ├── Autocomplete         type = 4   data.name (+ focused option)
//! └── ModalSubmit          type = 5   data.custom_id
//! ```
//!
//! Fields shared by all kinds live in [`InteractionMeta`] and are flattened
//! into each variant.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ParseError, ParseResult};

// ============================================================================
// Discriminant
// ============================================================================

/// The kind of an inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionType {
    /// Liveness check sent by the platform when the endpoint is configured.
    Ping,
    /// A slash command, user command or message command invocation.
    ApplicationCommand,
    /// A button click or select menu choice.
    MessageComponent,
    /// A keystroke in a command option that has autocomplete enabled.
    ApplicationCommandAutocomplete,
    /// A submitted modal form.
    ModalSubmit,
}

impl InteractionType {
    /// Maps a wire discriminant to an interaction type.
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Ping),
            2 => Some(Self::ApplicationCommand),
            3 => Some(Self::MessageComponent),
            4 => Some(Self::ApplicationCommandAutocomplete),
            5 => Some(Self::ModalSubmit),
            _ => None,
        }
    }

    /// Returns the wire discriminant.
    pub fn code(self) -> u8 {
        match self {
            Self::Ping => 1,
            Self::ApplicationCommand => 2,
            Self::MessageComponent => 3,
            Self::ApplicationCommandAutocomplete => 4,
            Self::ModalSubmit => 5,
        }
    }

    /// Returns a short name suitable for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::ApplicationCommand => "application_command",
            Self::MessageComponent => "message_component",
            Self::ApplicationCommandAutocomplete => "autocomplete",
            Self::ModalSubmit => "modal_submit",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Shared fields
// ============================================================================

/// A platform user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Snowflake id.
    pub id: String,
    /// Account name.
    #[serde(default)]
    pub username: String,
    /// Display name, if the user set one.
    #[serde(default)]
    pub global_name: Option<String>,
}

/// Guild membership of the invoking user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// The member's user object.
    #[serde(default)]
    pub user: Option<User>,
    /// Guild-specific nickname.
    #[serde(default)]
    pub nick: Option<String>,
    /// Role ids held by the member.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The partial guild object attached to guild interactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialGuild {
    /// Snowflake id.
    pub id: String,
    /// Preferred guild locale.
    #[serde(default)]
    pub locale: Option<String>,
}

/// Fields common to every interaction kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionMeta {
    /// Interaction id.
    #[serde(default)]
    pub id: String,
    /// Id of the application the interaction is for.
    #[serde(default)]
    pub application_id: String,
    /// Continuation token used for follow-up calls.
    #[serde(default)]
    pub token: String,
    /// Guild the interaction was sent from.
    #[serde(default)]
    pub guild_id: Option<String>,
    /// Partial guild object, present on newer payloads.
    #[serde(default)]
    pub guild: Option<PartialGuild>,
    /// Channel the interaction was sent from.
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Invoking user, for interactions outside a guild.
    #[serde(default)]
    pub user: Option<User>,
    /// Invoking member, for interactions inside a guild.
    #[serde(default)]
    pub member: Option<Member>,
    /// The invoking user's locale.
    #[serde(default)]
    pub locale: Option<String>,
}

impl InteractionMeta {
    /// Returns the guild id, preferring `guild_id` and falling back to the
    /// partial guild object.
    pub fn guild_id(&self) -> Option<&str> {
        self.guild_id
            .as_deref()
            .or_else(|| self.guild.as_ref().map(|g| g.id.as_str()))
    }

    /// Returns the invoking user whether or not the interaction came from a
    /// guild.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }
}

// ============================================================================
// Command / autocomplete
// ============================================================================

/// A resolved command option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOptionValue {
    /// Option name.
    pub name: String,
    /// Option type code.
    #[serde(rename = "type")]
    pub kind: u8,
    /// The supplied value, absent for sub-command groupings.
    #[serde(default)]
    pub value: Option<Value>,
    /// Nested options for sub-commands.
    #[serde(default)]
    pub options: Vec<CommandOptionValue>,
    /// Set on the option the user is typing in during autocomplete.
    #[serde(default)]
    pub focused: bool,
}

impl CommandOptionValue {
    /// Returns the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        self.value.as_ref().and_then(Value::as_i64)
    }
}

/// Payload data for command and autocomplete interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    /// Registered command id.
    #[serde(default)]
    pub id: String,
    /// Command name; this is the routing key.
    pub name: String,
    /// Command type code (1 = chat input).
    #[serde(rename = "type", default)]
    pub kind: Option<u8>,
    /// Supplied options.
    #[serde(default)]
    pub options: Vec<CommandOptionValue>,
}

impl CommandData {
    /// Finds a top-level option by name.
    pub fn option(&self, name: &str) -> Option<&CommandOptionValue> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Finds the focused option at any nesting depth.
    pub fn focused_option(&self) -> Option<&CommandOptionValue> {
        fn find(options: &[CommandOptionValue]) -> Option<&CommandOptionValue> {
            options
                .iter()
                .find_map(|o| if o.focused { Some(o) } else { find(&o.options) })
        }
        find(&self.options)
    }
}

/// An application command or autocomplete interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandInteraction {
    /// Shared fields.
    #[serde(flatten)]
    pub meta: InteractionMeta,
    /// Command data.
    pub data: CommandData,
}

impl CommandInteraction {
    /// Returns the command name.
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Returns the guild the command was invoked in, if any.
    pub fn guild_id(&self) -> Option<&str> {
        self.meta.guild_id()
    }
}

// ============================================================================
// Component / modal
// ============================================================================

/// Payload data for message component interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    /// Developer-defined opaque identifier.
    pub custom_id: String,
    /// Component type code (2 = button, 3 = string select, ...).
    #[serde(default)]
    pub component_type: u8,
    /// Selected values for select menus.
    #[serde(default)]
    pub values: Vec<String>,
}

/// A message component interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInteraction {
    /// Shared fields.
    #[serde(flatten)]
    pub meta: InteractionMeta,
    /// Component data.
    pub data: ComponentData,
}

impl ComponentInteraction {
    /// Returns the component's opaque identifier.
    pub fn custom_id(&self) -> &str {
        &self.data.custom_id
    }
}

/// Payload data for modal submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalSubmitData {
    /// Developer-defined opaque identifier of the modal.
    pub custom_id: String,
    /// Submitted action rows, kept as raw JSON.
    #[serde(default)]
    pub components: Vec<Value>,
}

impl ModalSubmitData {
    /// Returns the submitted value of the text input with `custom_id`.
    pub fn text_value(&self, custom_id: &str) -> Option<&str> {
        fn find<'a>(components: &'a [Value], custom_id: &str) -> Option<&'a str> {
            components.iter().find_map(|c| {
                if c.get("custom_id").and_then(Value::as_str) == Some(custom_id) {
                    return c.get("value").and_then(Value::as_str);
                }
                c.get("components")
                    .and_then(Value::as_array)
                    .and_then(|nested| find(nested, custom_id))
            })
        }
        find(&self.components, custom_id)
    }
}

/// A modal submit interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalSubmitInteraction {
    /// Shared fields.
    #[serde(flatten)]
    pub meta: InteractionMeta,
    /// Modal data.
    pub data: ModalSubmitData,
    /// The message carrying the component that opened the modal; absent when
    /// a command opened it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl ModalSubmitInteraction {
    /// Returns the modal's opaque identifier.
    pub fn custom_id(&self) -> &str {
        &self.data.custom_id
    }

    /// Returns `true` if the modal was opened from a message component.
    pub fn from_component(&self) -> bool {
        self.message.is_some()
    }
}

/// A ping interaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PingInteraction {
    /// Shared fields.
    #[serde(flatten)]
    pub meta: InteractionMeta,
}

// ============================================================================
// Interaction
// ============================================================================

/// A decoded inbound interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Liveness check.
    Ping(PingInteraction),
    /// Command invocation.
    ApplicationCommand(CommandInteraction),
    /// Component click or selection.
    MessageComponent(ComponentInteraction),
    /// Autocomplete query.
    Autocomplete(CommandInteraction),
    /// Modal submission.
    ModalSubmit(ModalSubmitInteraction),
}

impl Interaction {
    /// Decodes an interaction from the raw request body.
    pub fn from_json(raw: &str) -> ParseResult<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    /// Decodes an interaction from an already parsed JSON value.
    pub fn from_value(value: Value) -> ParseResult<Self> {
        let code = value
            .get("type")
            .and_then(Value::as_u64)
            .ok_or(ParseError::MissingType)?;
        let kind = InteractionType::from_code(code).ok_or(ParseError::UnknownType(code))?;

        Ok(match kind {
            InteractionType::Ping => Self::Ping(serde_json::from_value(value)?),
            InteractionType::ApplicationCommand => {
                Self::ApplicationCommand(serde_json::from_value(value)?)
            }
            InteractionType::MessageComponent => {
                Self::MessageComponent(serde_json::from_value(value)?)
            }
            InteractionType::ApplicationCommandAutocomplete => {
                Self::Autocomplete(serde_json::from_value(value)?)
            }
            InteractionType::ModalSubmit => Self::ModalSubmit(serde_json::from_value(value)?),
        })
    }

    /// Returns the interaction's discriminant.
    pub fn kind(&self) -> InteractionType {
        match self {
            Self::Ping(_) => InteractionType::Ping,
            Self::ApplicationCommand(_) => InteractionType::ApplicationCommand,
            Self::MessageComponent(_) => InteractionType::MessageComponent,
            Self::Autocomplete(_) => InteractionType::ApplicationCommandAutocomplete,
            Self::ModalSubmit(_) => InteractionType::ModalSubmit,
        }
    }

    /// Returns the fields shared by every kind.
    pub fn meta(&self) -> &InteractionMeta {
        match self {
            Self::Ping(i) => &i.meta,
            Self::ApplicationCommand(i) | Self::Autocomplete(i) => &i.meta,
            Self::MessageComponent(i) => &i.meta,
            Self::ModalSubmit(i) => &i.meta,
        }
    }
}

impl<'de> Deserialize<'de> for Interaction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_ping() {
        let interaction = Interaction::from_json(r#"{"type":1,"id":"1","token":"t"}"#).unwrap();
        assert_eq!(interaction.kind(), InteractionType::Ping);
        assert_eq!(interaction.meta().token, "t");
    }

    #[test]
    fn test_parse_command_with_guild_object() {
        let raw = json!({
            "type": 2,
            "id": "10",
            "application_id": "20",
            "token": "abc",
            "guild": { "id": "615745951184715806", "locale": "en-US" },
            "member": { "user": { "id": "7", "username": "ann" }, "roles": [] },
            "data": {
                "id": "99",
                "name": "hello",
                "type": 1,
                "options": [{ "name": "name", "type": 6, "value": "42" }]
            }
        });

        let Interaction::ApplicationCommand(cmd) = Interaction::from_value(raw).unwrap() else {
            panic!("expected application command");
        };
        assert_eq!(cmd.name(), "hello");
        assert_eq!(cmd.guild_id(), Some("615745951184715806"));
        assert_eq!(cmd.data.option("name").and_then(|o| o.as_str()), Some("42"));
        assert_eq!(cmd.meta.invoker().map(|u| u.username.as_str()), Some("ann"));
    }

    #[test]
    fn test_guild_id_field_takes_precedence() {
        let meta = InteractionMeta {
            guild_id: Some("1".into()),
            guild: Some(PartialGuild {
                id: "2".into(),
                locale: None,
            }),
            ..Default::default()
        };
        assert_eq!(meta.guild_id(), Some("1"));
    }

    #[test]
    fn test_parse_autocomplete_focused_option() {
        let raw = json!({
            "type": 4,
            "data": {
                "name": "search",
                "options": [{
                    "name": "sub",
                    "type": 1,
                    "options": [{ "name": "query", "type": 3, "value": "ru", "focused": true }]
                }]
            }
        });

        let Interaction::Autocomplete(cmd) = Interaction::from_value(raw).unwrap() else {
            panic!("expected autocomplete");
        };
        let focused = cmd.data.focused_option().unwrap();
        assert_eq!(focused.name, "query");
        assert_eq!(focused.as_str(), Some("ru"));
    }

    #[test]
    fn test_parse_component_and_modal() {
        let component = Interaction::from_json(
            r#"{"type":3,"data":{"custom_id":"alpha_beta","component_type":2}}"#,
        )
        .unwrap();
        assert_eq!(component.kind(), InteractionType::MessageComponent);

        let raw = json!({
            "type": 5,
            "data": {
                "custom_id": "feedback_form",
                "components": [{
                    "type": 1,
                    "components": [{ "type": 4, "custom_id": "body", "value": "great" }]
                }]
            }
        });
        let Interaction::ModalSubmit(modal) = Interaction::from_value(raw).unwrap() else {
            panic!("expected modal submit");
        };
        assert_eq!(modal.custom_id(), "feedback_form");
        assert_eq!(modal.data.text_value("body"), Some("great"));
        assert_eq!(modal.data.text_value("missing"), None);
        assert!(!modal.from_component());
    }

    #[test]
    fn test_parse_rejects_unknown_and_missing_type() {
        assert!(matches!(
            Interaction::from_json(r#"{"type":42}"#),
            Err(ParseError::UnknownType(42))
        ));
        assert!(matches!(
            Interaction::from_json(r#"{"id":"1"}"#),
            Err(ParseError::MissingType)
        ));
        assert!(matches!(
            Interaction::from_json("not json"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_deserialize_impl_matches_from_value() {
        let interaction: Interaction =
            serde_json::from_str(r#"{"type":2,"data":{"name":"help"}}"#).unwrap();
        assert_eq!(interaction.kind(), InteractionType::ApplicationCommand);
    }
}
