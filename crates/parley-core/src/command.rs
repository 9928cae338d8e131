//! Command descriptors.
//!
//! A [`CommandDescriptor`] is published to the platform's command
//! registration endpoint and rendered in the help listing. Its `name` is the
//! routing key; there is no separate alias, so the registered name cannot
//! drift from the name users type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Routing key of the synthesized help command.
pub const HELP_COMMAND: &str = "help";

/// Kind of an application command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CommandType {
    /// Slash command.
    #[default]
    ChatInput,
    /// Right-click user context menu entry.
    User,
    /// Right-click message context menu entry.
    Message,
}

impl From<CommandType> for u8 {
    fn from(kind: CommandType) -> Self {
        match kind {
            CommandType::ChatInput => 1,
            CommandType::User => 2,
            CommandType::Message => 3,
        }
    }
}

impl TryFrom<u8> for CommandType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::ChatInput),
            2 => Ok(Self::User),
            3 => Ok(Self::Message),
            other => Err(format!("unknown command type {other}")),
        }
    }
}

/// Type of a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OptionType {
    SubCommand,
    SubCommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

impl From<OptionType> for u8 {
    fn from(kind: OptionType) -> Self {
        match kind {
            OptionType::SubCommand => 1,
            OptionType::SubCommandGroup => 2,
            OptionType::String => 3,
            OptionType::Integer => 4,
            OptionType::Boolean => 5,
            OptionType::User => 6,
            OptionType::Channel => 7,
            OptionType::Role => 8,
            OptionType::Mentionable => 9,
            OptionType::Number => 10,
            OptionType::Attachment => 11,
        }
    }
}

impl TryFrom<u8> for OptionType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            1 => Self::SubCommand,
            2 => Self::SubCommandGroup,
            3 => Self::String,
            4 => Self::Integer,
            5 => Self::Boolean,
            6 => Self::User,
            7 => Self::Channel,
            8 => Self::Role,
            9 => Self::Mentionable,
            10 => Self::Number,
            11 => Self::Attachment,
            other => return Err(format!("unknown option type {other}")),
        })
    }
}

/// A fixed choice offered for an option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    /// Label.
    pub name: String,
    /// Submitted value.
    pub value: Value,
}

/// Describes one input of a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDescriptor {
    /// Option name.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Option type.
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// Whether the option must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Whether the platform should send autocomplete queries.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub autocomplete: bool,
    /// Fixed choices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
}

impl OptionDescriptor {
    /// Creates an optional option.
    pub fn new(name: impl Into<String>, kind: OptionType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            autocomplete: false,
            choices: Vec::new(),
        }
    }

    /// Marks the option as required.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Enables autocomplete for this option.
    pub fn autocomplete(mut self, enabled: bool) -> Self {
        self.autocomplete = enabled;
        self
    }

    /// Adds a fixed choice.
    pub fn choice(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.choices.push(OptionChoice {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// Metadata describing a command for registration and help rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    /// Command name; doubles as the routing key.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Command kind.
    #[serde(rename = "type", default)]
    pub kind: CommandType,
    /// Inputs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDescriptor>,
    /// Permission bitset required to see the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
    /// Whether the command is usable in direct messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dm_permission: Option<bool>,
}

impl CommandDescriptor {
    /// Creates a chat-input command descriptor.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: CommandType::ChatInput,
            options: Vec::new(),
            default_member_permissions: None,
            dm_permission: None,
        }
    }

    /// The descriptor of the synthesized help command.
    pub fn help() -> Self {
        Self::new(HELP_COMMAND, "Show all supported bot commands.")
    }

    /// Sets the command kind.
    pub fn kind(mut self, kind: CommandType) -> Self {
        self.kind = kind;
        self
    }

    /// Appends an option.
    pub fn option(mut self, option: OptionDescriptor) -> Self {
        self.options.push(option);
        self
    }

    /// Restricts the command to members holding the given permission bits.
    pub fn default_member_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.default_member_permissions = Some(permissions.into());
        self
    }

    /// Allows or forbids the command in direct messages.
    pub fn dm_permission(mut self, allowed: bool) -> Self {
        self.dm_permission = Some(allowed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_registration_json() {
        let desc = CommandDescriptor::new("hello", "Sends a greeting.").option(
            OptionDescriptor::new("name", OptionType::User, "Who to greet"),
        );

        let value = serde_json::to_value(&desc).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "hello",
                "description": "Sends a greeting.",
                "type": 1,
                "options": [{
                    "name": "name",
                    "description": "Who to greet",
                    "type": 6,
                    "required": false
                }]
            })
        );
    }

    #[test]
    fn test_help_descriptor() {
        let help = CommandDescriptor::help();
        assert_eq!(help.name, HELP_COMMAND);
        assert_eq!(help.kind, CommandType::ChatInput);
        assert!(help.options.is_empty());
    }

    #[test]
    fn test_option_builder() {
        let opt = OptionDescriptor::new("lang", OptionType::String, "Language")
            .required(true)
            .autocomplete(true)
            .choice("Rust", "rust");
        assert!(opt.required);
        assert!(opt.autocomplete);
        assert_eq!(opt.choices.len(), 1);
    }
}
