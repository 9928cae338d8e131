//! # Parley Core
//!
//! Foundation types for the Parley interaction gateway.
//!
//! This crate provides:
//! - **Interaction model**: decoding of inbound webhook payloads ([`Interaction`])
//! - **Response model**: the structured reply handed back to the platform
//!   ([`InteractionResponse`])
//! - **Command descriptors**: metadata published to the platform and rendered
//!   in help listings ([`CommandDescriptor`])
//! - **Verification**: the Ed25519 admission gate ([`verify`], [`Verifier`])
//! - **Errors**: the closed error taxonomy shared by the upper layers
//!
//! ```text
//! raw request ──▶ verify() ──▶ Interaction::from_json() ──▶ router ──▶ InteractionResponse
//! ```

pub mod command;
pub mod error;
pub mod interaction;
pub mod response;
pub mod verify;

pub use command::{
    CommandDescriptor, CommandType, HELP_COMMAND, OptionChoice, OptionDescriptor, OptionType,
};
pub use error::{
    ParseError, ParseResult, RegistrationError, RegistrationResult, VerifyError, VerifyResult,
};
pub use interaction::{
    CommandData, CommandInteraction, CommandOptionValue, ComponentData, ComponentInteraction,
    Interaction, InteractionMeta, InteractionType, Member, ModalSubmitData,
    ModalSubmitInteraction, PartialGuild, PingInteraction, User,
};
pub use response::{
    AutocompleteChoice, InteractionResponse, MessageFlags, ResponseData, ResponseType,
};
pub use verify::{SIGNATURE_HEADER, TIMESTAMP_HEADER, Verifier, verify};
