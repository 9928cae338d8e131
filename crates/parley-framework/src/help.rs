//! Help listing rendering.

use std::fmt::Write as _;

use parley_core::{CommandDescriptor, CommandType, OptionType};

/// Heading of the help listing.
pub const HELP_HEADING: &str = "**Available commands**";

/// Renders a usage line for one command, e.g. `` `/remind <when> [note]` ``.
pub fn format_usage(desc: &CommandDescriptor) -> String {
    match desc.kind {
        CommandType::ChatInput => {
            let mut usage = format!("/{}", desc.name);
            let has_subcommands = desc
                .options
                .iter()
                .any(|o| matches!(o.kind, OptionType::SubCommand | OptionType::SubCommandGroup));

            if has_subcommands {
                let names: Vec<&str> = desc.options.iter().map(|o| o.name.as_str()).collect();
                let _ = write!(usage, " {{{}}}", names.join("|"));
            } else {
                for opt in &desc.options {
                    if opt.required {
                        let _ = write!(usage, " <{}>", opt.name);
                    } else {
                        let _ = write!(usage, " [{}]", opt.name);
                    }
                }
            }
            format!("`{usage}`")
        }
        CommandType::User => format!("`{}` (user menu)", desc.name),
        CommandType::Message => format!("`{}` (message menu)", desc.name),
    }
}

/// Renders a set of commands as a single text block, one line per command,
/// in the order given.
pub fn format_command_set<'a>(commands: impl IntoIterator<Item = &'a CommandDescriptor>) -> String {
    let mut out = String::from(HELP_HEADING);
    for desc in commands {
        out.push('\n');
        out.push_str(&format_usage(desc));
        if !desc.description.is_empty() {
            out.push_str(" - ");
            out.push_str(&desc.description);
        }
    }
    out
}
