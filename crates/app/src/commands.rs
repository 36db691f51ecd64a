use std::path::PathBuf;

use snafu::Snafu;

pub const HELP_TEXT: &str = "\
Commands:
  /new                 start a new conversation
  /list                list conversations (filtered by /search)
  /switch <n>          open conversation <n> from /list
  /delete <n>          delete conversation <n> from /list
  /search [text]       filter conversations by title; empty clears the filter
  /attach <path>       attach a file to the next question
  /detach              drop the pending attachment
  /send                send the pending attachment without a question
  /clear               remove all messages from this conversation
  /bottom              jump to the latest message
  /stream on|off       stream replies as they are generated
  /notifications       show notifications and the unread count
  /read-all            mark every notification as read
  /help                show this help
  /quit                exit
Anything else is sent to the assistant.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Send,
    New,
    List,
    Switch(usize),
    Delete(usize),
    Search(String),
    Attach(PathBuf),
    Detach,
    Clear,
    Bottom,
    Stream(bool),
    Notifications,
    MarkAllRead,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommandError {
    #[snafu(display("/{command} needs {expected}"))]
    MissingArgument {
        stage: &'static str,
        command: &'static str,
        expected: &'static str,
    },
    #[snafu(display("'{raw}' is not a conversation number"))]
    InvalidIndex { stage: &'static str, raw: String },
    #[snafu(display("unknown command /{name}, try /help"))]
    Unknown { stage: &'static str, name: String },
}

/// Parses one input line. Lines not starting with `/` are questions; blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Ask(line.to_string())));
    };

    let (name, argument) = match rest.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (rest, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "new" => Command::New,
        "list" | "ls" => Command::List,
        "switch" => Command::Switch(parse_index("switch", argument)?),
        "delete" | "rm" => Command::Delete(parse_index("delete", argument)?),
        "search" => Command::Search(argument.to_string()),
        "attach" => {
            if argument.is_empty() {
                return MissingArgumentSnafu {
                    stage: "parse-attach",
                    command: "attach",
                    expected: "a file path",
                }
                .fail();
            }
            Command::Attach(PathBuf::from(argument))
        }
        "detach" => Command::Detach,
        "send" => Command::Send,
        "clear" => Command::Clear,
        "bottom" => Command::Bottom,
        "stream" => match argument.to_ascii_lowercase().as_str() {
            "on" => Command::Stream(true),
            "off" => Command::Stream(false),
            _ => {
                return MissingArgumentSnafu {
                    stage: "parse-stream",
                    command: "stream",
                    expected: "'on' or 'off'",
                }
                .fail();
            }
        },
        "notifications" | "inbox" => Command::Notifications,
        "read-all" => Command::MarkAllRead,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => {
            return UnknownSnafu {
                stage: "parse-command",
                name: other.to_string(),
            }
            .fail();
        }
    };

    Ok(Some(command))
}

fn parse_index(command: &'static str, argument: &str) -> Result<usize, CommandError> {
    if argument.is_empty() {
        return MissingArgumentSnafu {
            stage: "parse-index",
            command,
            expected: "a conversation number",
        }
        .fail();
    }

    match argument.parse::<usize>() {
        Ok(index) if index > 0 => Ok(index),
        _ => InvalidIndexSnafu {
            stage: "parse-index",
            raw: argument.to_string(),
        }
        .fail(),
    }
}
