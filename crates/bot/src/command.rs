//! Parsing of command text and callback data.

/// Callback data carried by the unlink confirmation buttons.
pub const UNLINK_CONFIRM: &str = "unlink_confirm";
pub const UNLINK_CANCEL: &str = "unlink_cancel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start { payload: Option<String> },
    Help,
    Tasks,
    Today,
    Streak,
    Leaderboard,
    Unlink,
    Unknown(String),
}

impl Command {
    /// Parse a message text.
    ///
    /// Returns `None` for plain text and for commands addressed to a
    /// different bot (`/start@other_bot`).
    pub fn parse(text: &str, bot_username: &str) -> Option<Command> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let (head, payload) = match rest.split_once(char::is_whitespace) {
            Some((head, payload)) => (head, payload.trim()),
            None => (rest, ""),
        };

        let name = match head.split_once('@') {
            Some((name, target)) => {
                let ours = bot_username.trim_start_matches('@');
                if !target.eq_ignore_ascii_case(ours) {
                    return None;
                }
                name
            }
            None => head,
        };

        Some(match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start {
                payload: payload
                    .split_whitespace()
                    .next()
                    .map(str::to_string),
            },
            "help" => Command::Help,
            "tasks" => Command::Tasks,
            "today" => Command::Today,
            "streak" => Command::Streak,
            "leaderboard" => Command::Leaderboard,
            "unlink" => Command::Unlink,
            other => Command::Unknown(other.to_string()),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Start { .. } => "start",
            Command::Help => "help",
            Command::Tasks => "tasks",
            Command::Today => "today",
            Command::Streak => "streak",
            Command::Leaderboard => "leaderboard",
            Command::Unlink => "unlink",
            Command::Unknown(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    UnlinkConfirm,
    UnlinkCancel,
    Unknown(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> CallbackAction {
        match data.trim() {
            UNLINK_CONFIRM => CallbackAction::UnlinkConfirm,
            UNLINK_CANCEL => CallbackAction::UnlinkCancel,
            other => CallbackAction::Unknown(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "chatlink_bot";

    #[test]
    fn start_with_and_without_payload() {
        assert_eq!(
            Command::parse("/start AB12CD34", BOT),
            Some(Command::Start {
                payload: Some("AB12CD34".into())
            })
        );
        assert_eq!(
            Command::parse("/start", BOT),
            Some(Command::Start { payload: None })
        );
        assert_eq!(
            Command::parse("  /start   \n", BOT),
            Some(Command::Start { payload: None })
        );
    }

    #[test]
    fn bot_suffix_must_match() {
        assert_eq!(Command::parse("/tasks@Chatlink_Bot", BOT), Some(Command::Tasks));
        assert_eq!(Command::parse("/tasks@other_bot", BOT), None);
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(Command::parse("hello there", BOT), None);
        assert_eq!(Command::parse("", BOT), None);
    }

    #[test]
    fn unknown_commands_are_kept() {
        assert_eq!(
            Command::parse("/Dance now", BOT),
            Some(Command::Unknown("dance".into()))
        );
    }

    #[test]
    fn callback_actions() {
        assert_eq!(CallbackAction::parse("unlink_confirm"), CallbackAction::UnlinkConfirm);
        assert_eq!(CallbackAction::parse("unlink_cancel"), CallbackAction::UnlinkCancel);
        assert_eq!(
            CallbackAction::parse("vote_42"),
            CallbackAction::Unknown("vote_42".into())
        );
    }
}
