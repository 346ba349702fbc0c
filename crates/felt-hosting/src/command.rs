use felt_core::Chips;
use felt_core::Position;
use serde::Deserialize;

/// A client intent, one newline-free JSON object per frame.
///
/// The `type` tag selects the variant; unknown tags surface as
/// `UNKNOWN_COMMAND`, unparseable frames as `BAD_MESSAGE`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    ListTables,
    #[serde(rename_all = "camelCase")]
    JoinTable { table_id: String },
    CreateTable {
        name: String,
    },
    #[serde(rename_all = "camelCase")]
    Sit {
        table_id: String,
        seat: Position,
        chips: Option<Chips>,
        player_id: Option<String>,
    },
    Leave,
    SitOut,
    SitIn,
    Action {
        action: ActionKind,
        amount: Option<Chips>,
    },
    #[serde(rename_all = "camelCase")]
    Attach { user_id: String },
    #[serde(rename_all = "camelCase")]
    Reattach { session_id: String },
}

/// The client-facing action vocabulary. `BET`/`RAISE` carry an amount;
/// the engine normalizes tags against the live pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    #[serde(rename = "ALLIN")]
    AllIn,
}

impl ActionKind {
    pub fn needs_amount(&self) -> bool {
        matches!(self, Self::Bet | Self::Raise)
    }
}

/// Two-stage parse so malformed JSON and unknown commands get distinct
/// error codes.
pub enum ParseError {
    /// Frame is not a JSON object (or not JSON at all).
    BadMessage,
    /// Valid JSON, but not a command we know.
    UnknownCommand,
}

pub fn parse(frame: &str) -> Result<Command, ParseError> {
    let value: serde_json::Value =
        serde_json::from_str(frame).map_err(|_| ParseError::BadMessage)?;
    if !value.is_object() {
        return Err(ParseError::BadMessage);
    }
    serde_json::from_value(value).map_err(|_| ParseError::UnknownCommand)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_tables() {
        let cmd = parse(r#"{"type":"LIST_TABLES"}"#).ok().unwrap();
        assert_eq!(cmd, Command::ListTables);
    }

    #[test]
    fn parses_sit_with_options() {
        let cmd = parse(
            r#"{"type":"SIT","tableId":"holdem-low-1","seat":3,"chips":1000,"playerId":"Alice"}"#,
        )
        .ok()
        .unwrap();
        assert_eq!(
            cmd,
            Command::Sit {
                table_id: "holdem-low-1".into(),
                seat: 3,
                chips: Some(1000),
                player_id: Some("Alice".into()),
            }
        );
    }

    #[test]
    fn parses_action_tags() {
        let cmd = parse(r#"{"type":"ACTION","action":"ALLIN"}"#).ok().unwrap();
        assert_eq!(cmd, Command::Action { action: ActionKind::AllIn, amount: None });
        let cmd = parse(r#"{"type":"ACTION","action":"RAISE","amount":30}"#).ok().unwrap();
        assert_eq!(
            cmd,
            Command::Action { action: ActionKind::Raise, amount: Some(30) }
        );
    }

    #[test]
    fn malformed_frame_is_bad_message() {
        assert!(matches!(parse("not json"), Err(ParseError::BadMessage)));
        assert!(matches!(parse(r#"[1,2,3]"#), Err(ParseError::BadMessage)));
    }

    #[test]
    fn unknown_type_is_unknown_command() {
        assert!(matches!(
            parse(r#"{"type":"DANCE"}"#),
            Err(ParseError::UnknownCommand)
        ));
    }
}
