//! Slash command parsing.

use std::path::PathBuf;

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Clear,
    /// Switch mood; `None` lists the moods.
    Mood(Option<String>),
    Quit,
    /// Switch theme; `None` cycles to the next one.
    Theme(Option<String>),
    Temperature(f64),
    Style(String),
    Speech(bool),
    Export(Option<PathBuf>),
    Summary,
    Stats,
    Dream,
    /// Restore the default persona and temperature.
    Reset,
}

/// One line per command, shown by `/help`.
pub const HELP_LINES: &[(&str, &str)] = &[
    ("/help", "show this list"),
    ("/clear", "clear the conversation"),
    ("/mood [name]", "switch mood, or list moods"),
    ("/theme [name]", "switch theme (Dark, Light, Blue)"),
    ("/temp <value>", "set creativity between 0.1 and 2.0"),
    ("/style <text>", "replace the persona description"),
    ("/tts on|off", "toggle speech"),
    ("/export [path]", "save the conversation to a text file"),
    ("/summary", "summarize this session"),
    ("/stats", "show relationship stats"),
    ("/dream", "enter dreamwalker mode"),
    ("/reset", "restore the default persona and temperature"),
    ("/quit", "say goodbye and exit"),
];

/// Parse `input` as a slash command.
///
/// `Ok(None)` means the input is an ordinary message. `Err` carries a
/// notice for the user.
pub fn parse_command(input: &str) -> Result<Option<Command>, String> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return Ok(None);
    }
    let body = trimmed.trim_start_matches('/');
    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };
    if name.is_empty() {
        return Ok(None);
    }
    let argument = (!rest.is_empty()).then(|| rest.to_string());
    match name.to_lowercase().as_str() {
        "help" => Ok(Some(Command::Help)),
        "clear" => Ok(Some(Command::Clear)),
        "mood" => Ok(Some(Command::Mood(argument))),
        "moods" => Ok(Some(Command::Mood(None))),
        "quit" | "exit" => Ok(Some(Command::Quit)),
        "theme" => Ok(Some(Command::Theme(argument))),
        "temp" | "temperature" => {
            let Some(value) = argument else {
                return Err("usage: /temp <value between 0.1 and 2.0>".to_string());
            };
            value
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| Some(Command::Temperature(value)))
                .ok_or_else(|| format!("'{value}' is not a number. usage: /temp <0.1-2.0>"))
        }
        "style" => match argument {
            Some(style) => Ok(Some(Command::Style(style))),
            None => Err("usage: /style <persona description>".to_string()),
        },
        "tts" | "speech" => match argument.as_deref().map(str::to_lowercase).as_deref() {
            Some("on") => Ok(Some(Command::Speech(true))),
            Some("off") => Ok(Some(Command::Speech(false))),
            _ => Err("usage: /tts on|off".to_string()),
        },
        "export" => Ok(Some(Command::Export(argument.map(PathBuf::from)))),
        "summary" => Ok(Some(Command::Summary)),
        "stats" => Ok(Some(Command::Stats)),
        "dream" | "dreamwalker" => Ok(Some(Command::Dream)),
        "enter" if rest.eq_ignore_ascii_case("dreamwalker") => Ok(Some(Command::Dream)),
        "reset" => Ok(Some(Command::Reset)),
        _ => Err(format!("Unknown command '/{name}'. Type /help for the list.")),
    }
}

/// Plain-language phrases that act like commands.
pub fn parse_phrase(input: &str) -> Option<Command> {
    match input.trim().to_lowercase().as_str() {
        "clear chat" => Some(Command::Clear),
        "enter dreamwalker" => Some(Command::Dream),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Command, parse_command, parse_phrase};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(parse_command("hello there"), Ok(None));
        assert_eq!(parse_command("/"), Ok(None));
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(parse_command("/HELP"), Ok(Some(Command::Help)));
        assert_eq!(parse_command("/Exit"), Ok(Some(Command::Quit)));
        assert_eq!(
            parse_command("/mood Flirty"),
            Ok(Some(Command::Mood(Some("Flirty".to_string()))))
        );
        assert_eq!(parse_command("/mood"), Ok(Some(Command::Mood(None))));
        assert_eq!(parse_command("/moods"), Ok(Some(Command::Mood(None))));
    }

    #[test]
    fn arguments_are_parsed() {
        assert_eq!(parse_command("/temp 1.5"), Ok(Some(Command::Temperature(1.5))));
        assert!(parse_command("/temp warm").is_err());
        assert!(parse_command("/temp").is_err());
        assert_eq!(
            parse_command("/style  You are calm and wise. "),
            Ok(Some(Command::Style("You are calm and wise.".to_string())))
        );
        assert_eq!(parse_command("/tts OFF"), Ok(Some(Command::Speech(false))));
        assert!(parse_command("/tts maybe").is_err());
        assert_eq!(
            parse_command("/export /tmp/chat.txt"),
            Ok(Some(Command::Export(Some(PathBuf::from("/tmp/chat.txt")))))
        );
        assert_eq!(parse_command("/theme"), Ok(Some(Command::Theme(None))));
    }

    #[test]
    fn unknown_command_points_to_help() {
        assert_eq!(
            parse_command("/dance"),
            Err("Unknown command '/dance'. Type /help for the list.".to_string())
        );
    }

    #[test]
    fn slash_phrases_are_commands() {
        assert_eq!(parse_command("/clear chat"), Ok(Some(Command::Clear)));
        assert_eq!(parse_command("/enter dreamwalker"), Ok(Some(Command::Dream)));
        assert_eq!(parse_command("/Enter Dreamwalker"), Ok(Some(Command::Dream)));
        assert!(parse_command("/enter").is_err());
        assert_eq!(parse_command("/reset"), Ok(Some(Command::Reset)));
    }

    #[test]
    fn phrases_map_to_commands() {
        assert_eq!(parse_phrase("Clear Chat"), Some(Command::Clear));
        assert_eq!(parse_phrase("enter dreamwalker"), Some(Command::Dream));
        assert_eq!(parse_phrase("clear chat please"), None);
    }
}
