//! Console command parsing

use std::fmt;

/// Which text line a command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Main title
    Title,
    /// Line below the title
    Subtitle,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Subtitle => write!(f, "subtitle"),
        }
    }
}

/// One console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the text of a line
    SetText { target: Target, text: String },
    /// Switch the font of a line
    SetFont { target: Target, name: String },
    /// Print the font catalog
    ListFonts,
    /// Print the scene contents
    DumpScene,
    /// Leave the frame loop
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}' (try: title, subtitle, title-font, subtitle-font, fonts, scene, quit)")]
    Unknown(String),

    #[error("'{0}' needs a font name")]
    MissingFont(String),
}

impl Command {
    /// Parse a console line; blank lines yield `None`
    ///
    /// Text commands keep everything after the first space verbatim, so
    /// `title` on its own clears the line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Ok(None);
        }

        let trimmed = line.trim_start();
        let (word, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));

        let command = match word {
            "title" => Self::SetText { target: Target::Title, text: rest.to_string() },
            "subtitle" => Self::SetText { target: Target::Subtitle, text: rest.to_string() },
            "title-font" | "subtitle-font" => {
                let name = rest.trim();
                if name.is_empty() {
                    return Err(CommandError::MissingFont(word.to_string()));
                }
                let target = if word == "title-font" { Target::Title } else { Target::Subtitle };
                Self::SetFont { target, name: name.to_string() }
            }
            "fonts" => Self::ListFonts,
            "scene" => Self::DumpScene,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_commands_keep_spacing() {
        assert_eq!(
            Command::parse("title hello  world\n").unwrap(),
            Some(Command::SetText { target: Target::Title, text: "hello  world".into() })
        );
        assert_eq!(
            Command::parse("subtitle").unwrap(),
            Some(Command::SetText { target: Target::Subtitle, text: String::new() })
        );
    }

    #[test]
    fn test_font_commands() {
        assert_eq!(
            Command::parse("subtitle-font minecrafter-alt").unwrap(),
            Some(Command::SetFont { target: Target::Subtitle, name: "minecrafter-alt".into() })
        );
        assert_eq!(
            Command::parse("title-font   "),
            Err(CommandError::MissingFont("title-font".into()))
        );
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("fonts").unwrap(), Some(Command::ListFonts));
        assert_eq!(Command::parse("scene").unwrap(), Some(Command::DumpScene));
        assert_eq!(Command::parse("quit\r\n").unwrap(), Some(Command::Quit));
        assert!(matches!(Command::parse("rotate 90"), Err(CommandError::Unknown(_))));
    }
}
