use crossterm::style::Color;
use hist_core::error::{Error, Result};

/// Converts a color name such as `darkcyan` to a terminal color.
///
/// # Errors
///
/// Returns an error if the name is not one of the sixteen standard colors.
pub fn color_from_name(name: &str) -> Result<Color> {
    Ok(match name.to_lowercase().as_str() {
        "black" => Color::Black,
        "darkgrey" => Color::DarkGrey,
        "red" => Color::Red,
        "darkred" => Color::DarkRed,
        "green" => Color::Green,
        "darkgreen" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "darkyellow" => Color::DarkYellow,
        "blue" => Color::Blue,
        "darkblue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "darkmagenta" => Color::DarkMagenta,
        "cyan" => Color::Cyan,
        "darkcyan" => Color::DarkCyan,
        "white" => Color::White,
        "grey" => Color::Grey,
        _ => return Err(Error::UnknownColorName(name.to_string())),
    })
}

/// Colors used when drawing the selection region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Foreground of characters that matched the query
    pub highlight: Color,
    pub selected_foreground: Color,
    pub selected_background: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            highlight: Color::Cyan,
            selected_foreground: Color::Yellow,
            selected_background: Color::DarkBlue,
        }
    }
}

impl Theme {
    /// The default theme, with the match highlight replaced by `name` if given.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a known color.
    pub fn with_highlight(name: Option<&str>) -> Result<Self> {
        let mut theme = Self::default();
        if let Some(name) = name {
            theme.highlight = color_from_name(name)?;
        }
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_names_ignore_case() {
        assert_eq!(color_from_name("DarkCyan").unwrap(), Color::DarkCyan);
        assert_eq!(color_from_name("grey").unwrap(), Color::Grey);
    }

    #[test]
    fn test_unknown_color_name() {
        match color_from_name("chartreuse") {
            Err(Error::UnknownColorName(name)) => assert_eq!(name, "chartreuse"),
            other => panic!("Expected UnknownColorName, got {other:?}"),
        }
    }

    #[test]
    fn test_theme_with_highlight() {
        assert_eq!(Theme::with_highlight(None).unwrap(), Theme::default());
        assert_eq!(
            Theme::with_highlight(Some("magenta")).unwrap().highlight,
            Color::Magenta
        );
        assert!(Theme::with_highlight(Some("nope")).is_err());
    }
}
