use colored::Color;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Colors used when painting a transcript.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub user_label: Color,
    pub assistant_label: Color,
    pub heading: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub chart: [Color; 6],
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                user_label: Color::BrightCyan,
                assistant_label: Color::BrightMagenta,
                heading: Color::BrightWhite,
                text: Color::White,
                muted: Color::BrightBlack,
                accent: Color::BrightBlue,
                chart: [
                    Color::BrightBlue,
                    Color::BrightMagenta,
                    Color::BrightGreen,
                    Color::BrightYellow,
                    Color::BrightCyan,
                    Color::BrightRed,
                ],
            },
            Theme::Light => Palette {
                user_label: Color::Blue,
                assistant_label: Color::Magenta,
                heading: Color::Black,
                text: Color::Black,
                muted: Color::BrightBlack,
                accent: Color::Blue,
                chart: [
                    Color::Blue,
                    Color::Magenta,
                    Color::Green,
                    Color::Yellow,
                    Color::Cyan,
                    Color::Red,
                ],
            },
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            _ => Err(format!("Unknown theme: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_round_trips() {
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::Dark.toggle().toggle(), Theme::Dark);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("LIGHT".parse::<Theme>(), Ok(Theme::Light));
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn palettes_differ_between_themes() {
        assert_ne!(Theme::Dark.palette(), Theme::Light.palette());
    }
}
