//! Named text styles and their ANSI escape sequences
//!
//! Escapes are rendered by `termcolor`'s ANSI writer into a buffer, so they
//! match what a `StandardStream` would emit on a colour terminal.

use std::io;

use mixa_core::{MixinError, MixinResult};
use termcolor::{Ansi, Color, ColorSpec, WriteColor};

/// Style names accepted by [`escape`]
pub const STYLES: &[&str] = &[
    "bold", "underline", "italic", "black", "red", "green", "yellow", "blue", "magenta", "cyan",
    "white", "reset",
];

fn color(name: &str) -> Option<Color> {
    Some(match name {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        _ => return None,
    })
}

/// Build a colour spec from style names
///
/// A later colour replaces an earlier one. `reset` clears everything given
/// before it.
pub fn spec<S: AsRef<str>>(styles: &[S]) -> MixinResult<ColorSpec> {
    let mut spec = ColorSpec::new();
    for style in styles {
        match style.as_ref() {
            "bold" => {
                spec.set_bold(true);
            }
            "underline" => {
                spec.set_underline(true);
            }
            "italic" => {
                spec.set_italic(true);
            }
            "reset" => spec.clear(),
            other => match color(other) {
                Some(c) => {
                    spec.set_fg(Some(c));
                }
                None => {
                    return Err(MixinError::ArgumentError(format!(
                        "unknown console style `{}`",
                        other
                    )))
                }
            },
        }
    }
    Ok(spec)
}

fn render(f: impl FnOnce(&mut Ansi<Vec<u8>>) -> io::Result<()>) -> MixinResult<String> {
    let mut out = Ansi::new(Vec::new());
    f(&mut out).map_err(|e| MixinError::Raised(e.to_string()))?;
    String::from_utf8(out.into_inner()).map_err(|e| MixinError::Raised(e.to_string()))
}

/// Escape sequence switching the terminal to `styles`
pub fn escape<S: AsRef<str>>(styles: &[S]) -> MixinResult<String> {
    let spec = spec(styles)?;
    render(|out| out.set_color(&spec))
}

/// Escape sequence restoring the default style
pub fn reset() -> MixinResult<String> {
    render(|out| out.reset())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_sequence() {
        assert_eq!(reset().unwrap(), "\x1b[0m");
    }

    #[test]
    fn test_bold_red() {
        let esc = escape(&["bold", "red"]).unwrap();
        assert!(esc.starts_with("\x1b[0m"));
        assert!(esc.contains("\x1b[1m"));
        assert!(esc.contains("\x1b[31m"));
    }

    #[test]
    fn test_later_colour_wins() {
        let spec = spec(&["red", "green"]).unwrap();
        assert_eq!(spec.fg(), Some(&Color::Green));
    }

    #[test]
    fn test_reset_clears_earlier_styles() {
        let spec = spec(&["bold", "reset", "cyan"]).unwrap();
        assert!(!spec.bold());
        assert_eq!(spec.fg(), Some(&Color::Cyan));
    }

    #[test]
    fn test_every_listed_style_is_known() {
        for style in STYLES {
            assert!(escape(&[*style]).is_ok(), "{}", style);
        }
    }

    #[test]
    fn test_unknown_style() {
        assert!(matches!(
            escape(&["sparkly"]),
            Err(MixinError::ArgumentError(_))
        ));
    }
}
