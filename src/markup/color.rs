//! Colour strings
//!
//! Accepted forms: `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
//! `rgba(r, g, b, a)` with `a` in `0..=1`, and the basic terminal colour
//! names. Alpha is validated but terminals cannot blend, so it is dropped.

use std::sync::LazyLock;

use crossterm::style::Color;
use regex::Regex;

static FUNCTIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([0-9.]+)\s*)?\)$")
        .expect("functional colour pattern")
});

/// Decode a colour string
pub fn decode_color(input: &str) -> Option<Color> {
    let input = input.trim();
    if let Some(hex) = input.strip_prefix('#') {
        return decode_hex(hex);
    }
    if let Some(caps) = FUNCTIONAL.captures(input) {
        let channel = |i: usize| caps.get(i)?.as_str().parse::<u8>().ok();
        let (r, g, b) = (channel(1)?, channel(2)?, channel(3)?);
        let has_alpha = input.starts_with("rgba");
        match (has_alpha, caps.get(4)) {
            (true, Some(alpha)) => {
                let alpha: f32 = alpha.as_str().parse().ok()?;
                if !(0.0..=1.0).contains(&alpha) {
                    return None;
                }
            }
            (false, None) => {}
            _ => return None,
        }
        return Some(Color::Rgb { r, g, b });
    }
    named(input)
}

fn decode_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|n| n * 17);
            Some(Color::Rgb {
                r: nibble(0)?,
                g: nibble(1)?,
                b: nibble(2)?,
            })
        }
        6 | 8 => Some(Color::Rgb {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
        }),
        _ => None,
    }
}

fn named(name: &str) -> Option<Color> {
    let color = match name.to_ascii_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::DarkRed,
        "green" => Color::DarkGreen,
        "yellow" => Color::DarkYellow,
        "blue" => Color::DarkBlue,
        "magenta" => Color::DarkMagenta,
        "cyan" => Color::DarkCyan,
        "white" => Color::Grey,
        "gray" | "grey" => Color::DarkGrey,
        "bright-red" => Color::Red,
        "bright-green" => Color::Green,
        "bright-yellow" => Color::Yellow,
        "bright-blue" => Color::Blue,
        "bright-magenta" => Color::Magenta,
        "bright-cyan" => Color::Cyan,
        "bright-white" => Color::White,
        _ => return None,
    };
    Some(color)
}
