//! Startup banner: "SMS-RELAY" in figlet's standard font with a gradient.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Signal Green (#16c60c).
const SIGNAL_GREEN: (u8, u8, u8) = (0x16, 0xc6, 0x0c);
/// Sky Blue (#3a96dd).
const SKY_BLUE: (u8, u8, u8) = (0x3a, 0x96, 0xdd);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Title art; a plain title if the font cannot be rendered.
fn render_title() -> String {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("SMS-RELAY").map(|figure| figure.to_string()))
        .unwrap_or_else(|| "SMS-RELAY\n".to_string())
}

/// Prints the banner, the version and the listen address.
pub fn print_welcome(listen_addr: &str) {
    let mut out = stdout();
    let art = render_title();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(SIGNAL_GREEN, SKY_BLUE, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: SKY_BLUE.0,
        g: SKY_BLUE.1,
        b: SKY_BLUE.2,
    }));
    let _ = out.execute(Print(format!("v{}  listen {}\r\n", version, listen_addr)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp_rgb(SIGNAL_GREEN, SKY_BLUE, 0.0), SIGNAL_GREEN);
        assert_eq!(lerp_rgb(SIGNAL_GREEN, SKY_BLUE, 1.0), SKY_BLUE);
    }

    #[test]
    fn test_title_renders_as_multiline_art() {
        let art = render_title();
        assert!(art.lines().count() > 1);
        assert!(art.lines().any(|line| !line.trim().is_empty()));
    }
}
