// Cross-platform color matching utilities
// Maps the ANSI-16 palette onto consistent values for the detected terminal tier

use ratatui::style::Color;
use term_color_support::ColorSupport;

/// A trait to extend Ratatui's Color with cross-platform consistency methods.
pub trait WTMatch {
    /// Adjusts the color to match the Windows Terminal (Campbell) visual style
    /// based on the current terminal's color capabilities.
    fn wtmatch(self) -> Color;
}

/// Campbell RGB sample for a standard ANSI color, if it has one
fn campbell_rgb(c: Color) -> Option<(u8, u8, u8)> {
    match c {
        Color::Black => Some((12, 12, 12)),
        Color::Red => Some((197, 15, 31)),
        Color::Green => Some((19, 161, 14)),
        Color::Yellow => Some((193, 156, 0)),
        Color::Blue => Some((0, 55, 218)),
        Color::Magenta => Some((136, 23, 152)),
        Color::Cyan => Some((58, 150, 221)),
        Color::Gray => Some((204, 204, 204)),
        Color::DarkGray => Some((118, 118, 118)),
        Color::LightRed => Some((231, 72, 86)),
        Color::LightGreen => Some((22, 198, 12)),
        Color::LightYellow => Some((249, 241, 165)),
        Color::LightBlue => Some((59, 120, 255)),
        Color::LightMagenta => Some((180, 0, 158)),
        Color::LightCyan => Some((97, 214, 214)),
        Color::White => Some((242, 242, 242)),
        _ => None,
    }
}

/// Stable 256-color index closest to the Campbell sample
fn ansi256_index(c: Color) -> Option<u8> {
    match c {
        Color::Black => Some(232),
        Color::Red => Some(160),
        Color::Green => Some(28),
        Color::Yellow => Some(178),
        Color::Blue => Some(20),
        Color::Magenta => Some(90),
        Color::Cyan => Some(38),
        Color::Gray => Some(250),
        Color::DarkGray => Some(243),
        Color::LightRed => Some(203),
        Color::LightGreen => Some(46),
        Color::LightYellow => Some(229),
        Color::LightBlue => Some(63),
        Color::LightMagenta => Some(163),
        Color::LightCyan => Some(116),
        Color::White => Some(255),
        _ => None,
    }
}

impl WTMatch for Color {
    fn wtmatch(self) -> Color {
        // Detect terminal color support (TrueColor, 256, or Basic)
        let support = ColorSupport::stdout();

        if support.has_16m {
            // TrueColor: use the exact sampled RGB value
            if let Some((r, g, b)) = campbell_rgb(self) {
                return Color::Rgb(r, g, b);
            }
        } else if support.has_256 {
            // 256-color terminals (e.g., macOS Terminal): use a stable index
            if let Some(i) = ansi256_index(self) {
                return Color::Indexed(i);
            }
        }
        // Basic 16-color support, or a custom RGB/indexed color: return as-is
        self
    }
}
