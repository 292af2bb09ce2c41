use ratatui::style::Color;
use term_color_support::ColorSupport;

/// Colour depth the current terminal can display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    TrueColor,
    Ansi256,
    Basic,
}

impl Depth {
    pub fn detect() -> Depth {
        let support = ColorSupport::stdout();
        if support.has_16m {
            Depth::TrueColor
        } else if support.has_256 {
            Depth::Ansi256
        } else {
            Depth::Basic
        }
    }
}

/// Extends Ratatui's Color so the ANSI 16 look the same across terminals
pub trait WTMatch {
    /// Map to the Windows Terminal (Campbell) rendition at the given depth
    fn wtmatch(self, depth: Depth) -> Color;
}

impl WTMatch for Color {
    fn wtmatch(self, depth: Depth) -> Color {
        // Some(((R, G, B), ANSI_256_Index)) per Campbell sample
        let mapping = match self {
            Color::Black =>         Some(((12, 12, 12),   232)),
            Color::Red =>           Some(((197, 15, 31),  160)),
            Color::Green =>         Some(((19, 161, 14),  28)),
            Color::Yellow =>        Some(((193, 156, 0),  178)),
            Color::Blue =>          Some(((0, 55, 218),   20)),
            Color::Magenta =>       Some(((136, 23, 152), 90)),
            Color::Cyan =>          Some(((58, 150, 221), 38)),
            Color::Gray =>          Some(((204, 204, 204), 250)),
            Color::DarkGray =>      Some(((118, 118, 118), 243)),
            Color::LightRed =>      Some(((231, 72, 86),  203)),
            Color::LightGreen =>    Some(((22, 198, 12),  46)),
            Color::LightBlue =>     Some(((59, 120, 255), 63)),
            Color::White =>         Some(((242, 242, 242), 255)),
            _ => None,
        };

        match (mapping, depth) {
            (Some((rgb, _)), Depth::TrueColor) => Color::Rgb(rgb.0, rgb.1, rgb.2),
            (Some((_, index256)), Depth::Ansi256) => Color::Indexed(index256),
            _ => self,
        }
    }
}

/// A glyph and its foreground colour
pub type Glyph = (&'static str, Color);

/// Every colour and glyph the board renderer needs, resolved once per run
#[derive(Debug, Clone)]
pub struct Palette {
    pub hidden: Glyph,
    pub mine: Glyph,
    pub flag: Glyph,
    pub wrong_flag: Glyph,
    pub solution: Glyph,
    pub numbers: [Color; 8],
    pub board_bg: Color,
    pub cursor_bg: Color,
    pub exploded_bg: Color,
    pub indicator: Glyph,
    pub key_fg: Color,
}

impl Palette {
    pub fn new(ascii: bool, depth: Depth) -> Palette {
        let c = |color: Color| color.wtmatch(depth);
        Palette {
            hidden: (if ascii { "#" } else { "■" }, c(Color::Gray)),
            mine: (if ascii { "*" } else { "☼" }, c(Color::Black)),
            flag: (if ascii { "F" } else { "⚑" }, c(Color::Red)),
            wrong_flag: (if ascii { "X" } else { "✗" }, c(Color::LightRed)),
            solution: (if ascii { "+" } else { "◆" }, c(Color::Magenta)),
            // classic number colours 1..8
            numbers: [
                c(Color::Blue),
                c(Color::Green),
                c(Color::Red),
                c(Color::Magenta),
                c(Color::Yellow),
                c(Color::Cyan),
                c(Color::Black),
                c(Color::White),
            ],
            board_bg: c(Color::DarkGray),
            cursor_bg: c(Color::LightBlue),
            exploded_bg: c(Color::Red),
            indicator: ("▸", c(Color::Yellow)),
            key_fg: c(Color::Yellow),
        }
    }

    pub fn number(&self, n: u8) -> Color {
        self.numbers[(n as usize).clamp(1, 8) - 1]
    }
}
