//! Visible colors: CSS color parsing and the canvas themes.

/// 8-bit RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

const NAMED: &[(&str, Rgba)] = &[
    ("black", Rgba::rgb(0, 0, 0)),
    ("white", Rgba::rgb(255, 255, 255)),
    ("red", Rgba::rgb(255, 0, 0)),
    ("green", Rgba::rgb(0, 128, 0)),
    ("blue", Rgba::rgb(0, 0, 255)),
    ("yellow", Rgba::rgb(255, 255, 0)),
    ("orange", Rgba::rgb(255, 165, 0)),
    ("purple", Rgba::rgb(128, 0, 128)),
    ("pink", Rgba::rgb(255, 192, 203)),
    ("brown", Rgba::rgb(165, 42, 42)),
    ("cyan", Rgba::rgb(0, 255, 255)),
    ("magenta", Rgba::rgb(255, 0, 255)),
    ("gray", Rgba::rgb(128, 128, 128)),
    ("grey", Rgba::rgb(128, 128, 128)),
    ("lightgray", Rgba::rgb(211, 211, 211)),
    ("transparent", Rgba::rgba(0, 0, 0, 0)),
];

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`, or a basic CSS color
    /// name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.strip_prefix('#') {
            Some(hex) => Self::from_hex(hex),
            None => NAMED
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(s))
                .map(|&(_, c)| c),
        }
    }

    /// Parse, falling back to `fallback` for unknown strings.
    pub fn parse_or(s: &str, fallback: Rgba) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            log::trace!("unknown color {s:?}, using fallback");
            fallback
        })
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.as_bytes();
        let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
        let long = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);
        match bytes.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// CSS `rgba()` form for Canvas2D style strings.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {})",
            self.r,
            self.g,
            self.b,
            self.a as f64 / 255.0
        )
    }
}

/// Theme-dependent colors for the canvas renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub background: Rgba,
    pub grid: Rgba,
    pub node_border: Rgba,
    pub node_fallback: Rgba,
    pub selection: Rgba,
    pub connection: Rgba,
    pub preview: Rgba,
    pub label: Rgba,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            background: Rgba::rgb(255, 255, 255),
            grid: Rgba::rgb(229, 231, 235),
            node_border: Rgba::rgb(0, 0, 0),
            node_fallback: Rgba::rgb(128, 128, 128),
            selection: Rgba::rgb(255, 165, 0),
            connection: Rgba::rgb(55, 65, 81),
            preview: Rgba::rgba(55, 65, 81, 140),
            label: Rgba::rgb(17, 24, 39),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Rgba::rgb(28, 28, 30),
            grid: Rgba::rgba(255, 255, 255, 12),
            node_border: Rgba::rgb(229, 231, 235),
            node_fallback: Rgba::rgb(99, 99, 102),
            selection: Rgba::rgb(255, 159, 10),
            connection: Rgba::rgb(209, 213, 219),
            preview: Rgba::rgba(209, 213, 219, 140),
            label: Rgba::rgb(243, 244, 246),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
