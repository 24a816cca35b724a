use std::{borrow::Cow, collections::BTreeMap, fmt};

use geom::{Insets, Size};
use unicode_width::UnicodeWidthStr;

use crate::error::{Error, Result};

/// A 24-bit RGB color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Pure black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Pure white.
    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    /// Construct a color from channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Construct a color from a packed `0xRRGGBB` value. Bits above the low 24
    /// are ignored.
    pub const fn from_u32(v: u32) -> Self {
        Self {
            r: ((v >> 16) & 0xff) as u8,
            g: ((v >> 8) & 0xff) as u8,
            b: (v & 0xff) as u8,
        }
    }

    /// The packed `0xRRGGBB` value.
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Parse a color from a hex string in the format `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::Config(format!("invalid hex color: {hex}")));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_u32)
            .map_err(|e| Error::Config(format!("invalid hex color {hex}: {e}")))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_u32())
    }
}

/// A font reference with the metrics layout needs. Glyphs are treated as
/// fixed-advance cells; wide characters take two cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Font {
    /// Font name, resolved by the drawing surface.
    pub name: String,
    /// Horizontal advance per display column.
    pub advance: u32,
    /// Height of one line.
    pub line_height: u32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            name: "default".into(),
            advance: 1,
            line_height: 1,
        }
    }
}

impl Font {
    /// Construct a font reference.
    pub fn new(name: &str, advance: u32, line_height: u32) -> Self {
        Self {
            name: name.into(),
            advance,
            line_height,
        }
    }

    /// The size of a block of text, one line per `\n`. Empty text is zero-sized.
    pub fn measure(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::zero();
        }
        let mut lines = 0u32;
        let mut columns = 0u32;
        for line in text.lines() {
            lines = lines.saturating_add(1);
            let w = u32::try_from(line.width()).unwrap_or(u32::MAX);
            columns = columns.max(w);
        }
        Size::new(
            columns.saturating_mul(self.advance),
            lines.saturating_mul(self.line_height),
        )
    }
}

/// Keys of a style map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleKey {
    /// Background fill color. Absent means transparent.
    Background,
    /// Text color. Defaults to white.
    Foreground,
    /// Text font. Defaults to a 1x1 cell font.
    Font,
    /// Space between the border and the content.
    Padding,
    /// Border widths.
    Border,
    /// Border color. Borders are not drawn without one.
    BorderColor,
}

impl StyleKey {
    /// Does a change to this key change a node's measured size?
    pub fn affects_size(self) -> bool {
        matches!(self, Self::Font | Self::Padding | Self::Border)
    }
}

/// Values stored in a style map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StyleValue {
    /// A color.
    Color(Color),
    /// A font.
    Font(Font),
    /// Edge insets.
    Insets(Insets),
}

/// An immutable style snapshot: a mapping from keys to values. Nodes hold
/// their style behind an `Arc`, so draw commands can share the snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    /// Stored entries.
    entries: BTreeMap<StyleKey, StyleValue>,
}

impl Style {
    /// An empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an entry. Mismatched key/value pairs are accepted here and ignored
    /// by the typed accessors, which fall back to defaults.
    pub fn with(mut self, key: StyleKey, value: StyleValue) -> Self {
        self.entries.insert(key, value);
        self
    }

    /// Set the background color.
    pub fn background(self, c: Color) -> Self {
        self.with(StyleKey::Background, StyleValue::Color(c))
    }

    /// Set the text color.
    pub fn foreground(self, c: Color) -> Self {
        self.with(StyleKey::Foreground, StyleValue::Color(c))
    }

    /// Set the font.
    pub fn font(self, f: Font) -> Self {
        self.with(StyleKey::Font, StyleValue::Font(f))
    }

    /// Set the padding.
    pub fn padding(self, i: Insets) -> Self {
        self.with(StyleKey::Padding, StyleValue::Insets(i))
    }

    /// Set border widths and color.
    pub fn border(self, i: Insets, c: Color) -> Self {
        self.with(StyleKey::Border, StyleValue::Insets(i))
            .with(StyleKey::BorderColor, StyleValue::Color(c))
    }

    /// Raw entry lookup.
    pub fn get(&self, key: StyleKey) -> Option<&StyleValue> {
        self.entries.get(&key)
    }

    /// Iterate over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StyleKey, &StyleValue)> {
        self.entries.iter()
    }

    /// A color entry.
    fn color(&self, key: StyleKey) -> Option<Color> {
        match self.entries.get(&key) {
            Some(StyleValue::Color(c)) => Some(*c),
            _ => None,
        }
    }

    /// An insets entry, zero when absent.
    fn insets(&self, key: StyleKey) -> Insets {
        match self.entries.get(&key) {
            Some(StyleValue::Insets(i)) => *i,
            _ => Insets::zero(),
        }
    }

    /// Background color, if any.
    pub fn background_color(&self) -> Option<Color> {
        self.color(StyleKey::Background)
    }

    /// Text color.
    pub fn foreground_color(&self) -> Color {
        self.color(StyleKey::Foreground).unwrap_or(Color::WHITE)
    }

    /// Border color, if any.
    pub fn border_color(&self) -> Option<Color> {
        self.color(StyleKey::BorderColor)
    }

    /// The font, or the default font.
    pub fn text_font(&self) -> Cow<'_, Font> {
        match self.entries.get(&StyleKey::Font) {
            Some(StyleValue::Font(f)) => Cow::Borrowed(f),
            _ => Cow::Owned(Font::default()),
        }
    }

    /// Padding insets.
    pub fn padding_insets(&self) -> Insets {
        self.insets(StyleKey::Padding)
    }

    /// Border insets.
    pub fn border_insets(&self) -> Insets {
        self.insets(StyleKey::Border)
    }

    /// Everything between the outer rect and the content rect.
    pub fn content_insets(&self) -> Insets {
        self.border_insets() + self.padding_insets()
    }

    /// Would swapping this style for `other` change a measured size?
    pub fn size_differs(&self, other: &Self) -> bool {
        [StyleKey::Font, StyleKey::Padding, StyleKey::Border]
            .into_iter()
            .any(|k| self.entries.get(&k) != other.entries.get(&k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() -> Result<()> {
        assert_eq!(Color::from_hex("#ff8000")?, Color::rgb(0xff, 0x80, 0));
        assert_eq!(Color::from_hex("0000FF")?, Color::rgb(0, 0, 0xff));
        assert!(Color::from_hex("#ff80").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert_eq!(Color::from_u32(0x12_3456).to_string(), "#123456");
        Ok(())
    }

    #[test]
    fn font_measure() {
        let f = Font::new("sans", 6, 10);
        assert_eq!(f.measure(""), Size::zero());
        assert_eq!(f.measure("12:45"), Size::new(30, 10));
        assert_eq!(f.measure("ab\nabcd"), Size::new(24, 20));
        // Wide glyphs take two columns.
        assert_eq!(f.measure("日"), Size::new(12, 10));
    }

    #[test]
    fn defaults_for_missing_keys() {
        let s = Style::new();
        assert_eq!(s.background_color(), None);
        assert_eq!(s.foreground_color(), Color::WHITE);
        assert_eq!(*s.text_font(), Font::default());
        assert_eq!(s.content_insets(), Insets::zero());

        // A value under the wrong key is ignored.
        let odd = Style::new().with(StyleKey::Padding, StyleValue::Color(Color::BLACK));
        assert_eq!(odd.padding_insets(), Insets::zero());
    }

    #[test]
    fn size_affecting_keys() {
        let base = Style::new().background(Color::BLACK);
        assert!(!base.size_differs(&base.clone().background(Color::WHITE)));
        assert!(!base.size_differs(&base.clone().foreground(Color::WHITE)));
        assert!(base.size_differs(&base.clone().padding(Insets::all(2))));
        assert!(base.size_differs(&base.clone().font(Font::new("big", 2, 2))));
        assert!(
            base.clone()
                .border(Insets::all(1), Color::WHITE)
                .size_differs(&base)
        );
        assert!(StyleKey::Border.affects_size());
        assert!(!StyleKey::BorderColor.affects_size());
    }
}
