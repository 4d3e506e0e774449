// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cell styling: colours and edge borders

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Opaque RGB colour, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `RRGGBB` or `AARRGGBB`.
    ///
    /// Returns `Ok(None)` for colours that are fully transparent.
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let hex = input.trim().trim_start_matches('#');
        let invalid = || Error::InvalidColor(input.to_string());
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(Some(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ))),
            8 => {
                if channel(&hex[0..2])? == 0 {
                    return Ok(None);
                }
                Ok(Some(Rgb::new(
                    channel(&hex[2..4])?,
                    channel(&hex[4..6])?,
                    channel(&hex[6..8])?,
                )))
            }
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Rgb::parse(&value)?.ok_or(Error::InvalidColor(value))
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Normalise a raw fill colour for a cell background.
///
/// White, transparent, and unparseable fills all count as "no background".
pub fn normalize_background(raw: Option<&str>) -> Option<Rgb> {
    let raw = raw?.trim();
    match raw.to_ascii_lowercase().as_str() {
        "" | "none" | "auto" | "transparent" => return None,
        _ => {}
    }
    Rgb::parse(raw).ok().flatten().filter(|c| *c != Rgb::WHITE)
}

/// Border weight, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderKind {
    #[default]
    None,
    Thin,
    Medium,
    Thick,
    Double,
}

impl BorderKind {
    /// Map a spreadsheet border style name onto a border weight.
    ///
    /// Dashed and dotted variants collapse onto the weight they are drawn at.
    /// Unknown names are treated as thin lines.
    pub fn from_style_name(name: &str) -> Self {
        match name.trim() {
            "" | "none" => BorderKind::None,
            "thin" | "hair" | "dotted" | "dashed" | "dashDot" | "dashDotDot" => BorderKind::Thin,
            "medium" | "mediumDashed" | "mediumDashDot" | "mediumDashDotDot" | "slantDashDot" => {
                BorderKind::Medium
            }
            "thick" => BorderKind::Thick,
            "double" => BorderKind::Double,
            _ => BorderKind::Thin,
        }
    }

    /// Whether a border of this weight stops region growth.
    pub fn blocks_fill(self) -> bool {
        self >= BorderKind::Medium
    }
}

/// A styled border on one edge of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderStyle {
    pub kind: BorderKind,
    pub color: Option<Rgb>,
}

impl BorderStyle {
    pub fn new(kind: BorderKind) -> Self {
        Self { kind, color: None }
    }
}

/// Edge of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// Row and column step towards the neighbour across this edge.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Side::Top => (-1, 0),
            Side::Right => (0, 1),
            Side::Bottom => (1, 0),
            Side::Left => (0, -1),
        }
    }
}

/// The four borders of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Borders {
    pub top: Option<BorderStyle>,
    pub right: Option<BorderStyle>,
    pub bottom: Option<BorderStyle>,
    pub left: Option<BorderStyle>,
}

impl Borders {
    pub fn get(&self, side: Side) -> Option<&BorderStyle> {
        match side {
            Side::Top => self.top.as_ref(),
            Side::Right => self.right.as_ref(),
            Side::Bottom => self.bottom.as_ref(),
            Side::Left => self.left.as_ref(),
        }
    }

    pub fn set(&mut self, side: Side, style: Option<BorderStyle>) {
        let slot = match side {
            Side::Top => &mut self.top,
            Side::Right => &mut self.right,
            Side::Bottom => &mut self.bottom,
            Side::Left => &mut self.left,
        };
        *slot = style.filter(|s| s.kind != BorderKind::None);
    }

    pub fn kind(&self, side: Side) -> BorderKind {
        self.get(side).map(|s| s.kind).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        Side::ALL.iter().all(|&side| self.get(side).is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colour_forms() {
        assert_eq!(Rgb::parse("#FF0000").unwrap(), Some(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::parse("00ff00").unwrap(), Some(Rgb::new(0, 255, 0)));
        assert_eq!(Rgb::parse("FF0000FF").unwrap(), Some(Rgb::new(0, 0, 255)));
        assert_eq!(Rgb::parse("00FFFFFF").unwrap(), None);
        assert!(Rgb::parse("#12345").is_err());
        assert!(Rgb::parse("zzzzzz").is_err());
    }

    #[test]
    fn default_backgrounds_normalise_to_none() {
        assert_eq!(normalize_background(None), None);
        assert_eq!(normalize_background(Some("FFFFFFFF")), None);
        assert_eq!(normalize_background(Some("#ffffff")), None);
        assert_eq!(normalize_background(Some("transparent")), None);
        assert_eq!(normalize_background(Some("garbage")), None);
        assert_eq!(normalize_background(Some("FFFFFF00")), Some(Rgb::new(255, 255, 0)));
    }

    #[test]
    fn rgb_serializes_as_hex() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 255)).unwrap();
        assert_eq!(json, "\"#0102FF\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(1, 2, 255));
        assert!(serde_json::from_str::<Rgb>("\"#00000000\"").is_err());
    }

    #[test]
    fn border_names_map_to_weights() {
        assert_eq!(BorderKind::from_style_name("hair"), BorderKind::Thin);
        assert_eq!(BorderKind::from_style_name("mediumDashed"), BorderKind::Medium);
        assert_eq!(BorderKind::from_style_name("thick"), BorderKind::Thick);
        assert_eq!(BorderKind::from_style_name("double"), BorderKind::Double);
        assert_eq!(BorderKind::from_style_name("none"), BorderKind::None);
        assert_eq!(BorderKind::from_style_name("sparkly"), BorderKind::Thin);

        assert!(!BorderKind::Thin.blocks_fill());
        assert!(BorderKind::Medium.blocks_fill());
        assert!(BorderKind::Double.blocks_fill());
    }

    #[test]
    fn setting_none_border_clears_side() {
        let mut borders = Borders::default();
        borders.set(Side::Left, Some(BorderStyle::new(BorderKind::Thick)));
        assert_eq!(borders.kind(Side::Left), BorderKind::Thick);
        borders.set(Side::Left, Some(BorderStyle::new(BorderKind::None)));
        assert!(borders.is_empty());
    }
}
