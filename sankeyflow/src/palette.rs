//! Colors and named palettes.
//!
//! [`Rgba`] keeps the four components as numbers; the CSS string is only
//! produced at the edge. Channels are unit fractions, the form palette
//! libraries hand out, and are scaled to 0-255 when formatted.
//!
//! Palettes come from a [`PaletteProvider`]. [`BuiltinPalettes`] carries the
//! ColorBrewer and seaborn qualitative sets at their usual sizes plus the
//! evenly spaced `hls` circle; [`CustomPalettes`] puts caller-defined
//! palettes in front of another provider.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigResult, ConfigurationError};

/// Palette used when coloring is requested without a name.
pub const DEFAULT_PALETTE: &str = "Set1";

/// Link alpha used when the caller does not pick one.
pub const DEFAULT_ALPHA: f64 = 0.5;

/// Color given to nodes that no link color claims.
pub const NEUTRAL: Rgba = Rgba { r: 0.5, g: 0.5, b: 0.5, a: 0.3 };

// =============================================================================
// Rgba
// =============================================================================

/// A color with unit-interval channels and alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    /// Opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
            a: 1.0,
        }
    }

    /// Opaque color from a `#rrggbb` literal.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Same color at a new alpha. Fails outside [0, 1].
    pub fn with_alpha(self, alpha: f64) -> ConfigResult<Self> {
        check_alpha(alpha)?;
        Ok(Self { a: alpha, ..self })
    }

    fn channel8(v: f64) -> u8 {
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Channels as 8-bit integers.
    pub fn rgb8(&self) -> (u8, u8, u8) {
        (Self::channel8(self.r), Self::channel8(self.g), Self::channel8(self.b))
    }

    /// Key for first-seen deduplication, stable under float noise.
    pub(crate) fn key(&self) -> (u8, u8, u8, u16) {
        let (r, g, b) = self.rgb8();
        (r, g, b, (self.a.clamp(0.0, 1.0) * 1000.0).round() as u16)
    }
}

/// Reject alpha values outside [0, 1] (NaN included).
pub fn check_alpha(alpha: f64) -> ConfigResult<f64> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(ConfigurationError::AlphaOutOfRange(alpha))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b) = self.rgb8();
        write!(f, "rgba({},{},{},{})", r, g, b, self.a)
    }
}

static RGBA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*([0-9.]+)\s*,\s*([0-9.]+)\s*,\s*([0-9.]+)\s*(?:,\s*([0-9.]+)\s*)?\)$")
        .expect("valid rgba pattern")
});

impl FromStr for Rgba {
    type Err = ConfigurationError;

    /// Parses `#rrggbb`, `rgb(R,G,B)` and `rgba(R,G,B,a)` with 0-255 channels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ConfigurationError::InvalidConfig(format!("not a color: '{}'", s));

        if s.starts_with('#') {
            return Rgba::from_hex(s).ok_or_else(invalid);
        }

        let caps = RGBA_RE.captures(s).ok_or_else(invalid)?;
        let number = |i: usize| caps[i].parse::<f64>().map_err(|_| invalid());

        let (r, g, b) = (number(1)?, number(2)?, number(3)?);
        if [r, g, b].iter().any(|c| *c > 255.0) {
            return Err(invalid());
        }
        let a = match caps.get(4) {
            Some(m) => check_alpha(m.as_str().parse::<f64>().map_err(|_| invalid())?)?,
            None => 1.0,
        };

        Ok(Rgba { r: r / 255.0, g: g / 255.0, b: b / 255.0, a })
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Palette Provider
// =============================================================================

/// What to do with node indices past the end of the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteOverflow {
    /// Wrap around; distinct nodes may share a color.
    #[default]
    Cycle,
    /// Use [`NEUTRAL`] past the palette.
    Neutral,
}

/// Named palette lookup.
pub trait PaletteProvider {
    /// Base colors of `name` in palette order. Their alpha is replaced
    /// when a color table is built.
    fn palette(&self, name: &str) -> ConfigResult<Vec<Rgba>>;

    /// Names this provider knows.
    fn names(&self) -> Vec<&str>;
}

/// Build `n` colors from `name` at `alpha`, following `overflow` past the
/// palette's own size.
pub fn color_table(
    provider: &dyn PaletteProvider,
    name: &str,
    n: usize,
    alpha: f64,
    overflow: PaletteOverflow,
) -> ConfigResult<Vec<Rgba>> {
    check_alpha(alpha)?;
    let base = provider.palette(name)?;
    if base.is_empty() {
        return Err(ConfigurationError::EmptyPalette(name.to_string()));
    }

    let colors = (0..n)
        .map(|i| match (base.get(i), overflow) {
            (Some(c), _) => Rgba { a: alpha, ..*c },
            (None, PaletteOverflow::Cycle) => Rgba { a: alpha, ..base[i % base.len()] },
            (None, PaletteOverflow::Neutral) => NEUTRAL,
        })
        .collect();

    Ok(colors)
}

/// Qualitative palettes compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPalettes;

const BUILTIN: &[(&str, &[&str])] = &[
    ("Set1", &["#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf", "#999999"]),
    ("Set2", &["#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494", "#b3b3b3"]),
    (
        "Set3",
        &[
            "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5", "#d9d9d9", "#bc80bd",
            "#ccebc5", "#ffed6f",
        ],
    ),
    ("Dark2", &["#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e", "#e6ab02", "#a6761d", "#666666"]),
    ("Pastel1", &["#fbb4ae", "#b3cde3", "#ccebc5", "#decbe4", "#fed9a6", "#ffffcc", "#e5d8bd", "#fddaec", "#f2f2f2"]),
    ("Pastel2", &["#b3e2cd", "#fdcdac", "#cbd5e8", "#f4cae4", "#e6f5c9", "#fff2ae", "#f1e2cc", "#cccccc"]),
    (
        "Paired",
        &[
            "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c", "#fdbf6f", "#ff7f00", "#cab2d6", "#6a3d9a",
            "#ffff99", "#b15928",
        ],
    ),
    ("Accent", &["#7fc97f", "#beaed4", "#fdc086", "#ffff99", "#386cb0", "#f0027f", "#bf5b17", "#666666"]),
    (
        "muted",
        &["#4878d0", "#ee854a", "#6acc64", "#d65f5f", "#956cb4", "#8c613c", "#dc7ec0", "#797979", "#d5bb67", "#82c6e2"],
    ),
    (
        "pastel",
        &["#a1c9f4", "#ffb482", "#8de5a1", "#ff9f9b", "#d0bbff", "#debb9b", "#fab0e4", "#cfcfcf", "#fffea3", "#b9f2f0"],
    ),
    (
        "bright",
        &["#023eff", "#ff7c00", "#1ac938", "#e8000b", "#8b2be2", "#9f4800", "#f14cc1", "#a3a3a3", "#ffc400", "#00d7ff"],
    ),
    (
        "dark",
        &["#001c7f", "#b1400d", "#12711c", "#8c0800", "#591e71", "#592f0d", "#a23582", "#3c3c3c", "#b8850a", "#006374"],
    ),
    (
        "tab10",
        &["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf"],
    ),
    (
        "deep",
        &["#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3", "#937860", "#da8bc3", "#8c8c8c", "#ccb974", "#64b5cd"],
    ),
    (
        "colorblind",
        &["#0173b2", "#de8f05", "#029e73", "#d55e00", "#cc78bc", "#ca9161", "#fbafe4", "#949494", "#ece133", "#56b4e9"],
    ),
];

/// Name of the generated hue circle.
pub const HLS: &str = "hls";

/// Colors in the default `hls` palette.
const HLS_SIZE: usize = 6;

/// `n` hues evenly spaced around the HLS circle, starting at `h`.
pub fn hls_palette(n: usize, h: f64, l: f64, s: f64) -> Vec<Rgba> {
    (0..n)
        .map(|i| {
            let hue = (i as f64 / n as f64 + h).rem_euclid(1.0);
            let (r, g, b) = hls_to_rgb(hue, l, s);
            Rgba { r, g, b, a: 1.0 }
        })
        .collect()
}

fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;

    let channel = |hue: f64| {
        let hue = hue.rem_euclid(1.0);
        if hue < 1.0 / 6.0 {
            m1 + (m2 - m1) * hue * 6.0
        } else if hue < 0.5 {
            m2
        } else if hue < 2.0 / 3.0 {
            m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
        } else {
            m1
        }
    };

    (channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

impl PaletteProvider for BuiltinPalettes {
    fn palette(&self, name: &str) -> ConfigResult<Vec<Rgba>> {
        if name == HLS {
            return Ok(hls_palette(HLS_SIZE, 0.01, 0.6, 0.65));
        }

        let (_, hexes) = BUILTIN
            .iter()
            .find(|(n, _)| *n == name)
            .ok_or_else(|| ConfigurationError::UnknownPalette(name.to_string()))?;

        hexes
            .iter()
            .map(|h| {
                Rgba::from_hex(h).ok_or_else(|| ConfigurationError::InvalidConfig(format!("bad palette entry {}", h)))
            })
            .collect()
    }

    fn names(&self) -> Vec<&str> {
        BUILTIN.iter().map(|(n, _)| *n).chain([HLS]).collect()
    }
}

// =============================================================================
// Custom Palettes
// =============================================================================

/// Caller-defined palettes, looked up before `fallback`.
pub struct CustomPalettes<'a> {
    palettes: &'a BTreeMap<String, Vec<Rgba>>,
    fallback: &'a dyn PaletteProvider,
}

impl<'a> CustomPalettes<'a> {
    pub fn new(palettes: &'a BTreeMap<String, Vec<Rgba>>, fallback: &'a dyn PaletteProvider) -> Self {
        Self { palettes, fallback }
    }
}

impl PaletteProvider for CustomPalettes<'_> {
    fn palette(&self, name: &str) -> ConfigResult<Vec<Rgba>> {
        match self.palettes.get(name) {
            Some(colors) => Ok(colors.clone()),
            None => self.fallback.palette(name),
        }
    }

    fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.palettes.keys().map(String::as_str).collect();
        names.extend(self.fallback.names().into_iter().filter(|n| !self.palettes.contains_key(*n)));
        names
    }
}

/// Parse `name=color;color;...`, each color in any form [`Rgba`] parses.
pub fn parse_palette_definition(definition: &str) -> ConfigResult<(String, Vec<Rgba>)> {
    let invalid = || ConfigurationError::InvalidConfig(format!("expected NAME=COLOR;COLOR..., got '{}'", definition));

    let (name, colors) = definition.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }

    let colors = colors
        .split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::parse::<Rgba>)
        .collect::<ConfigResult<Vec<Rgba>>>()?;
    if colors.is_empty() {
        return Err(ConfigurationError::EmptyPalette(name.to_string()));
    }

    Ok((name.to_string(), colors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scales_channels() {
        assert_eq!(NEUTRAL.to_string(), "rgba(128,128,128,0.3)");
        let red = Rgba::from_hex("#e41a1c").unwrap().with_alpha(0.5).unwrap();
        assert_eq!(red.to_string(), "rgba(228,26,28,0.5)");
    }

    #[test]
    fn test_parse_roundtrip_forms() {
        let c: Rgba = "rgba(228, 26, 28, 0.5)".parse().unwrap();
        assert_eq!(c.rgb8(), (228, 26, 28));
        assert_eq!(c.a, 0.5);

        let opaque: Rgba = "rgb(0,0,255)".parse().unwrap();
        assert_eq!(opaque.a, 1.0);

        let hex: Rgba = "#377eb8".parse().unwrap();
        assert_eq!(hex.rgb8(), (0x37, 0x7e, 0xb8));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("blue".parse::<Rgba>().is_err());
        assert!("rgba(300,0,0,0.5)".parse::<Rgba>().is_err());
        assert!("rgba(0,0,0,2)".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_with_alpha_is_structural() {
        let c = Rgba { r: 0.1, g: 0.2, b: 0.3, a: 0.5 };
        let d = c.with_alpha(0.8).unwrap();
        assert_eq!((d.r, d.g, d.b, d.a), (0.1, 0.2, 0.3, 0.8));
        assert_eq!(c.with_alpha(1.5), Err(ConfigurationError::AlphaOutOfRange(1.5)));
        assert!(c.with_alpha(f64::NAN).is_err());
    }

    #[test]
    fn test_unknown_palette() {
        let err = BuiltinPalettes.palette("Sett1").unwrap_err();
        assert_eq!(err, ConfigurationError::UnknownPalette("Sett1".into()));
    }

    #[test]
    fn test_builtin_sizes() {
        assert_eq!(BuiltinPalettes.palette("Set1").unwrap().len(), 9);
        assert_eq!(BuiltinPalettes.palette("Paired").unwrap().len(), 12);
        assert!(BuiltinPalettes.names().contains(&"colorblind"));
    }

    #[test]
    fn test_color_table_cycles() {
        let table = color_table(&BuiltinPalettes, "Set2", 10, 0.5, PaletteOverflow::Cycle).unwrap();
        assert_eq!(table.len(), 10);
        assert_eq!(table[8], table[0]);
        assert_eq!(table[9], table[1]);
        assert!(table.iter().all(|c| c.a == 0.5));
    }

    #[test]
    fn test_color_table_neutral_overflow() {
        let table = color_table(&BuiltinPalettes, "Set2", 10, 0.5, PaletteOverflow::Neutral).unwrap();
        assert_eq!(table[7].rgb8(), (0xb3, 0xb3, 0xb3));
        assert_eq!(table[8], NEUTRAL);
        assert_eq!(table[9], NEUTRAL);
    }

    #[test]
    fn test_color_table_rejects_alpha() {
        let err = color_table(&BuiltinPalettes, "Set1", 3, -0.1, PaletteOverflow::Cycle).unwrap_err();
        assert_eq!(err, ConfigurationError::AlphaOutOfRange(-0.1));
    }

    #[test]
    fn test_seaborn_variants() {
        for name in ["muted", "pastel", "bright", "dark"] {
            assert_eq!(BuiltinPalettes.palette(name).unwrap().len(), 10, "{}", name);
        }
        assert_eq!(BuiltinPalettes.palette("pastel").unwrap()[0].rgb8(), (0xa1, 0xc9, 0xf4));
    }

    #[test]
    fn test_hls_palette() {
        let colors = BuiltinPalettes.palette("hls").unwrap();
        assert_eq!(colors.len(), 6);
        assert_eq!(colors[0].rgb8(), (219, 95, 87));
        assert!(colors.iter().all(|c| c.a == 1.0));
        assert!(BuiltinPalettes.names().contains(&"hls"));
    }

    #[test]
    fn test_hls_gray_without_saturation() {
        let colors = hls_palette(3, 0.0, 0.5, 0.0);
        assert!(colors.iter().all(|c| c.rgb8() == (128, 128, 128)));
    }

    #[test]
    fn test_custom_palettes_shadow_builtin() {
        let mut custom = BTreeMap::new();
        custom.insert("school".to_string(), vec![Rgba::from_rgb8(0, 51, 102), Rgba::from_rgb8(255, 204, 0)]);
        custom.insert("Set1".to_string(), vec![Rgba::from_rgb8(1, 2, 3)]);
        let provider = CustomPalettes::new(&custom, &BuiltinPalettes);

        assert_eq!(provider.palette("school").unwrap().len(), 2);
        assert_eq!(provider.palette("Set1").unwrap(), vec![Rgba::from_rgb8(1, 2, 3)]);
        assert_eq!(provider.palette("Dark2").unwrap().len(), 8);
        assert!(provider.palette("nope").is_err());

        let names = provider.names();
        assert_eq!(&names[..2], &["Set1", "school"]);
        assert_eq!(names.iter().filter(|n| **n == "Set1").count(), 1);
    }

    #[test]
    fn test_parse_palette_definition() {
        let (name, colors) = parse_palette_definition("school=#003366; rgb(255,204,0)").unwrap();
        assert_eq!(name, "school");
        assert_eq!(colors[0].rgb8(), (0x00, 0x33, 0x66));
        assert_eq!(colors[1].rgb8(), (255, 204, 0));

        assert!(parse_palette_definition("school").is_err());
        assert!(parse_palette_definition("=#003366").is_err());
        assert!(parse_palette_definition("school=blue").is_err());
        assert_eq!(
            parse_palette_definition("school="),
            Err(ConfigurationError::EmptyPalette("school".into()))
        );
    }

    struct EmptyProvider;

    impl PaletteProvider for EmptyProvider {
        fn palette(&self, _name: &str) -> ConfigResult<Vec<Rgba>> {
            Ok(Vec::new())
        }

        fn names(&self) -> Vec<&str> {
            vec!["nothing"]
        }
    }

    #[test]
    fn test_empty_palette_rejected() {
        let err = color_table(&EmptyProvider, "nothing", 2, 0.5, PaletteOverflow::Cycle).unwrap_err();
        assert_eq!(err, ConfigurationError::EmptyPalette("nothing".into()));
    }
}
