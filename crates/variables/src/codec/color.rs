//! Color literal parsing and conversion into the target's working profile.
//!
//! Every notation is parsed into a [`Color`] tagged with the space its coordinates live
//! in. Conversion goes through linear light and CIE XYZ (D65). Coordinates that leave the
//! target gamut on a cross-space conversion are clamped into range; same-space values are
//! passed through untouched.

// Single-char math variables are standard in color science.
#![allow(clippy::many_single_char_names)]

use crate::config::ColorProfile;
use serde_json::Value;

/// Space a parsed color's coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    SrgbLinear,
    DisplayP3,
    /// Lightness, chroma, hue (degrees)
    Oklch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub space: ColorSpace,
    pub coords: [f64; 3],
    pub alpha: f64,
}

impl Color {
    pub fn new(space: ColorSpace, coords: [f64; 3], alpha: f64) -> Self {
        Self {
            space,
            coords,
            alpha,
        }
    }

    /// `NaN` and infinities parse as numbers but are not colors.
    pub fn is_finite(&self) -> bool {
        self.coords.iter().all(|c| c.is_finite()) && self.alpha.is_finite()
    }

    /// Gamut the coordinates were authored against, if they are gamut-bound at all.
    fn profile(&self) -> Option<ColorProfile> {
        match self.space {
            ColorSpace::Srgb | ColorSpace::SrgbLinear => Some(ColorProfile::Srgb),
            ColorSpace::DisplayP3 => Some(ColorProfile::DisplayP3),
            ColorSpace::Oklch => None,
        }
    }

    /// Gamma-encoded channels in `target`; clamped to `[0, 1]` when the source gamut differs.
    pub fn to_profile(&self, target: ColorProfile) -> [f64; 3] {
        let same_gamut = self.profile() == Some(target);
        let encoded = match (self.space, target) {
            (ColorSpace::Srgb, ColorProfile::Srgb) | (ColorSpace::DisplayP3, ColorProfile::DisplayP3) => {
                self.coords
            }
            _ => {
                let linear = self.to_linear_target(target);
                linear.map(encode_transfer)
            }
        };

        if same_gamut {
            encoded
        } else {
            encoded.map(|c| c.clamp(0.0, 1.0))
        }
    }

    fn to_linear_target(&self, target: ColorProfile) -> [f64; 3] {
        let xyz = match self.space {
            ColorSpace::Srgb => mul(&SRGB_TO_XYZ, self.coords.map(decode_transfer)),
            ColorSpace::SrgbLinear => mul(&SRGB_TO_XYZ, self.coords),
            ColorSpace::DisplayP3 => mul(&P3_TO_XYZ, self.coords.map(decode_transfer)),
            ColorSpace::Oklch => mul(&SRGB_TO_XYZ, oklch_to_linear_srgb(self.coords)),
        };

        match target {
            ColorProfile::Srgb => mul(&XYZ_TO_SRGB, xyz),
            ColorProfile::DisplayP3 => mul(&XYZ_TO_P3, xyz),
        }
    }
}

type Matrix = [[f64; 3]; 3];

const SRGB_TO_XYZ: Matrix = [
    [0.412_390_799_265_959_5, 0.357_584_339_383_878, 0.180_480_788_401_834_3],
    [0.212_639_005_871_510_36, 0.715_168_678_767_755_9, 0.072_192_315_360_733_71],
    [0.019_330_818_715_591_85, 0.119_194_779_794_625_99, 0.950_532_152_249_660_6],
];

const XYZ_TO_SRGB: Matrix = [
    [3.240_969_941_904_521_3, -1.537_383_177_570_093_5, -0.498_610_760_293_003_3],
    [-0.969_243_636_280_879_8, 1.875_967_501_507_720_6, 0.041_555_057_407_175_61],
    [0.055_630_079_696_993_61, -0.203_976_958_888_976_57, 1.056_971_514_242_878_6],
];

const P3_TO_XYZ: Matrix = [
    [0.486_570_948_648_216_2, 0.265_667_693_169_093_06, 0.198_217_285_234_362_5],
    [0.228_974_564_069_748_8, 0.691_738_521_836_506_4, 0.079_286_914_093_745],
    [0.0, 0.045_113_381_858_902_64, 1.043_944_368_900_976],
];

const XYZ_TO_P3: Matrix = [
    [2.493_496_911_941_425, -0.931_383_617_919_123_9, -0.402_710_784_450_716_84],
    [-0.829_488_969_561_574_7, 1.762_664_060_318_346_3, 0.023_624_685_841_943_577],
    [0.035_845_830_243_784_47, -0.076_172_389_268_041_82, 0.956_884_524_007_687_2],
];

fn mul(m: &Matrix, v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// sRGB / Display P3 transfer curve, sign-preserving for out-of-gamut values.
fn decode_transfer(c: f64) -> f64 {
    let abs = c.abs();
    let linear = if abs <= 0.040_45 {
        abs / 12.92
    } else {
        ((abs + 0.055) / 1.055).powf(2.4)
    };
    linear.copysign(c)
}

fn encode_transfer(c: f64) -> f64 {
    let abs = c.abs();
    let encoded = if abs <= 0.003_130_8 {
        abs * 12.92
    } else {
        1.055 * abs.powf(1.0 / 2.4) - 0.055
    };
    encoded.copysign(c)
}

fn oklch_to_linear_srgb([l, c, h]: [f64; 3]) -> [f64; 3] {
    let hue = h.to_radians();
    let (a, b) = (c * hue.cos(), c * hue.sin());

    let l_ = l + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
    let m_ = l - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
    let s_ = l - 0.089_484_177_5 * a - 1.291_485_548 * b;
    let (l3, m3, s3) = (l_.powi(3), m_.powi(3), s_.powi(3));

    [
        4.076_741_662_1 * l3 - 3.307_711_591_3 * m3 + 0.230_969_929_2 * s3,
        -1.268_438_004_6 * l3 + 2.609_757_401_1 * m3 - 0.341_319_396_5 * s3,
        -0.004_196_086_3 * l3 - 0.703_418_614_7 * m3 + 1.707_614_701 * s3,
    ]
}

/// Parse any supported color literal.
///
/// Strings: `#rgb[a]`, `#rrggbb[aa]`, `rgb()/rgba()`, `hsl()/hsla()`,
/// `color(srgb|srgb-linear|display-p3 ...)`, `oklch()`, `transparent`.
/// Objects: `{r, g, b, a?}` (channels above 1 are read as 0–255), `{hex}`, or
/// `{colorSpace, components, alpha?}`.
pub fn parse_color(value: &Value) -> Option<Color> {
    parse_color_value(value).filter(Color::is_finite)
}

fn parse_color_value(value: &Value) -> Option<Color> {
    match value {
        Value::String(s) => parse_color_str(s),
        Value::Object(map) => {
            if let Some(hex) = map.get("hex").and_then(Value::as_str) {
                return parse_color_str(hex);
            }
            if let Some(space) = map.get("colorSpace").and_then(Value::as_str) {
                let components = map.get("components")?.as_array()?;
                if components.len() != 3 {
                    return None;
                }
                let mut coords = [0.0; 3];
                for (slot, c) in coords.iter_mut().zip(components) {
                    *slot = c.as_f64()?;
                }
                let alpha = map.get("alpha").and_then(Value::as_f64).unwrap_or(1.0);
                return Some(Color::new(space_from_name(space)?, coords, alpha));
            }

            let r = map.get("r")?.as_f64()?;
            let g = map.get("g")?.as_f64()?;
            let b = map.get("b")?.as_f64()?;
            let alpha = map.get("a").and_then(Value::as_f64).unwrap_or(1.0);
            let scale = if r > 1.0 || g > 1.0 || b > 1.0 { 255.0 } else { 1.0 };
            Some(Color::new(
                ColorSpace::Srgb,
                [r / scale, g / scale, b / scale],
                alpha,
            ))
        }
        _ => None,
    }
}

fn space_from_name(name: &str) -> Option<ColorSpace> {
    match name.trim().to_ascii_lowercase().as_str() {
        "srgb" => Some(ColorSpace::Srgb),
        "srgb-linear" => Some(ColorSpace::SrgbLinear),
        "display-p3" | "p3" => Some(ColorSpace::DisplayP3),
        "oklch" => Some(ColorSpace::Oklch),
        _ => None,
    }
}

fn parse_color_str(raw: &str) -> Option<Color> {
    let s = raw.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if s.eq_ignore_ascii_case("transparent") {
        return Some(Color::new(ColorSpace::Srgb, [0.0; 3], 0.0));
    }

    let (name, args, alpha) = split_function(s)?;
    let alpha = match alpha {
        Some(a) => parse_unit_or_percent(a)?,
        None => 1.0,
    };

    match name.as_str() {
        "rgb" | "rgba" => {
            let [r, g, b] = three(&args)?;
            Some(Color::new(
                ColorSpace::Srgb,
                [rgb_channel(r)?, rgb_channel(g)?, rgb_channel(b)?],
                alpha,
            ))
        }
        "hsl" | "hsla" => {
            let [h, sat, light] = three(&args)?;
            let coords = hsl_to_srgb(parse_hue(h)?, parse_percent_like(sat)?, parse_percent_like(light)?);
            Some(Color::new(ColorSpace::Srgb, coords, alpha))
        }
        "color" => {
            let (space, rest) = args.split_first()?;
            let [r, g, b] = three(rest)?;
            let space = space_from_name(space).filter(|s| *s != ColorSpace::Oklch)?;
            Some(Color::new(
                space,
                [
                    parse_unit_or_percent(r)?,
                    parse_unit_or_percent(g)?,
                    parse_unit_or_percent(b)?,
                ],
                alpha,
            ))
        }
        "oklch" => {
            let [l, c, h] = three(&args)?;
            let lightness = parse_unit_or_percent(l)?;
            let chroma = match c.strip_suffix('%') {
                Some(pct) => pct.trim().parse::<f64>().ok()? / 100.0 * 0.4,
                None => c.parse::<f64>().ok()?,
            };
            Some(Color::new(ColorSpace::Oklch, [lightness, chroma, parse_hue(h)?], alpha))
        }
        _ => None,
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return None,
    };

    let byte = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    let r = f64::from(byte(0)?) / 255.0;
    let g = f64::from(byte(2)?) / 255.0;
    let b = f64::from(byte(4)?) / 255.0;
    let a = if expanded.len() == 8 {
        f64::from(byte(6)?) / 255.0
    } else {
        1.0
    };

    Some(Color::new(ColorSpace::Srgb, [r, g, b], a))
}

/// `name(args [/ alpha])` -> lowercase name, channel args, alpha arg.
///
/// Legacy comma syntax with a fourth argument (`rgba(1, 2, 3, 0.5)`) is folded into alpha.
fn split_function(s: &str) -> Option<(String, Vec<&str>, Option<&str>)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    let name = s[..open].trim().to_ascii_lowercase();

    let (channels, slash_alpha) = match inner.split_once('/') {
        Some((c, a)) => (c, Some(a.trim())),
        None => (inner, None),
    };

    let mut args: Vec<&str> = channels
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|a| !a.is_empty())
        .collect();

    let alpha = match slash_alpha {
        Some(a) => Some(a),
        None if args.len() == 4 && name != "color" => args.pop(),
        None => None,
    };

    Some((name, args, alpha))
}

fn three<'a>(args: &[&'a str]) -> Option<[&'a str; 3]> {
    match args {
        [a, b, c] => Some([*a, *b, *c]),
        _ => None,
    }
}

/// `0..=255` number or percentage -> `0..=1`
fn rgb_channel(arg: &str) -> Option<f64> {
    match arg.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok().map(|p| p / 100.0),
        None => arg.parse::<f64>().ok().map(|v| v / 255.0),
    }
}

/// `0..=1` number or percentage -> `0..=1`
fn parse_unit_or_percent(arg: &str) -> Option<f64> {
    match arg.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok().map(|p| p / 100.0),
        None => arg.parse::<f64>().ok(),
    }
}

/// Saturation / lightness: percentage or bare `0..=100` number -> `0..=1`
fn parse_percent_like(arg: &str) -> Option<f64> {
    let raw = arg.strip_suffix('%').unwrap_or(arg);
    raw.trim().parse::<f64>().ok().map(|p| p / 100.0)
}

fn parse_hue(arg: &str) -> Option<f64> {
    let deg = if let Some(v) = arg.strip_suffix("deg") {
        v.parse::<f64>().ok()?
    } else if let Some(v) = arg.strip_suffix("turn") {
        v.parse::<f64>().ok()? * 360.0
    } else if let Some(v) = arg.strip_suffix("rad") {
        v.parse::<f64>().ok()?.to_degrees()
    } else {
        arg.parse::<f64>().ok()?
    };
    Some(deg.rem_euclid(360.0))
}

fn hsl_to_srgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    let channel = |n: f64| {
        let k = (n + h / 30.0) % 12.0;
        let a = s * l.min(1.0 - l);
        l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)
    };
    [channel(0.0), channel(8.0), channel(4.0)]
}
