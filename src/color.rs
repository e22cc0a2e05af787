//! Colour resolution.
//!
//! The configured colour is turned into plain RGB exactly once, when an engine
//! is built. Anything that does not resolve falls back to a neutral gray.

use log::warn;

use crate::error::ColorError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const FALLBACK: Rgb = Rgb::new(128, 128, 128);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS `rgba(...)` string with `alpha` clamped to [0, 1].
    pub fn css_rgba(&self, alpha: f64) -> String {
        let a = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, a)
    }
}

/// Turns a display colour specification into RGB.
pub trait ColorResolver {
    fn resolve(&self, spec: &str) -> Result<Rgb, ColorError>;
}

/// Named colours plus `#hex`, `rgb()`/`rgba()` and `hsl()`/`hsla()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinColors;

impl ColorResolver for BuiltinColors {
    fn resolve(&self, spec: &str) -> Result<Rgb, ColorError> {
        let s = spec.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ColorError::Empty);
        }
        if s == "transparent" || s == "currentcolor" || s == "inherit" {
            return Err(ColorError::NotDisplayable(s));
        }
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorError::BadHex(spec.to_string()));
        }
        if let Some(args) = function_args(&s, &["rgba", "rgb"]) {
            return parse_rgb(args).ok_or_else(|| ColorError::BadFunction(spec.to_string()));
        }
        if let Some(args) = function_args(&s, &["hsla", "hsl"]) {
            return parse_hsl(args).ok_or_else(|| ColorError::BadFunction(spec.to_string()));
        }
        named(&s).ok_or(ColorError::UnknownName(s))
    }
}

/// Resolve once, logging and substituting [`Rgb::FALLBACK`] on failure.
pub fn resolve_or_fallback(resolver: &dyn ColorResolver, spec: &str) -> Rgb {
    match resolver.resolve(spec) {
        Ok(rgb) => rgb,
        Err(e) => {
            warn!("flicker grid color {spec:?} unresolved ({e}); using gray");
            Rgb::FALLBACK
        }
    }
}

fn function_args<'a>(s: &'a str, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        s.strip_prefix(name)
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
    })
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nib = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 | 4 => Some(Rgb::new(nib(0)?, nib(1)?, nib(2)?)),
        6 | 8 => Some(Rgb::new(byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}

fn components(args: &str) -> Vec<&str> {
    args.split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect()
}

fn channel(part: &str) -> Option<u8> {
    let v = match part.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? * 2.55,
        None => part.parse::<f64>().ok()?,
    };
    if !v.is_finite() {
        return None;
    }
    Some(v.clamp(0.0, 255.0).round() as u8)
}

fn parse_rgb(args: &str) -> Option<Rgb> {
    let parts = components(args);
    if parts.len() < 3 || parts.len() > 4 {
        return None;
    }
    Some(Rgb::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
    ))
}

fn percent(part: &str) -> Option<f64> {
    let v = part.strip_suffix('%').unwrap_or(part).parse::<f64>().ok()?;
    v.is_finite().then(|| (v / 100.0).clamp(0.0, 1.0))
}

fn parse_hsl(args: &str) -> Option<Rgb> {
    let parts = components(args);
    if parts.len() < 3 || parts.len() > 4 {
        return None;
    }
    let h: f64 = parts[0].strip_suffix("deg").unwrap_or(parts[0]).parse().ok()?;
    if !h.is_finite() {
        return None;
    }
    let s = percent(parts[1])?;
    let l = percent(parts[2])?;
    let h = h.rem_euclid(360.0) / 360.0;
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    let to_u8 = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    Some(Rgb::new(
        to_u8(hue(h + 1.0 / 3.0)),
        to_u8(hue(h)),
        to_u8(hue(h - 1.0 / 3.0)),
    ))
}

fn named(name: &str) -> Option<Rgb> {
    NAMED
        .binary_search_by(|(n, _)| (*n).cmp(name))
        .ok()
        .map(|i| {
            let [r, g, b] = NAMED[i].1;
            Rgb::new(r, g, b)
        })
}

/// CSS named colours, sorted for binary search.
const NAMED: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkgrey", [169, 169, 169]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkslategrey", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("grey", [128, 128, 128]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightgrey", [211, 211, 211]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightslategrey", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("rebeccapurple", [102, 51, 153]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("slategrey", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn rgb(spec: &str) -> Result<Rgb, ColorError> {
        BuiltinColors.resolve(spec)
    }

    #[test]
    fn hex_forms() {
        assert_eq!(rgb("#fff"), Ok(Rgb::new(255, 255, 255)));
        assert_eq!(rgb("#0a0b0c"), Ok(Rgb::new(10, 11, 12)));
        assert_eq!(rgb("#6B7280"), Ok(Rgb::new(107, 114, 128)));
        assert_eq!(rgb("#11223344"), Ok(Rgb::new(0x11, 0x22, 0x33)));
        assert_eq!(rgb("#f00c"), Ok(Rgb::new(255, 0, 0)));
        assert!(matches!(rgb("#12345"), Err(ColorError::BadHex(_))));
        assert!(matches!(rgb("#zzzzzz"), Err(ColorError::BadHex(_))));
    }

    #[test]
    fn rgb_functions() {
        assert_eq!(rgb("rgb(209, 213, 219)"), Ok(Rgb::new(209, 213, 219)));
        assert_eq!(rgb("RGBA(0,0,0,0.5)"), Ok(Rgb::new(0, 0, 0)));
        assert_eq!(rgb("rgb(100% 0% 50% / 0.2)"), Ok(Rgb::new(255, 0, 128)));
        assert_eq!(rgb("rgb(300, -4, 12.6)"), Ok(Rgb::new(255, 0, 13)));
        assert!(matches!(rgb("rgb(1,2)"), Err(ColorError::BadFunction(_))));
        assert!(matches!(rgb("rgb(a,b,c)"), Err(ColorError::BadFunction(_))));
    }

    #[test]
    fn hsl_functions() {
        assert_eq!(rgb("hsl(0, 100%, 50%)"), Ok(Rgb::new(255, 0, 0)));
        assert_eq!(rgb("hsl(120deg 100% 25%)"), Ok(Rgb::new(0, 128, 0)));
        assert_eq!(rgb("hsla(0, 0%, 50%, 1)"), Ok(Rgb::new(128, 128, 128)));
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(rgb("LightGray"), Ok(Rgb::new(211, 211, 211)));
        assert_eq!(rgb("  white "), Ok(Rgb::new(255, 255, 255)));
        assert!(matches!(rgb("blurple"), Err(ColorError::UnknownName(_))));
        assert_eq!(rgb("CornflowerBlue"), Ok(Rgb::new(100, 149, 237)));
        assert_eq!(rgb("darkblue"), Ok(Rgb::new(0, 0, 139)));
        assert_eq!(rgb("forestgreen"), Ok(Rgb::new(34, 139, 34)));
        assert_eq!(rgb("goldenrod"), Ok(Rgb::new(218, 165, 32)));
        assert_eq!(rgb("aliceblue"), Ok(Rgb::new(240, 248, 255)));
        assert_eq!(rgb("yellowgreen"), Ok(Rgb::new(154, 205, 50)));
        assert!(matches!(rgb("transparent"), Err(ColorError::NotDisplayable(_))));
        assert_eq!(rgb(""), Err(ColorError::Empty));
    }

    #[test]
    fn named_table_is_complete_and_sorted() {
        assert_eq!(NAMED.len(), 148);
        assert!(NAMED.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn failures_fall_back_to_gray() {
        assert_eq!(resolve_or_fallback(&BuiltinColors, "nope"), Rgb::FALLBACK);
        assert_eq!(
            resolve_or_fallback(&BuiltinColors, "#000"),
            Rgb::new(0, 0, 0)
        );
    }

    #[test]
    fn css_rgba_clamps_alpha() {
        assert_eq!(Rgb::new(1, 2, 3).css_rgba(0.5), "rgba(1, 2, 3, 0.5)");
        assert_eq!(Rgb::new(1, 2, 3).css_rgba(7.0), "rgba(1, 2, 3, 1)");
        assert_eq!(Rgb::new(1, 2, 3).css_rgba(f64::NAN), "rgba(1, 2, 3, 0)");
    }
}
