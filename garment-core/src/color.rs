//! Fill and garment colors.
//!
//! Colors are straight (not premultiplied) 8-bit sRGBA, matching what the editing engine and
//! client storage speak. They serialize as CSS strings: `#rrggbb` when opaque, `rgba(r,g,b,a)`
//! otherwise.

#[repr(transparent)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable, Debug, Default)]
pub struct Color(pub [u8; 4]);
impl Color {
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }
    #[must_use]
    pub fn alpha(self) -> u8 {
        self.0[3]
    }
    /// Scale alpha by an opacity in `[0, 1]`.
    #[must_use]
    pub fn fade(self, opacity: f32) -> Self {
        let [r, g, b, a] = self.0;
        let a = (f32::from(a) * opacity.clamp(0.0, 1.0)).round();
        Self([r, g, b, az::saturating_cast(a)])
    }
    /// Source-over blend `self` onto `dst`.
    #[must_use]
    pub fn over(self, dst: Self) -> Self {
        let src_a = f32::from(self.0[3]) / 255.0;
        if src_a >= 1.0 {
            return self;
        }
        let dst_a = f32::from(dst.0[3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return Self::TRANSPARENT;
        }
        let channel = |s: u8, d: u8| {
            let value =
                (f32::from(s) * src_a + f32::from(d) * dst_a * (1.0 - src_a)) / out_a;
            az::saturating_cast::<f32, u8>(value.round())
        };
        Self([
            channel(self.0[0], dst.0[0]),
            channel(self.0[1], dst.0[1]),
            channel(self.0[2], dst.0[2]),
            az::saturating_cast((out_a * 255.0).round()),
        ])
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    #[error("expected `#rgb`, `#rrggbb`, `#rrggbbaa` or `rgba(r,g,b,a)`")]
    UnknownSyntax,
    #[error("bad color component `{0}`")]
    BadComponent(String),
}

impl std::str::FromStr for Color {
    type Err = ParseColorError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let digit = |i: usize| {
                hex.get(i..=i)
                    .and_then(|d| u8::from_str_radix(d, 16).ok())
                    .ok_or_else(|| ParseColorError::BadComponent(hex.to_owned()))
            };
            let pair = |i: usize| Ok::<_, ParseColorError>(digit(i)? << 4 | digit(i + 1)?);
            return match hex.len() {
                3 => Ok(Self::rgb(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
                6 => Ok(Self::rgb(pair(0)?, pair(2)?, pair(4)?)),
                8 => Ok(Self::rgba(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
                _ => Err(ParseColorError::UnknownSyntax),
            };
        }
        let (inner, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = s.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(ParseColorError::UnknownSyntax);
        };
        let inner = inner
            .strip_suffix(')')
            .ok_or(ParseColorError::UnknownSyntax)?;
        let parts: smallvec::SmallVec<[&str; 4]> = inner.split(',').map(str::trim).collect();
        if parts.len() != if has_alpha { 4 } else { 3 } {
            return Err(ParseColorError::UnknownSyntax);
        }
        let channel = |part: &str| {
            part.parse::<u8>()
                .map_err(|_| ParseColorError::BadComponent(part.to_owned()))
        };
        let alpha = if has_alpha {
            let a: f32 = parts[3]
                .parse()
                .map_err(|_| ParseColorError::BadComponent(parts[3].to_owned()))?;
            if !(0.0..=1.0).contains(&a) {
                return Err(ParseColorError::BadComponent(parts[3].to_owned()));
            }
            az::saturating_cast::<f32, u8>((a * 255.0).round())
        } else {
            255
        };
        Ok(Self::rgba(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ))
    }
}
impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            // Three decimals parse back to the same byte.
            let alpha = f32::from(a) / 255.0;
            write!(f, "rgba({r},{g},{b},{alpha:.3})")
        }
    }
}
impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let str =
            <std::borrow::Cow<'de, str> as serde::Deserialize<'de>>::deserialize(deserializer)?;
        str.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::Color;
    #[test]
    fn parse_forms() {
        assert_eq!("#fff".parse(), Ok(Color::WHITE));
        assert_eq!("#FF6B6B".parse(), Ok(Color::rgb(0xff, 0x6b, 0x6b)));
        assert_eq!("#00000080".parse(), Ok(Color::rgba(0, 0, 0, 0x80)));
        assert_eq!("rgb(1, 2, 3)".parse(), Ok(Color::rgb(1, 2, 3)));
        assert_eq!("rgba(0,0,0,0.06)".parse(), Ok(Color::rgba(0, 0, 0, 15)));
        assert!("#12345".parse::<Color>().is_err());
        assert!("red".parse::<Color>().is_err());
        assert!("rgba(0,0,0,2)".parse::<Color>().is_err());
    }
    #[test]
    fn display_parses_back() {
        for color in [
            Color::WHITE,
            Color::rgb(18, 52, 86),
            Color::rgba(0, 0, 0, 15),
            Color::rgba(200, 10, 10, 128),
        ] {
            assert_eq!(color.to_string().parse::<Color>(), Ok(color));
        }
    }
    #[test]
    fn blending() {
        let half_red = Color::rgba(255, 0, 0, 128);
        let out = half_red.over(Color::WHITE);
        assert_eq!(out.alpha(), 255);
        assert_eq!(out.0[0], 255);
        assert!((126..=128).contains(&out.0[1]));
        assert_eq!(Color::BLACK.over(Color::WHITE), Color::BLACK);
        assert_eq!(Color::TRANSPARENT.over(Color::TRANSPARENT), Color::TRANSPARENT);
    }
}
