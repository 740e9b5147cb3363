//! Static property values and interpolation between them

use std::fmt;

/// RGBA color with channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or one of a few named colors.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        match input.to_ascii_lowercase().as_str() {
            "transparent" => return Some(Self::TRANSPARENT),
            "black" => return Some(Self::BLACK),
            "white" => return Some(Self::WHITE),
            "red" => return Some(Self::rgb(1.0, 0.0, 0.0)),
            "green" => return Some(Self::rgb(0.0, 128.0 / 255.0, 0.0)),
            "blue" => return Some(Self::rgb(0.0, 0.0, 1.0)),
            _ => {}
        }

        let hex = input.strip_prefix('#')?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| f32::from(v) / 255.0);

        match hex.len() {
            3 => {
                let mut expanded = String::with_capacity(6);
                for c in hex.chars() {
                    expanded.push(c);
                    expanded.push(c);
                }
                Some(Self::rgb(
                    channel(&expanded[0..2])?,
                    channel(&expanded[2..4])?,
                    channel(&expanded[4..6])?,
                ))
            }
            6 => Some(Self::rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            8 => Some(Self::rgba(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
                channel(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Packed `0xRRGGBB`, alpha dropped
    pub fn rgb_number(&self) -> u32 {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (to_byte(self.r) << 16) | (to_byte(self.g) << 8) | to_byte(self.b)
    }

    fn lerp(&self, to: &Color, t: f32) -> Color {
        Color {
            r: lerp(self.r, to.r, t),
            g: lerp(self.g, to.g, t),
            b: lerp(self.b, to.b, t),
            a: lerp(self.a, to.a, t),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alpha = (self.a.clamp(0.0, 1.0) * 255.0).round() as u32;
        if alpha == 255 {
            write!(f, "#{:06x}", self.rgb_number())
        } else {
            write!(f, "#{:06x}{:02x}", self.rgb_number(), alpha)
        }
    }
}

/// A plain (non-animated) property value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f32),
    /// Percentage of the parent's dimension, `50.0` meaning half
    Percent(f32),
    Auto,
    Text(String),
    Bool(bool),
    Color(Color),
    List(Vec<Value>),
}

impl Value {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Colors are accepted either as [`Value::Color`] or as parseable text.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Text(s) => Color::parse(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Value at progress `t` between `from` and `to`.
    ///
    /// Kinds without a meaningful midpoint hold `from` until `t` reaches 1.
    pub fn interpolate(from: &Value, to: &Value, t: f32) -> Value {
        match (from, to) {
            (Value::Number(a), Value::Number(b)) => Value::Number(lerp(*a, *b, t)),
            (Value::Percent(a), Value::Percent(b)) => Value::Percent(lerp(*a, *b, t)),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(b, t)),
            (Value::List(a), Value::List(b)) if a.len() == b.len() => Value::List(
                a.iter()
                    .zip(b)
                    .map(|(x, y)| Value::interpolate(x, y, t))
                    .collect(),
            ),
            _ => match (from.as_color(), to.as_color()) {
                (Some(a), Some(b)) => Value::Color(a.lerp(&b, t)),
                _ if t >= 1.0 => to.clone(),
                _ => from.clone(),
            },
        }
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n as f32)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f32)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("#fff", Color::WHITE)]
    #[test_case("#000000", Color::BLACK)]
    #[test_case("#ff000080", Color::rgba(1.0, 0.0, 0.0, 128.0 / 255.0))]
    #[test_case("transparent", Color::TRANSPARENT)]
    #[test_case(" White ", Color::WHITE)]
    fn parses_colors(input: &str, expected: Color) {
        assert_eq!(Color::parse(input), Some(expected));
    }

    #[test_case("fff")]
    #[test_case("#ggg")]
    #[test_case("#12345")]
    #[test_case("chartreuse")]
    fn rejects_invalid_colors(input: &str) {
        assert_eq!(Color::parse(input), None);
    }

    #[test]
    fn color_display_round_trips_through_parse() {
        let color = Color::parse("#3366cc").unwrap();
        assert_eq!(color.to_string(), "#3366cc");
        assert_eq!(color.rgb_number(), 0x3366cc);
    }

    #[test]
    fn numbers_interpolate_linearly() {
        let v = Value::interpolate(&Value::Number(10.0), &Value::Number(20.0), 0.25);
        assert_eq!(v, Value::Number(12.5));
    }

    #[test]
    fn colors_interpolate_per_channel() {
        let v = Value::interpolate(&Color::BLACK.into(), &Color::WHITE.into(), 0.5);
        assert_eq!(v, Value::Color(Color::rgb(0.5, 0.5, 0.5)));
    }

    #[test]
    fn colors_given_as_text_interpolate() {
        let v = Value::interpolate(&"#000000".into(), &Value::from("white"), 0.5);
        assert_eq!(v, Value::Color(Color::rgb(0.5, 0.5, 0.5)));

        let v = Value::interpolate(&Color::BLACK.into(), &Value::from("#ffffff"), 0.25);
        assert_eq!(v, Value::Color(Color::rgb(0.25, 0.25, 0.25)));
    }

    #[test]
    fn lists_of_equal_length_interpolate_elementwise() {
        let from = Value::List(vec![Value::Number(0.0), Value::Percent(0.0)]);
        let to = Value::List(vec![Value::Number(10.0), Value::Percent(100.0)]);
        assert_eq!(
            Value::interpolate(&from, &to, 0.5),
            Value::List(vec![Value::Number(5.0), Value::Percent(50.0)])
        );
    }

    #[test]
    fn mismatched_kinds_step_at_completion() {
        let from = Value::Text("left".into());
        let to = Value::Number(4.0);
        assert_eq!(Value::interpolate(&from, &to, 0.99), from);
        assert_eq!(Value::interpolate(&from, &to, 1.0), to);
    }

    #[test]
    fn text_values_read_as_colors() {
        assert_eq!(Value::from("#ffffff").as_color(), Some(Color::WHITE));
        assert_eq!(Value::Number(1.0).as_color(), None);
    }
}
