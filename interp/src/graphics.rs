//! Graphics state parameter types, and resource values produced by loaders.
use crate::object::{Name, Object, ObjectValueError};
use std::str::FromStr;
use strum::{Display, EnumString, FromRepr};

pub mod color_space;
pub mod path;
pub mod pattern;
pub mod trans;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromRepr)]
#[repr(u8)]
pub enum LineCapStyle {
    #[default]
    Butt = 0,
    Round = 1,
    Square = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromRepr)]
#[repr(u8)]
pub enum LineJoinStyle {
    #[default]
    Miter = 0,
    Round = 1,
    Bevel = 2,
}

/// Convert integer operand to enum, out of range value falls back to default.
pub fn int_to_style<T: Default>(v: i32, f: impl Fn(u8) -> Option<T>) -> T {
    u8::try_from(v).ok().and_then(f).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromRepr)]
#[repr(u8)]
pub enum TextRenderingMode {
    #[default]
    Fill = 0,
    Stroke = 1,
    FillAndStroke = 2,
    Invisible = 3,
    FillAndClip = 4,
    StrokeAndClip = 5,
    FillStrokeAndClip = 6,
    Clip = 7,
}

impl TextRenderingMode {
    pub fn fill(self) -> bool {
        matches!(
            self,
            Self::Fill | Self::FillAndStroke | Self::FillAndClip | Self::FillStrokeAndClip
        )
    }

    pub fn stroke(self) -> bool {
        matches!(
            self,
            Self::Stroke | Self::FillAndStroke | Self::StrokeAndClip | Self::FillStrokeAndClip
        )
    }

    pub fn clip(self) -> bool {
        matches!(
            self,
            Self::FillAndClip | Self::StrokeAndClip | Self::FillStrokeAndClip | Self::Clip
        )
    }

    pub fn invisible(self) -> bool {
        self == Self::Invisible
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
pub enum BlendMode {
    #[default]
    #[strum(serialize = "Normal", serialize = "Compatible")]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    /// Unknown blend mode name is treated as `Normal`.
    pub fn from_name(name: &Name) -> Self {
        Self::from_str(name.as_str()).unwrap_or_default()
    }

    /// `BM` entry of ExtGState, a name or an array of names, the first one used.
    pub fn from_object(o: &Object) -> Result<Self, ObjectValueError> {
        match o {
            Object::Name(n) => Ok(Self::from_name(n)),
            Object::Array(arr) => Ok(arr
                .first()
                .and_then(|o| o.as_name().ok())
                .map_or(Self::Normal, Self::from_name)),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }
}

/// Stroke parameters of graphics state.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeState {
    pub line_width: f32,
    pub cap: LineCapStyle,
    pub join: LineJoinStyle,
    pub miter_limit: f32,
    pub dash: Vec<f32>,
    pub dash_phase: f32,
}

impl Default for StrokeState {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            cap: LineCapStyle::default(),
            join: LineJoinStyle::default(),
            miter_limit: 10.0,
            dash: vec![],
            dash_phase: 0.0,
        }
    }
}

impl StrokeState {
    /// Set dash pattern from `d` operands, non-number items are ignored.
    pub fn set_dash(&mut self, arr: &[Object], phase: f32) {
        self.dash = arr.iter().filter_map(|o| o.as_number().ok()).collect();
        self.dash_phase = phase;
    }
}
