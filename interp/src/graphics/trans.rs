//! Coordinate spaces, and transforms between them.
//!
//! PDF content is drawn in user space, `ctm` maps it to device space.
//! Text, forms, patterns and glyphs have their own spaces that map into
//! user space of the stream running them.

use crate::object::{Object, ObjectValueError};
use euclid::{point2, Box2D, Point2D, Transform2D};

pub enum UserSpace {}
pub enum DeviceSpace {}
pub enum TextSpace {}
pub enum GlyphSpace {}
pub enum FormSpace {}
pub enum PatternSpace {}

pub type UserToDeviceSpace = Transform2D<f32, UserSpace, DeviceSpace>;
pub type UserToUserSpace = Transform2D<f32, UserSpace, UserSpace>;
pub type TextToUserSpace = Transform2D<f32, TextSpace, UserSpace>;
pub type GlyphToTextSpace = Transform2D<f32, GlyphSpace, TextSpace>;
pub type GlyphToUserSpace = Transform2D<f32, GlyphSpace, UserSpace>;
pub type FormToUserSpace = Transform2D<f32, FormSpace, UserSpace>;
pub type PatternToUserSpace = Transform2D<f32, PatternSpace, UserSpace>;
pub type PatternToDeviceSpace = Transform2D<f32, PatternSpace, DeviceSpace>;

pub type UserPoint = Point2D<f32, UserSpace>;
pub type UserRect = Box2D<f32, UserSpace>;
pub type DeviceRect = Box2D<f32, DeviceSpace>;
pub type FormRect = Box2D<f32, FormSpace>;
pub type PatternRect = Box2D<f32, PatternSpace>;

/// Rect covers the whole plane, used for content without a bounding box.
pub fn infinite_rect<S>() -> Box2D<f32, S> {
    Box2D::new(point2(f32::MIN, f32::MIN), point2(f32::MAX, f32::MAX))
}

/// Bounding box of `rect` after transform, empty rect stays empty.
pub fn transform_rect<S, D>(t: &Transform2D<f32, S, D>, rect: &Box2D<f32, S>) -> Box2D<f32, D> {
    if rect.is_empty() {
        return Box2D::zero();
    }
    t.outer_transformed_box(rect)
}

/// Max scale factor of the linear part, used to expand stroke bounds.
pub fn expansion<S, D>(t: &Transform2D<f32, S, D>) -> f32 {
    t.m11
        .abs()
        .max(t.m12.abs())
        .max(t.m21.abs())
        .max(t.m22.abs())
}

/// Parse rectangle array `[x0 y0 x1 y1]`, corners are normalized.
pub fn rect_from_objects<S>(arr: &[Object]) -> Result<Box2D<f32, S>, ObjectValueError> {
    let [x0, y0, x1, y1] = arr else {
        return Err(ObjectValueError::UnexpectedType);
    };
    let (x0, y0, x1, y1) = (
        x0.as_number()?,
        y0.as_number()?,
        x1.as_number()?,
        y1.as_number()?,
    );
    Ok(Box2D::new(
        point2(x0.min(x1), y0.min(y1)),
        point2(x0.max(x1), y0.max(y1)),
    ))
}

/// Parse matrix array `[a b c d e f]`.
pub fn matrix_from_objects<S, D>(
    arr: &[Object],
) -> Result<Transform2D<f32, S, D>, ObjectValueError> {
    let [a, b, c, d, e, f] = arr else {
        return Err(ObjectValueError::UnexpectedType);
    };
    Ok(Transform2D::new(
        a.as_number()?,
        b.as_number()?,
        c.as_number()?,
        d.as_number()?,
        e.as_number()?,
        f.as_number()?,
    ))
}

/// Matrix from six operands in the order they appear in content stream.
pub fn matrix_from_operands<S, D>(v: [f32; 6]) -> Transform2D<f32, S, D> {
    Transform2D::new(v[0], v[1], v[2], v[3], v[4], v[5])
}
