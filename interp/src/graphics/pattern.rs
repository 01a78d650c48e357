//! Values built by resource loaders, shared read-only by the interpreter.
use super::{
    color_space::ColorSpace,
    trans::{
        infinite_rect, transform_rect, DeviceRect, FormRect, FormToUserSpace, PatternRect,
        PatternToUserSpace, UserRect, UserToDeviceSpace,
    },
};
use crate::object::{Dictionary, Stream};
use std::sync::Arc;

/// Tiling pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub matrix: PatternToUserSpace,
    pub x_step: f32,
    pub y_step: f32,
    pub bbox: PatternRect,
    /// Uncolored pattern (PaintType 2), painted with the color of the caller.
    pub is_mask: bool,
    pub resources: Dictionary,
    pub contents: Stream,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shading {
    pub shading_type: i32,
    pub colorspace: Arc<ColorSpace>,
    pub bbox: Option<UserRect>,
}

impl Shading {
    /// Device bounds of shading, infinite if shading has no `BBox`.
    pub fn bounds(&self, ctm: &UserToDeviceSpace) -> DeviceRect {
        self.bbox
            .as_ref()
            .map_or_else(infinite_rect, |r| transform_rect(ctm, r))
    }
}

/// Form XObject.
#[derive(Debug, Clone, PartialEq)]
pub struct XObject {
    pub matrix: FormToUserSpace,
    pub bbox: FormRect,
    /// None if form has no `Resources`, resources of caller are used.
    pub resources: Option<Dictionary>,
    pub contents: Stream,
    /// Has transparency group.
    pub transparency: bool,
    pub isolated: bool,
    pub knockout: bool,
    /// Color space of transparency group.
    pub colorspace: Option<Arc<ColorSpace>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    /// None for stencil mask image.
    pub colorspace: Option<Arc<ColorSpace>>,
    /// Explicit or soft mask.
    pub mask: Option<Arc<Image>>,
}

impl Image {
    pub fn is_stencil_mask(&self) -> bool {
        self.colorspace.is_none()
    }
}
