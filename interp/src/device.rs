//! Painting surface driven by the interpreter.
use crate::{
    graphics::{
        color_space::ColorSpace,
        path::Path,
        pattern::{Image, Shading},
        trans::{DeviceRect, PatternRect, PatternToDeviceSpace, UserToDeviceSpace},
        BlendMode, StrokeState,
    },
    material::Material,
    text::TextRun,
};
use bitflags::bitflags;

bitflags! {
    /// Content a device wants the interpreter to skip.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DeviceHints: u32 {
        const IGNORE_IMAGE = 1;
        const IGNORE_SHADE = 2;
    }
}

bitflags! {
    /// Set by Type 3 glyph procedures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DeviceFlags: u32 {
        /// `d0`, glyph paints its own colors.
        const CHARPROC_COLOR = 1;
        /// `d1`, glyph is a shape painted with the caller's color.
        const CHARPROC_MASK = 2;
    }
}

/// How a text clip combines with text clips before it in the same text object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipAccumulate {
    /// Clip applied immediately.
    None,
    /// First run of an accumulated clip, pushes a new clip.
    Begin,
    /// Later run, merged into the clip started by `Begin`.
    Append,
}

/// Output of the interpreter. All methods default to no-op, so a device only
/// implements what it needs.
///
/// Every `clip_*` call, `begin_mask()` and `begin_group()` with mask are
/// matched by `pop_clip()`.
#[allow(unused_variables)]
pub trait Device {
    fn hints(&self) -> DeviceHints {
        DeviceHints::empty()
    }

    fn set_flags(&mut self, flags: DeviceFlags) {}

    fn fill_path(
        &mut self,
        path: &Path,
        even_odd: bool,
        ctm: &UserToDeviceSpace,
        material: &Material,
    ) {
    }

    fn stroke_path(
        &mut self,
        path: &Path,
        stroke: &StrokeState,
        ctm: &UserToDeviceSpace,
        material: &Material,
    ) {
    }

    fn clip_path(
        &mut self,
        path: &Path,
        even_odd: bool,
        ctm: &UserToDeviceSpace,
        bbox: &DeviceRect,
    ) {
    }

    fn clip_stroke_path(
        &mut self,
        path: &Path,
        stroke: &StrokeState,
        ctm: &UserToDeviceSpace,
        bbox: &DeviceRect,
    ) {
    }

    fn fill_text(&mut self, text: &TextRun, ctm: &UserToDeviceSpace, material: &Material) {}

    fn stroke_text(
        &mut self,
        text: &TextRun,
        stroke: &StrokeState,
        ctm: &UserToDeviceSpace,
        material: &Material,
    ) {
    }

    fn clip_text(&mut self, text: &TextRun, ctm: &UserToDeviceSpace, accumulate: ClipAccumulate) {}

    fn clip_stroke_text(
        &mut self,
        text: &TextRun,
        stroke: &StrokeState,
        ctm: &UserToDeviceSpace,
        bbox: &DeviceRect,
    ) {
    }

    /// Invisible text, nothing painted.
    fn ignore_text(&mut self, text: &TextRun, ctm: &UserToDeviceSpace) {}

    /// `ctm` maps the unit square to image area.
    fn fill_image(&mut self, image: &Image, ctm: &UserToDeviceSpace, alpha: f32) {}

    fn fill_image_mask(&mut self, image: &Image, ctm: &UserToDeviceSpace, material: &Material) {}

    fn clip_image_mask(&mut self, image: &Image, ctm: &UserToDeviceSpace, bbox: &DeviceRect) {}

    fn fill_shading(&mut self, shading: &Shading, ctm: &UserToDeviceSpace, alpha: f32) {}

    fn pop_clip(&mut self) {}

    fn begin_mask(
        &mut self,
        bbox: &DeviceRect,
        luminosity: bool,
        colorspace: &ColorSpace,
        backdrop: &[f32],
    ) {
    }

    fn end_mask(&mut self) {}

    fn begin_group(
        &mut self,
        bbox: &DeviceRect,
        isolated: bool,
        knockout: bool,
        blend_mode: BlendMode,
        alpha: f32,
    ) {
    }

    fn end_group(&mut self) {}

    /// Pattern content drawn once between `begin_tile()` and `end_tile()`
    /// is repeated by `x_step`, `y_step` over `area`.
    fn begin_tile(
        &mut self,
        area: &PatternRect,
        bbox: &PatternRect,
        x_step: f32,
        y_step: f32,
        ctm: &PatternToDeviceSpace,
    ) {
    }

    fn end_tile(&mut self) {}
}
