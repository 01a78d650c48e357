//! Painting of paths, text runs, images and shadings with the current
//! materials, wrapped by soft mask and blend mode groups.
use super::Interpreter;
use crate::{
    device::{ClipAccumulate, Device},
    graphics::{
        pattern::{Image, Shading},
        trans::{transform_rect, DeviceRect, UserRect},
        BlendMode, StrokeState,
    },
    material::{Material, Paint, Target},
};
use euclid::point2;

impl Interpreter<'_> {
    /// Paint current path and start a new one, applies pending clip.
    pub(super) fn show_path(&mut self, close: bool, fill: bool, stroke: bool, even_odd: bool) {
        let mut path = std::mem::take(&mut self.path);
        if close {
            path.close_path();
        }
        let gs = self.gstates.top();
        let ctm = gs.ctm;
        let stroke_state = gs.stroke_state.clone();
        let bbox = path.bounds(&ctm, stroke.then_some(&stroke_state));

        if let Some(clip_even_odd) = self.clip.take() {
            self.gstates.top_mut().clip_depth += 1;
            self.device.clip_path(&path, clip_even_odd, &ctm, &bbox);
        }

        let hidden = self.hidden > 0;
        let (fill, stroke) = (fill && !hidden, stroke && !hidden);
        if !fill && !stroke {
            return;
        }

        self.begin_group(&bbox);
        if fill {
            let material = self.gstates.top().fill.clone();
            match material.paint() {
                Paint::Color if path.is_single_line() => {
                    // a filled line vanishes, draw it as hairline
                    let expansion = ctm.determinant().abs().sqrt();
                    let hairline = StrokeState {
                        line_width: if expansion > 0.0 { 0.1 / expansion } else { 0.1 },
                        ..StrokeState::default()
                    };
                    self.device.stroke_path(&path, &hairline, &ctm, &material);
                }
                Paint::Color => self.device.fill_path(&path, even_odd, &ctm, &material),
                _ => self.paint_clipped(&material, &bbox, Target::Fill, |d| {
                    d.clip_path(&path, even_odd, &ctm, &bbox)
                }),
            }
        }
        if stroke {
            let material = self.gstates.top().stroke.clone();
            match material.paint() {
                Paint::Color => self
                    .device
                    .stroke_path(&path, &stroke_state, &ctm, &material),
                _ => self.paint_clipped(&material, &bbox, Target::Stroke, |d| {
                    d.clip_stroke_path(&path, &stroke_state, &ctm, &bbox)
                }),
            }
        }
        self.end_group();
    }

    /// Paint pending text run with the render mode it was started with.
    pub(crate) fn flush_text(&mut self) {
        let Some(text) = self.text.take() else {
            return;
        };
        if text.is_empty() {
            return;
        }

        let mode = self.text_mode;
        let hidden = self.hidden > 0;
        let (fill, stroke) = (mode.fill() && !hidden, mode.stroke() && !hidden);
        let gs = self.gstates.top();
        let ctm = gs.ctm;
        let stroke_state = gs.stroke_state.clone();
        let bbox = text.bounds(&ctm);

        self.begin_group(&bbox);
        if mode.invisible() {
            self.device.ignore_text(&text, &ctm);
        }
        if mode.clip() {
            if self.text_clip != ClipAccumulate::Append {
                self.gstates.top_mut().clip_depth += 1;
            }
            self.device.clip_text(&text, &ctm, self.text_clip);
            self.text_clip = ClipAccumulate::Append;
        }
        if fill {
            let material = self.gstates.top().fill.clone();
            match material.paint() {
                Paint::Color => self.device.fill_text(&text, &ctm, &material),
                _ => self.paint_clipped(&material, &bbox, Target::Fill, |d| {
                    d.clip_text(&text, &ctm, ClipAccumulate::None)
                }),
            }
        }
        if stroke {
            let material = self.gstates.top().stroke.clone();
            match material.paint() {
                Paint::Color => self
                    .device
                    .stroke_text(&text, &stroke_state, &ctm, &material),
                _ => self.paint_clipped(&material, &bbox, Target::Stroke, |d| {
                    d.clip_stroke_text(&text, &stroke_state, &ctm, &bbox)
                }),
            }
        }
        self.end_group();
    }

    /// Paint image to unit square of CTM. Stencil mask is tinted by fill material.
    pub(super) fn show_image(&mut self, image: &Image) {
        if self.hidden > 0 {
            return;
        }

        let gs = self.gstates.top();
        let ctm = gs.ctm;
        let blend_mode = gs.blend_mode;
        let alpha = gs.fill.alpha();
        let bbox = transform_rect(&ctm, &UserRect::new(point2(0.0, 0.0), point2(1.0, 1.0)));

        match &image.mask {
            Some(mask) => {
                if blend_mode != BlendMode::Normal {
                    self.device
                        .begin_group(&bbox, false, false, blend_mode, 1.0);
                }
                self.device.clip_image_mask(mask, &ctm, &bbox);
            }
            None => self.begin_group(&bbox),
        }

        if image.is_stencil_mask() {
            let material = self.gstates.top().fill.clone();
            match material.paint() {
                Paint::Color => self.device.fill_image_mask(image, &ctm, &material),
                _ => self.paint_clipped(&material, &bbox, Target::Fill, |d| {
                    d.clip_image_mask(image, &ctm, &bbox)
                }),
            }
        } else {
            self.device.fill_image(image, &ctm, alpha);
        }

        if image.mask.is_some() {
            self.device.pop_clip();
            if blend_mode != BlendMode::Normal {
                self.device.end_group();
            }
        } else {
            self.end_group();
        }
    }

    pub(super) fn show_shading(&mut self, shading: &Shading) {
        if self.hidden > 0 {
            return;
        }

        let gs = self.gstates.top();
        let ctm = gs.ctm;
        let alpha = gs.fill.alpha();
        let bbox = shading.bounds(&ctm);
        self.begin_group(&bbox);
        self.device.fill_shading(shading, &ctm, alpha);
        self.end_group();
    }

    /// Paint pattern or shading `material` inside the clip pushed by `clip`.
    /// Shading paint is placed by the CTM the stream started with.
    fn paint_clipped(
        &mut self,
        material: &Material,
        bbox: &DeviceRect,
        target: Target,
        clip: impl FnOnce(&mut dyn Device),
    ) {
        match material.paint() {
            Paint::Pattern(Some(pattern)) => {
                clip(&mut *self.device);
                self.show_pattern(pattern, bbox, target);
                self.device.pop_clip();
            }
            Paint::Shading(shading) => {
                clip(&mut *self.device);
                self.device
                    .fill_shading(shading, &self.top_ctm, material.alpha());
                self.device.pop_clip();
            }
            Paint::None | Paint::Color | Paint::Pattern(None) => (),
        }
    }

    /// Start painting wrapper of current soft mask and blend mode.
    pub(super) fn begin_group(&mut self, bbox: &DeviceRect) {
        if let Some(mask) = self.gstates.top().soft_mask.clone() {
            let xobject = &mask.xobject;
            let mask_bbox = transform_rect(&xobject.matrix.then(&mask.ctm), &xobject.bbox);
            self.run_soft_mask(&mask, &mask_bbox);
        }

        let blend_mode = self.gstates.top().blend_mode;
        if blend_mode != BlendMode::Normal {
            self.device.begin_group(bbox, true, false, blend_mode, 1.0);
        }
    }

    pub(super) fn end_group(&mut self) {
        let gs = self.gstates.top();
        let (blend, masked) = (gs.blend_mode != BlendMode::Normal, gs.soft_mask.is_some());
        if blend {
            self.device.end_group();
        }
        if masked {
            self.device.pop_clip();
        }
    }
}
