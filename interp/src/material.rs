//! Paint source of fill and stroke.
use crate::{
    error::{InterpretError, InterpretResult},
    graphics::{
        color_space::{device_gray, ColorSpace},
        pattern::{Pattern, Shading},
    },
};
use smallvec::SmallVec;
use std::sync::Arc;

/// Which material of graphics state an operator addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Fill,
    Stroke,
}

#[derive(Debug, Clone, Default)]
pub enum Paint {
    /// Paints nothing.
    None,
    #[default]
    Color,
    /// Tiling pattern, `None` after `cs /Pattern` until a pattern is selected.
    Pattern(Option<Arc<Pattern>>),
    Shading(Arc<Shading>),
}

pub type Components = SmallVec<[f32; 4]>;

#[derive(Debug, Clone)]
pub struct Material {
    paint: Paint,
    colorspace: Arc<ColorSpace>,
    /// Color of `Color` paint, or underlying color of uncolored pattern.
    /// Length always equals to channel count of `colorspace`.
    components: Components,
    alpha: f32,
}

impl Default for Material {
    /// Opaque black in DeviceGray.
    fn default() -> Self {
        Self {
            paint: Paint::Color,
            colorspace: device_gray(),
            components: SmallVec::from_slice(&[0.0]),
            alpha: 1.0,
        }
    }
}

impl Material {
    pub fn paint(&self) -> &Paint {
        &self.paint
    }

    pub fn colorspace(&self) -> &Arc<ColorSpace> {
        &self.colorspace
    }

    pub fn components(&self) -> &[f32] {
        &self.components
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    /// Switch to `Color` paint in `colorspace`, with its default color.
    pub fn set_colorspace(&mut self, colorspace: Arc<ColorSpace>) {
        let mut components: Components = SmallVec::from_elem(0.0, colorspace.n());
        if let Some(k) = components.get_mut(3) {
            *k = 1.0;
        }
        self.paint = Paint::Color;
        self.colorspace = colorspace;
        self.components = components;
    }

    /// Set color components, missing components are zero. Lab components are
    /// remapped into `0..=1` range.
    pub fn set_color(&mut self, v: &[f32]) -> InterpretResult<()> {
        if !matches!(self.paint, Paint::Color | Paint::Pattern(_)) {
            return Err(InterpretError::ColorIncompatible);
        }

        let n = self.colorspace.n();
        self.components.clear();
        self.components
            .extend((0..n).map(|i| v.get(i).copied().unwrap_or_default()));
        if self.colorspace.is_lab() && n == 3 {
            let c = &mut self.components;
            c[0] /= 100.0;
            c[1] = (c[1] + 100.0) / 200.0;
            c[2] = (c[2] + 100.0) / 200.0;
        }
        Ok(())
    }

    /// Switch to `Pattern` paint. Color of uncolored pattern is set if `v` exist.
    pub fn set_pattern(&mut self, pattern: Option<Arc<Pattern>>, v: Option<&[f32]>) {
        self.paint = Paint::Pattern(pattern);
        if let Some(v) = v {
            // paint is pattern now, set_color never fails
            let _ = self.set_color(v);
        }
    }

    pub fn set_shading(&mut self, shading: Arc<Shading>) {
        self.paint = Paint::Shading(shading);
    }

    /// Demote `Pattern` paint to `Color`, releasing the pattern.
    pub fn unset_pattern(&mut self) {
        if matches!(self.paint, Paint::Pattern(_)) {
            self.paint = Paint::Color;
        }
    }

    /// Material painting nothing.
    pub fn none() -> Self {
        Self {
            paint: Paint::None,
            ..Self::default()
        }
    }
}
