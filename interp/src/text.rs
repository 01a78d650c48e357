//! Fonts as seen by the interpreter, and glyph runs handed to devices.
use crate::graphics::trans::{
    transform_rect, DeviceRect, GlyphSpace, GlyphToUserSpace, UserToDeviceSpace,
};
use euclid::{point2, Box2D};
use smallvec::SmallVec;
use std::{fmt::Debug, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritingMode {
    #[default]
    Horizontal,
    Vertical,
}

/// Vertical metrics of a glyph, in thousandths of text space unit.
/// `(x, y)` is the position vector from horizontal to vertical origin,
/// `w` the vertical advance, normally negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VMetrics {
    pub x: f32,
    pub y: f32,
    pub w: f32,
}

pub type Unicode = SmallVec<[char; 2]>;

/// Loaded font, glyph rendering is done by devices.
pub trait Font: Debug {
    /// Decode one char code from start of `s`, returns the code and its
    /// length in bytes. `s` is never empty.
    fn decode(&self, s: &[u8]) -> (u32, usize) {
        (u32::from(s[0]), 1)
    }

    /// Map char code to CID, None if the code is not mapped.
    fn lookup_cid(&self, code: u32) -> Option<u32> {
        Some(code)
    }

    fn cid_to_gid(&self, cid: u32) -> u32 {
        cid
    }

    /// Vertical substitute of glyph, used in vertical writing mode.
    fn vertical_gid(&self, gid: u32) -> u32 {
        gid
    }

    /// Unicode of CID from ToUnicode map, or from the font's own cid to ucs
    /// table. Empty if unknown.
    fn to_unicode(&self, cid: u32) -> Unicode;

    /// Horizontal advance of CID, in thousandths of text space unit.
    fn h_metrics(&self, cid: u32) -> f32;

    fn v_metrics(&self, cid: u32) -> VMetrics {
        VMetrics {
            x: self.h_metrics(cid) / 2.0,
            y: 880.0,
            w: -1000.0,
        }
    }

    fn writing_mode(&self) -> WritingMode {
        WritingMode::Horizontal
    }

    /// Font bounding box in glyph space, one unit per em.
    fn bbox(&self) -> Box2D<f32, GlyphSpace> {
        Box2D::new(point2(0.0, 0.0), point2(1.0, 1.0))
    }
}

/// Two handles refer to the same loaded font.
pub fn same_font(a: &Arc<dyn Font>, b: &Arc<dyn Font>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// None for filler glyphs carrying the rest of a one-to-many unicode mapping.
    pub gid: Option<u32>,
    pub unicode: char,
    /// Origin in user space.
    pub x: f32,
    pub y: f32,
}

/// Glyphs sharing font, writing mode and the linear part of text rendering matrix.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub font: Arc<dyn Font>,
    /// Text rendering matrix without translation.
    pub trm: GlyphToUserSpace,
    pub wmode: WritingMode,
    pub glyphs: Vec<Glyph>,
}

impl TextRun {
    pub fn new(font: Arc<dyn Font>, trm: GlyphToUserSpace, wmode: WritingMode) -> Self {
        Self {
            font,
            trm: GlyphToUserSpace::new(trm.m11, trm.m12, trm.m21, trm.m22, 0.0, 0.0),
            wmode,
            glyphs: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Push glyph with its unicode, extra chars of `unicode` are added as filler glyphs.
    pub fn push(&mut self, gid: u32, unicode: &[char], x: f32, y: f32) {
        let mut chars = unicode.iter().copied();
        let first = chars.next().unwrap_or('?');
        self.glyphs.push(Glyph {
            gid: Some(gid),
            unicode: first,
            x,
            y,
        });
        self.glyphs.extend(chars.map(|unicode| Glyph {
            gid: None,
            unicode,
            x,
            y,
        }));
    }

    /// Glyph space to user space transform of glyph.
    pub fn glyph_transform(&self, glyph: &Glyph) -> GlyphToUserSpace {
        self.trm.then_translate((glyph.x, glyph.y).into())
    }

    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.unicode).collect()
    }

    /// Device space bounds of all glyphs, using the font bounding box.
    pub fn bounds(&self, ctm: &UserToDeviceSpace) -> DeviceRect {
        let bbox = self.font.bbox();
        self.glyphs
            .iter()
            .filter(|g| g.gid.is_some())
            .map(|g| transform_rect(&self.glyph_transform(g).then(ctm), &bbox))
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(DeviceRect::zero)
    }
}
