//! Recording device, fixture fonts and an in-memory resource loader shared by tests.
use crate::{
    device::{ClipAccumulate, Device, DeviceFlags, DeviceHints},
    graphics::{
        color_space::{device_gray, device_rgb, ColorSpace, ColorSpaceFamily},
        path::Path,
        pattern::{Image, Pattern, Shading, XObject},
        trans::{
            matrix_from_objects, rect_from_objects, DeviceRect, PatternRect, PatternToDeviceSpace,
            UserToDeviceSpace,
        },
        BlendMode, StrokeState,
    },
    material::{Material, Paint},
    object::{Dictionary, Object, ObjectTable, Resolver, Stream},
    ocg::OcgConfig,
    resources::ResourceLoader,
    text::{Font, TextRun, Unicode, WritingMode},
};
use anyhow::{bail, Result as AnyResult};
use euclid::{point2, Box2D, Transform2D};
use smallvec::smallvec;
use std::{str::FromStr, sync::Arc};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FillPath {
        bbox: DeviceRect,
        even_odd: bool,
        color: Vec<f32>,
    },
    StrokePath {
        line_width: f32,
        color: Vec<f32>,
    },
    ClipPath {
        even_odd: bool,
    },
    ClipStrokePath,
    FillText(String),
    StrokeText(String),
    ClipText(String, ClipAccumulate),
    ClipStrokeText(String),
    IgnoreText(String),
    FillImage {
        width: u32,
        alpha: f32,
    },
    FillImageMask {
        color: Vec<f32>,
    },
    ClipImageMask,
    FillShading {
        alpha: f32,
    },
    PopClip,
    BeginMask {
        luminosity: bool,
        backdrop: Vec<f32>,
    },
    EndMask,
    BeginGroup {
        isolated: bool,
        knockout: bool,
        blend_mode: BlendMode,
        alpha: f32,
    },
    EndGroup,
    BeginTile {
        x_step: f32,
        y_step: f32,
    },
    EndTile,
    SetFlags(DeviceFlags),
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    pub calls: Vec<Call>,
    pub hints: DeviceHints,
}

impl RecordingDevice {
    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }

    /// Clips pushed minus clips popped.
    pub fn clip_balance(&self) -> isize {
        self.calls.iter().fold(0, |acc, c| match c {
            Call::ClipPath { .. }
            | Call::ClipStrokePath
            | Call::ClipStrokeText(_)
            | Call::ClipImageMask
            | Call::BeginMask { .. } => acc + 1,
            Call::ClipText(_, acc_mode) if *acc_mode != ClipAccumulate::Append => acc + 1,
            Call::PopClip => acc - 1,
            _ => acc,
        })
    }

    /// Groups begun minus groups ended.
    pub fn group_balance(&self) -> isize {
        self.calls.iter().fold(0, |acc, c| match c {
            Call::BeginGroup { .. } => acc + 1,
            Call::EndGroup => acc - 1,
            _ => acc,
        })
    }

    pub fn fills(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::FillPath { .. }))
            .collect()
    }
}

impl Device for RecordingDevice {
    fn hints(&self) -> DeviceHints {
        self.hints
    }

    fn set_flags(&mut self, flags: DeviceFlags) {
        self.calls.push(Call::SetFlags(flags));
    }

    fn fill_path(
        &mut self,
        path: &Path,
        even_odd: bool,
        ctm: &UserToDeviceSpace,
        material: &Material,
    ) {
        self.calls.push(Call::FillPath {
            bbox: path.bounds(ctm, None),
            even_odd,
            color: material.components().to_vec(),
        });
    }

    fn stroke_path(
        &mut self,
        _path: &Path,
        stroke: &StrokeState,
        _ctm: &UserToDeviceSpace,
        material: &Material,
    ) {
        self.calls.push(Call::StrokePath {
            line_width: stroke.line_width,
            color: material.components().to_vec(),
        });
    }

    fn clip_path(
        &mut self,
        _path: &Path,
        even_odd: bool,
        _ctm: &UserToDeviceSpace,
        _bbox: &DeviceRect,
    ) {
        self.calls.push(Call::ClipPath { even_odd });
    }

    fn clip_stroke_path(
        &mut self,
        _path: &Path,
        _stroke: &StrokeState,
        _ctm: &UserToDeviceSpace,
        _bbox: &DeviceRect,
    ) {
        self.calls.push(Call::ClipStrokePath);
    }

    fn fill_text(&mut self, text: &TextRun, _ctm: &UserToDeviceSpace, _material: &Material) {
        self.calls.push(Call::FillText(text.text()));
    }

    fn stroke_text(
        &mut self,
        text: &TextRun,
        _stroke: &StrokeState,
        _ctm: &UserToDeviceSpace,
        _material: &Material,
    ) {
        self.calls.push(Call::StrokeText(text.text()));
    }

    fn clip_text(&mut self, text: &TextRun, _ctm: &UserToDeviceSpace, accumulate: ClipAccumulate) {
        self.calls.push(Call::ClipText(text.text(), accumulate));
    }

    fn clip_stroke_text(
        &mut self,
        text: &TextRun,
        _stroke: &StrokeState,
        _ctm: &UserToDeviceSpace,
        _bbox: &DeviceRect,
    ) {
        self.calls.push(Call::ClipStrokeText(text.text()));
    }

    fn ignore_text(&mut self, text: &TextRun, _ctm: &UserToDeviceSpace) {
        self.calls.push(Call::IgnoreText(text.text()));
    }

    fn fill_image(&mut self, image: &Image, _ctm: &UserToDeviceSpace, alpha: f32) {
        self.calls.push(Call::FillImage {
            width: image.width,
            alpha,
        });
    }

    fn fill_image_mask(&mut self, _image: &Image, _ctm: &UserToDeviceSpace, material: &Material) {
        self.calls.push(Call::FillImageMask {
            color: material.components().to_vec(),
        });
    }

    fn clip_image_mask(&mut self, _image: &Image, _ctm: &UserToDeviceSpace, _bbox: &DeviceRect) {
        self.calls.push(Call::ClipImageMask);
    }

    fn fill_shading(&mut self, _shading: &Shading, _ctm: &UserToDeviceSpace, alpha: f32) {
        self.calls.push(Call::FillShading { alpha });
    }

    fn pop_clip(&mut self) {
        self.calls.push(Call::PopClip);
    }

    fn begin_mask(
        &mut self,
        _bbox: &DeviceRect,
        luminosity: bool,
        _colorspace: &ColorSpace,
        backdrop: &[f32],
    ) {
        self.calls.push(Call::BeginMask {
            luminosity,
            backdrop: backdrop.to_vec(),
        });
    }

    fn end_mask(&mut self) {
        self.calls.push(Call::EndMask);
    }

    fn begin_group(
        &mut self,
        _bbox: &DeviceRect,
        isolated: bool,
        knockout: bool,
        blend_mode: BlendMode,
        alpha: f32,
    ) {
        self.calls.push(Call::BeginGroup {
            isolated,
            knockout,
            blend_mode,
            alpha,
        });
    }

    fn end_group(&mut self) {
        self.calls.push(Call::EndGroup);
    }

    fn begin_tile(
        &mut self,
        _area: &PatternRect,
        _bbox: &PatternRect,
        x_step: f32,
        y_step: f32,
        _ctm: &PatternToDeviceSpace,
    ) {
        self.calls.push(Call::BeginTile { x_step, y_step });
    }

    fn end_tile(&mut self) {
        self.calls.push(Call::EndTile);
    }
}

/// Every glyph has the same advance. Code 0 has no unicode, code 1 maps to
/// the `fi` ligature, code 0xFF is not encoded.
#[derive(Debug)]
pub struct FixedWidthFont {
    pub width: f32,
    pub wmode: WritingMode,
}

impl Default for FixedWidthFont {
    fn default() -> Self {
        Self {
            width: 500.0,
            wmode: WritingMode::Horizontal,
        }
    }
}

impl Font for FixedWidthFont {
    fn lookup_cid(&self, code: u32) -> Option<u32> {
        (code != 0xFF).then_some(code)
    }

    fn to_unicode(&self, cid: u32) -> Unicode {
        match cid {
            0 => smallvec![],
            1 => smallvec!['f', 'i'],
            _ => char::from_u32(cid).map_or_else(|| smallvec![], |c| smallvec![c]),
        }
    }

    fn h_metrics(&self, _cid: u32) -> f32 {
        self.width
    }

    fn writing_mode(&self) -> WritingMode {
        self.wmode
    }
}

fn empty_stream() -> Stream {
    Stream::new(Dictionary::new(), Vec::new())
}

pub fn new_pattern(is_mask: bool) -> Arc<Pattern> {
    Arc::new(Pattern {
        matrix: Transform2D::identity(),
        x_step: 10.0,
        y_step: 10.0,
        bbox: Box2D::new(point2(0.0, 0.0), point2(10.0, 10.0)),
        is_mask,
        resources: Dictionary::new(),
        contents: empty_stream(),
    })
}

pub fn new_shading() -> Arc<Shading> {
    Arc::new(Shading {
        shading_type: 2,
        colorspace: device_rgb(),
        bbox: None,
    })
}

/// Build content stream object with `dict` entries.
pub fn stream(dict: Dictionary, content: &str) -> Object {
    Object::Stream(Stream::new(dict, content.as_bytes().to_vec()))
}

/// Build `Dictionary` from key value pairs.
pub fn dict<const N: usize>(entries: [(&'static str, Object); N]) -> Dictionary {
    let mut d = Dictionary::new();
    for (k, v) in entries {
        d.set(k, v);
    }
    d
}

pub fn rect_object(x0: f32, y0: f32, x1: f32, y1: f32) -> Object {
    Object::Array(vec![x0.into(), y0.into(), x1.into(), y1.into()])
}

/// Loader building resource values directly from the object dictionaries,
/// indirect objects come from `objects`.
#[derive(Debug, Default)]
pub struct TestLoader {
    pub objects: ObjectTable,
    pub ocg_config: Option<OcgConfig>,
}

impl TestLoader {
    fn matrix<S, D>(&self, d: &Dictionary) -> AnyResult<Transform2D<f32, S, D>> {
        Ok(match self.get(d, "Matrix") {
            Object::Null => Transform2D::identity(),
            o => matrix_from_objects(o.as_arr()?)?,
        })
    }

    fn bbox<S>(&self, d: &Dictionary) -> AnyResult<Box2D<f32, S>> {
        Ok(rect_from_objects(self.get(d, "BBox").as_arr()?)?)
    }
}

impl Resolver for TestLoader {
    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        self.objects.resolve(obj)
    }
}

impl ResourceLoader for TestLoader {
    fn load_colorspace(&self, obj: &Object) -> AnyResult<Arc<ColorSpace>> {
        let family = match obj {
            Object::Name(n) => n,
            Object::Array(arr) => self.resolve(&arr[0]).as_name()?,
            _ => bail!("invalid color space"),
        };
        let family = ColorSpaceFamily::from_str(family.as_str())?;
        if family == ColorSpaceFamily::Pattern {
            let base = match obj {
                Object::Array(arr) if arr.len() > 1 => Some(self.load_colorspace(&arr[1])?),
                _ => None,
            };
            return Ok(Arc::new(ColorSpace::pattern(base)));
        }
        let n = match family {
            ColorSpaceFamily::DeviceGray
            | ColorSpaceFamily::CalGray
            | ColorSpaceFamily::Indexed
            | ColorSpaceFamily::Separation => 1,
            ColorSpaceFamily::DeviceCmyk => 4,
            _ => 3,
        };
        Ok(Arc::new(ColorSpace::new(family, n)))
    }

    fn load_font(&self, obj: &Object) -> AnyResult<Arc<dyn Font>> {
        let d = obj.as_dict()?;
        if d.get_name("Type").map(|n| n.as_str()) != Some("Font") {
            bail!("not a font");
        }
        Ok(Arc::new(FixedWidthFont {
            width: d.get_number("Width", 500.0)?,
            wmode: if d.get_int("WMode", 0)? == 1 {
                WritingMode::Vertical
            } else {
                WritingMode::Horizontal
            },
        }))
    }

    fn load_image(&self, obj: &Object) -> AnyResult<Arc<Image>> {
        let d = obj.as_stream()?.as_dict();
        let mask = match self.get(d, "SMask") {
            Object::Null => None,
            o => Some(self.load_image(o)?),
        };
        Ok(Arc::new(Image {
            width: u32::try_from(d.get_int("Width", 0)?)?,
            height: u32::try_from(d.get_int("Height", 0)?)?,
            colorspace: (!d.get_bool("ImageMask", false)?).then(device_gray),
            mask,
        }))
    }

    fn load_inline_image(
        &self,
        dict: &Dictionary,
        data: &[u8],
        _resources: &Dictionary,
    ) -> AnyResult<Arc<Image>> {
        let width = u32::try_from(dict.get_int("W", 0)?)?;
        let height = u32::try_from(dict.get_int("H", 0)?)?;
        if data.is_empty() {
            bail!("inline image without data");
        }
        Ok(Arc::new(Image {
            width,
            height,
            colorspace: (!dict.get_bool("IM", false)?).then(device_gray),
            mask: None,
        }))
    }

    fn load_shading(&self, obj: &Object) -> AnyResult<Arc<Shading>> {
        let d = obj.as_dict()?;
        // shading pattern carries the shading in `Shading` entry
        let d = self.get_dict(d, "Shading").unwrap_or(d);
        let bbox = match self.get(d, "BBox") {
            Object::Null => None,
            o => Some(rect_from_objects(o.as_arr()?)?),
        };
        Ok(Arc::new(Shading {
            shading_type: d.get_int("ShadingType", 0)?,
            colorspace: device_rgb(),
            bbox,
        }))
    }

    fn load_pattern(&self, obj: &Object) -> AnyResult<Arc<Pattern>> {
        let s = obj.as_stream()?;
        let d = s.as_dict();
        Ok(Arc::new(Pattern {
            matrix: self.matrix(d)?,
            x_step: d.get_number("XStep", 0.0)?,
            y_step: d.get_number("YStep", 0.0)?,
            bbox: self.bbox(d)?,
            is_mask: d.get_int("PaintType", 1)? == 2,
            resources: self.get_dict(d, "Resources").cloned().unwrap_or_default(),
            contents: s.clone(),
        }))
    }

    fn load_xobject(&self, obj: &Object) -> AnyResult<Arc<XObject>> {
        let s = obj.as_stream()?;
        let d = s.as_dict();
        let group = self.get_dict(d, "Group");
        Ok(Arc::new(XObject {
            matrix: self.matrix(d)?,
            bbox: self.bbox(d)?,
            resources: self.get_dict(d, "Resources").cloned(),
            contents: s.clone(),
            transparency: group.is_some(),
            isolated: group.map_or(Ok(false), |g| g.get_bool("I", false))?,
            knockout: group.map_or(Ok(false), |g| g.get_bool("K", false))?,
            colorspace: None,
        }))
    }

    fn ocg_config(&self) -> Option<&OcgConfig> {
        self.ocg_config.as_ref()
    }
}

/// Paint kind name of material, for assertions.
pub fn paint_kind(m: &Material) -> &'static str {
    match m.paint() {
        Paint::None => "none",
        Paint::Color => "color",
        Paint::Pattern(_) => "pattern",
        Paint::Shading(_) => "shading",
    }
}
