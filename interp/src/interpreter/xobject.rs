//! Form XObjects, soft masks, ExtGState and the other resource operators.
use super::Interpreter;
use crate::{
    device::DeviceHints,
    error::{InterpretError, InterpretResult},
    graphics::{
        color_space::device_gray,
        int_to_style,
        path::Path,
        pattern::XObject,
        trans::{transform_rect, DeviceRect, UserSpace, UserToUserSpace},
        BlendMode, LineCapStyle, LineJoinStyle,
    },
    gstate::SoftMask,
    lexer::{parse_inline_image_dict, TokenSource},
    material::Components,
    object::{Dictionary, Object},
    resources::{lookup, ResourceKind},
};
use anyhow::Context;
use log::{debug, info, warn};
use smallvec::SmallVec;

impl Interpreter<'_> {
    /// Run form `xobject` with `transform` applied before its own matrix.
    ///
    /// Transparency group forms are painted inside a device group, with the
    /// soft mask of current state applied to the group.
    pub fn run_xobject(
        &mut self,
        resources: &Dictionary,
        xobject: &XObject,
        transform: UserToUserSpace,
    ) -> InterpretResult<()> {
        if self.nesting >= self.option.max_xobject_depth {
            return Err(InterpretError::RecursionLimit);
        }

        self.nesting += 1;
        self.gstates.save();
        let depth = self.gstates.depth();
        let old_top_ctm = self.top_ctm;

        let gs = self.gstates.top_mut();
        let form_to_device = xobject.matrix.then(&transform).then(&gs.ctm);
        gs.ctm = form_to_device.with_source::<UserSpace>();
        let bbox = transform_rect(&form_to_device, &xobject.bbox);

        let mut pop_mask = false;
        if xobject.transparency {
            if let Some(mask) = self.gstates.top_mut().soft_mask.take() {
                self.run_soft_mask(&mask, &bbox);
                pop_mask = true;
            }
            let gs = self.gstates.top_mut();
            self.device.begin_group(
                &bbox,
                xobject.isolated,
                xobject.knockout,
                gs.blend_mode,
                gs.fill.alpha(),
            );
            gs.blend_mode = BlendMode::Normal;
            gs.fill.set_alpha(1.0);
            gs.stroke.set_alpha(1.0);
        }

        let b = &xobject.bbox;
        let mut clip = Path::new();
        clip.rect(b.min.x, b.min.y, b.width(), b.height());
        self.path = clip;
        self.clip = Some(false);
        self.show_path(false, false, false, false);

        self.top_ctm = self.gstates.top().ctm;
        let resources = xobject.resources.as_ref().unwrap_or(resources);
        self.run_buffer(resources, xobject.contents.data());

        self.top_ctm = old_top_ctm;
        self.gstates.restore_to(depth, self.device);
        self.gstates.restore(self.device);
        if xobject.transparency {
            self.device.end_group();
            if pop_mask {
                self.device.pop_clip();
            }
        }
        self.nesting -= 1;
        Ok(())
    }

    /// Draw the mask group of `mask` between `begin_mask()` and `end_mask()`.
    /// Mask content does not inherit resources of the caller.
    pub(super) fn run_soft_mask(&mut self, mask: &SoftMask, bbox: &DeviceRect) {
        let xobject = &mask.xobject;
        let colorspace = xobject.colorspace.clone().unwrap_or_else(device_gray);
        self.device
            .begin_mask(bbox, mask.luminosity, &colorspace, &mask.backdrop);

        self.gstates.save();
        let depth = self.gstates.depth();
        let gs = self.gstates.top_mut();
        gs.ctm = mask.ctm;
        gs.soft_mask = None;
        let empty = Dictionary::new();
        let resources = xobject.resources.as_ref().unwrap_or(&empty);
        if let Err(e) = self.run_xobject(resources, xobject, UserToUserSpace::identity()) {
            warn!("cannot run soft mask: {}", e);
        }
        self.gstates.restore_to(depth - 1, self.device);

        self.device.end_mask();
    }

    /// `Do`
    pub(super) fn paint_xobject(&mut self, resources: &Dictionary) -> InterpretResult<()> {
        let name = self.take_name();
        let loader = self.loader;
        let obj = lookup(loader, resources, ResourceKind::XObject, name.as_str())?;
        let dict = obj.as_dict()?;
        let mut subtype = dict
            .get_name("Subtype")
            .ok_or(InterpretError::MissingXObjectSubtype)?;
        if self.is_hidden_oc(dict.get_or_null("OC")) {
            return Ok(());
        }
        if subtype.as_str() == "Form" {
            if let Some(subtype2) = dict.get_name("Subtype2") {
                subtype = subtype2;
            }
        }

        match subtype.as_str() {
            "Form" => {
                let xobject = loader
                    .load_xobject(obj)
                    .with_context(|| format!("cannot load xobject '{}'", name))?;
                self.run_xobject(resources, &xobject, UserToUserSpace::identity())
            }
            "Image" => {
                if !self.device.hints().contains(DeviceHints::IGNORE_IMAGE) {
                    let image = loader
                        .load_image(obj)
                        .with_context(|| format!("cannot draw image '{}'", name))?;
                    self.show_image(&image);
                }
                Ok(())
            }
            "PS" => {
                warn!("ignoring XObject with subtype PS");
                Ok(())
            }
            _ => Err(InterpretError::UnknownXObjectSubtype(subtype.clone())),
        }
    }

    /// `BI`, reads the inline image up to `EI`.
    pub(super) fn inline_image(
        &mut self,
        resources: &Dictionary,
        lexer: &mut dyn TokenSource,
    ) -> InterpretResult<()> {
        let dict = parse_inline_image_dict(lexer)?;
        let data = lexer.read_inline_image_data()?;
        if self.device.hints().contains(DeviceHints::IGNORE_IMAGE) {
            return Ok(());
        }
        let image = self
            .loader
            .load_inline_image(&dict, &data, resources)
            .context("cannot draw inline image")?;
        self.show_image(&image);
        Ok(())
    }

    /// `sh`
    pub(super) fn paint_shading(&mut self, resources: &Dictionary) -> InterpretResult<()> {
        let name = self.take_name();
        let loader = self.loader;
        let obj = lookup(loader, resources, ResourceKind::Shading, name.as_str())?;
        if self.device.hints().contains(DeviceHints::IGNORE_SHADE) {
            return Ok(());
        }
        let shading = loader
            .load_shading(obj)
            .with_context(|| format!("cannot draw shading '{}'", name))?;
        self.show_shading(&shading);
        Ok(())
    }

    /// `gs`, malformed entries are skipped.
    pub(super) fn set_ext_gstate(&mut self, resources: &Dictionary) -> InterpretResult<()> {
        let name = self.take_name();
        let loader = self.loader;
        let obj = lookup(loader, resources, ResourceKind::ExtGState, name.as_str())?;
        let dict = obj.as_dict()?;

        self.flush_text();
        for (key, value) in dict.iter() {
            if let Err(e) = self.set_ext_gstate_entry(key.as_str(), loader.resolve(value)) {
                warn!("malformed /{} in ExtGState '{}': {}", key, name, e);
            }
        }
        Ok(())
    }

    fn set_ext_gstate_entry(&mut self, key: &str, value: &Object) -> InterpretResult<()> {
        let loader = self.loader;
        if key == "SMask" {
            return self.set_soft_mask(value);
        }

        let gs = self.gstates.top_mut();
        match key {
            "Type" => (),
            "Font" => {
                let [font, size] = &value.as_arr()?[..] else {
                    return Err(InterpretError::MalformedExtGState);
                };
                let size = loader.resolve(size).as_number()?;
                let font = loader
                    .load_font(loader.resolve(font))
                    .context("cannot load ExtGState font")?;
                gs.text.font = Some(font);
                gs.text.size = size;
            }
            "LC" => gs.stroke_state.cap = int_to_style(value.as_int()?, LineCapStyle::from_repr),
            "LW" => gs.stroke_state.line_width = value.as_number()?,
            "LJ" => {
                gs.stroke_state.join = int_to_style(value.as_int()?, LineJoinStyle::from_repr)
            }
            "ML" => gs.stroke_state.miter_limit = value.as_number()?,
            "D" => {
                let [dash, phase] = &value.as_arr()?[..] else {
                    return Err(InterpretError::MalformedExtGState);
                };
                let phase = loader.resolve(phase).as_number()?;
                gs.stroke_state.set_dash(loader.resolve(dash).as_arr()?, phase);
            }
            "CA" => gs.stroke.set_alpha(value.as_number()?),
            "ca" => gs.fill.set_alpha(value.as_number()?),
            "BM" => gs.blend_mode = BlendMode::from_object(value)?,
            "TR" | "TR2" => {
                if !matches!(value, Object::Name(n) if matches!(n.as_str(), "Identity" | "Default"))
                {
                    warn!("ignoring transfer function");
                }
            }
            "SM" => debug!("ExtGState key: SM (smoothness tolerance) not implemented"),
            k @ ("OPM" | "op" | "OP") => {
                debug!("ExtGState key {k} is for Overprint, which is not supported")
            }
            _ => info!("Unknown or unsupported ExtGState key: {}", key),
        }
        Ok(())
    }

    fn set_soft_mask(&mut self, value: &Object) -> InterpretResult<()> {
        let loader = self.loader;
        let dict = match value {
            Object::Name(n) if n.as_str() == "None" => {
                self.gstates.top_mut().soft_mask = None;
                return Ok(());
            }
            Object::Dictionary(d) => d,
            _ => return Err(InterpretError::MalformedExtGState),
        };

        let group = loader.get(dict, "G");
        if group.is_null() {
            return Err(InterpretError::MalformedExtGState);
        }
        let xobject = loader
            .load_xobject(group)
            .context("cannot load softmask xobject")?;
        let n = xobject.colorspace.as_ref().map_or(1, |cs| cs.n());
        let mut backdrop: Components = SmallVec::from_elem(0.0, n);
        if let Ok(bc) = loader.get(dict, "BC").as_arr() {
            for (c, v) in backdrop.iter_mut().zip(bc) {
                *c = loader.resolve(v).as_number().unwrap_or_default();
            }
        }
        let luminosity = dict
            .get_name("S")
            .is_some_and(|s| s.as_str() == "Luminosity");

        let gs = self.gstates.top_mut();
        gs.soft_mask = Some(SoftMask {
            xobject,
            ctm: gs.ctm,
            backdrop,
            luminosity,
        });
        Ok(())
    }
}
