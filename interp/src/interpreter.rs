//! Content stream interpreter.
//!
//! `Interpreter` reads tokens of a content stream, keeps operands on a fixed
//! size stack, and dispatches operators against the graphics state and the
//! device. Forms, patterns and soft masks recurse into the same interpreter.
use crate::{
    device::{ClipAccumulate, Device, DeviceFlags},
    error::{InterpretError, InterpretResult},
    graphics::{
        color_space::{device_cmyk, device_gray, device_rgb, ColorSpace, ColorSpaceFamily},
        int_to_style,
        path::Path,
        trans::{matrix_from_operands, TextToUserSpace, UserToDeviceSpace, UserToUserSpace},
        LineCapStyle, LineJoinStyle, TextRenderingMode,
    },
    gstate::{GraphicsState, GraphicsStateStack, TextState},
    lexer::{parse_array, parse_dict, Lexer, SyntaxError, Token, TokenSource},
    material::{Paint, Target},
    object::{sname, Dictionary, Name, Object},
    ocg::OcgEvaluator,
    operator::Operator,
    option::InterpretOption,
    resources::{lookup, ResourceKind, ResourceLoader},
    text::TextRun,
};
use anyhow::Context;
use log::{debug, error, warn};
use std::{str::FromStr, sync::Arc};
use tinyvec::ArrayVec;

mod paint;
mod pattern;
mod text;
mod xobject;

/// Interprets content streams into device calls.
///
/// Graphics states saved by the streams are unwound when the interpreter is
/// dropped, leaving the device clip stack as it was before.
pub struct Interpreter<'a> {
    device: &'a mut dyn Device,
    loader: &'a dyn ResourceLoader,
    option: InterpretOption,

    stack: ArrayVec<[f32; 32]>,
    name: Option<Name>,
    string: ArrayVec<[u8; 256]>,
    /// Array, dictionary or string too long for `string`.
    obj: Option<Object>,

    gstates: GraphicsStateStack,
    /// CTM when the running stream started, patterns and shading paints are
    /// anchored to it.
    top_ctm: UserToDeviceSpace,
    path: Path,
    /// Pending `W`/`W*`, the even-odd flag. Applied by next path painting operator.
    clip: Option<bool>,

    text: Option<TextRun>,
    /// Render mode of `text`.
    text_mode: TextRenderingMode,
    text_clip: ClipAccumulate,
    tm: TextToUserSpace,
    tlm: TextToUserSpace,
    in_text: bool,

    /// `BX`/`EX` nesting, unknown operators are silent inside.
    xbalance: u32,
    /// Marked content nesting since the first hidden optional content.
    hidden: u32,
    /// Form, soft mask and pattern nesting.
    nesting: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        device: &'a mut dyn Device,
        loader: &'a dyn ResourceLoader,
        ctm: UserToDeviceSpace,
        option: InterpretOption,
    ) -> Self {
        Self::with_state(device, loader, GraphicsState::new(ctm), option)
    }

    /// Create interpreter starting from `state`, such as the state of the
    /// stream showing a Type 3 glyph.
    pub fn with_state(
        device: &'a mut dyn Device,
        loader: &'a dyn ResourceLoader,
        mut state: GraphicsState,
        option: InterpretOption,
    ) -> Self {
        state.clip_depth = 0;
        let top_ctm = state.ctm;
        let gstates = GraphicsStateStack::new(state, option.initial_gstate_capacity);
        Self {
            device,
            loader,
            option,
            stack: ArrayVec::new(),
            name: None,
            string: ArrayVec::new(),
            obj: None,
            gstates,
            top_ctm,
            path: Path::new(),
            clip: None,
            text: None,
            text_mode: TextRenderingMode::default(),
            text_clip: ClipAccumulate::Begin,
            tm: TextToUserSpace::identity(),
            tlm: TextToUserSpace::identity(),
            in_text: false,
            xbalance: 0,
            hidden: 0,
            nesting: 0,
        }
    }

    pub fn gstate(&self) -> &GraphicsState {
        self.gstates.top()
    }

    /// Run `contents`, a stream or an array of streams concatenated.
    ///
    /// Errors inside the stream are logged, only null `contents` is reported.
    pub fn run_contents(
        &mut self,
        resources: &Dictionary,
        contents: &Object,
    ) -> InterpretResult<()> {
        let loader = self.loader;
        match loader.resolve(contents) {
            Object::Stream(s) => {
                self.run_buffer(resources, s.data());
                Ok(())
            }
            Object::Array(parts) => {
                let mut buf = vec![];
                for part in parts {
                    match loader.resolve(part) {
                        Object::Stream(s) => {
                            buf.extend_from_slice(s.data());
                            buf.push(b'\n');
                        }
                        o => warn!("ignoring content part that is not a stream: {:?}", o),
                    }
                }
                self.run_buffer(resources, &buf);
                Ok(())
            }
            _ => Err(InterpretError::NullContent),
        }
    }

    /// Run decoded content bytes, a fatal error stops the stream and is logged.
    pub(crate) fn run_buffer(&mut self, resources: &Dictionary, data: &[u8]) {
        let in_text = std::mem::replace(&mut self.in_text, false);
        let (tm, tlm) = (self.tm, self.tlm);
        let text = self.text.take();

        let mut lexer = Lexer::new(data);
        if let Err(e) = self.run_stream(resources, &mut lexer) {
            error!("couldn't parse the whole content stream, rendering anyway: {}", e);
        }
        // stream ended inside a text object
        self.flush_text();

        self.text = text;
        (self.tm, self.tlm) = (tm, tlm);
        self.in_text = in_text;
    }

    fn run_stream(
        &mut self,
        resources: &Dictionary,
        lexer: &mut dyn TokenSource,
    ) -> InterpretResult<()> {
        self.clear_stack();
        loop {
            match lexer.next_token()? {
                Token::EndOfStream => return Ok(()),
                Token::Integer(v) => self.push_operand(v as f32)?,
                Token::Real(v) => self.push_operand(v)?,
                Token::Name(n) => self.name = Some(n),
                Token::String(s) => self.set_string(s),
                Token::OpenArray if self.in_text => {
                    if !self.stream_text_array(lexer)? {
                        return Ok(());
                    }
                }
                Token::OpenArray => self.obj = Some(Object::Array(parse_array(lexer)?)),
                Token::OpenDict => self.obj = Some(Object::Dictionary(parse_dict(lexer)?)),
                Token::Keyword(kw) => {
                    let r = self.run_keyword(resources, &kw, lexer);
                    self.clear_stack();
                    match r {
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => warn!("{}: {}", kw, e),
                        Ok(()) => (),
                    }
                }
                t @ (Token::CloseArray | Token::CloseDict) => {
                    return Err(SyntaxError::UnexpectedToken(format!("{:?}", t)).into())
                }
            }
        }
    }

    fn push_operand(&mut self, v: f32) -> InterpretResult<()> {
        match self.stack.try_push(v) {
            None => Ok(()),
            Some(_) => Err(InterpretError::StackOverflow),
        }
    }

    fn set_string(&mut self, s: Vec<u8>) {
        self.string.clear();
        if s.len() <= self.string.capacity() {
            self.string.extend_from_slice(&s);
        } else {
            self.obj = Some(Object::String(s));
        }
    }

    fn clear_stack(&mut self) {
        self.stack.clear();
        self.name = None;
        self.string.clear();
        self.obj = None;
    }

    /// Missing operands read as zero.
    fn operand(&self, i: usize) -> f32 {
        self.stack.get(i).copied().unwrap_or_default()
    }

    fn operands<const N: usize>(&self) -> [f32; N] {
        std::array::from_fn(|i| self.operand(i))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn int_operand(&self, i: usize) -> i32 {
        self.operand(i) as i32
    }

    fn take_name(&mut self) -> Name {
        self.name.take().unwrap_or_else(|| sname(""))
    }

    fn text_state_mut(&mut self) -> &mut TextState {
        &mut self.gstates.top_mut().text
    }

    fn run_keyword(
        &mut self,
        resources: &Dictionary,
        kw: &Name,
        lexer: &mut dyn TokenSource,
    ) -> InterpretResult<()> {
        let Ok(op) = Operator::from_str(kw.as_str()) else {
            if self.xbalance == 0 {
                warn!("unknown keyword: '{}'", kw);
            }
            return Ok(());
        };

        debug!("handle operation: {:?}", op);
        match op {
            // Path Construction Operations
            Operator::MoveTo => {
                let [x, y] = self.operands();
                self.path.move_to(x, y);
            }
            Operator::LineTo => {
                let [x, y] = self.operands();
                self.path.line_to(x, y);
            }
            Operator::CurveTo => {
                let [x1, y1, x2, y2, x3, y3] = self.operands();
                self.path.curve_to(x1, y1, x2, y2, x3, y3);
            }
            Operator::CurveToV => {
                let [x2, y2, x3, y3] = self.operands();
                self.path.curve_v(x2, y2, x3, y3);
            }
            Operator::CurveToY => {
                let [x1, y1, x3, y3] = self.operands();
                self.path.curve_y(x1, y1, x3, y3);
            }
            Operator::ClosePath => self.path.close_path(),
            Operator::Rectangle => {
                let [x, y, w, h] = self.operands();
                self.path.rect(x, y, w, h);
            }

            // Path Painting Operations
            Operator::Stroke => self.show_path(false, false, true, false),
            Operator::CloseAndStroke => self.show_path(true, false, true, false),
            Operator::Fill => self.show_path(false, true, false, false),
            Operator::FillEvenOdd => self.show_path(false, true, false, true),
            Operator::FillAndStroke => self.show_path(false, true, true, false),
            Operator::FillEvenOddAndStroke => self.show_path(false, true, true, true),
            Operator::CloseFillAndStroke => self.show_path(true, true, true, false),
            Operator::CloseFillEvenOddAndStroke => self.show_path(true, true, true, true),
            Operator::EndPath => self.show_path(false, false, false, false),
            Operator::Clip => self.clip = Some(false),
            Operator::ClipEvenOdd => self.clip = Some(true),

            // General Graphics State Operations
            Operator::Save => self.gstates.save(),
            Operator::Restore => {
                self.gstates.restore(self.device);
            }
            Operator::ConcatMatrix => {
                self.flush_text();
                let m: UserToUserSpace = matrix_from_operands(self.operands());
                let gs = self.gstates.top_mut();
                gs.ctm = m.then(&gs.ctm);
            }
            Operator::SetLineWidth => {
                self.flush_text();
                let w = self.operand(0);
                self.gstates.top_mut().stroke_state.line_width = w;
            }
            Operator::SetLineCap => {
                self.flush_text();
                let cap = int_to_style(self.int_operand(0), LineCapStyle::from_repr);
                self.gstates.top_mut().stroke_state.cap = cap;
            }
            Operator::SetLineJoin => {
                self.flush_text();
                let join = int_to_style(self.int_operand(0), LineJoinStyle::from_repr);
                self.gstates.top_mut().stroke_state.join = join;
            }
            Operator::SetMiterLimit => {
                self.flush_text();
                let limit = self.operand(0);
                self.gstates.top_mut().stroke_state.miter_limit = limit;
            }
            Operator::SetDash => {
                self.flush_text();
                let phase = self.operand(0);
                let dash = match &self.obj {
                    Some(Object::Array(arr)) => arr.clone(),
                    _ => vec![],
                };
                self.gstates
                    .top_mut()
                    .stroke_state
                    .set_dash(&dash, phase);
            }
            Operator::SetIntent | Operator::SetFlatness => (),
            Operator::SetExtGState => self.set_ext_gstate(resources)?,

            // Color Operations
            Operator::SetFillGray => self.set_device_color(Target::Fill, device_gray())?,
            Operator::SetStrokeGray => self.set_device_color(Target::Stroke, device_gray())?,
            Operator::SetFillRgb => self.set_device_color(Target::Fill, device_rgb())?,
            Operator::SetStrokeRgb => self.set_device_color(Target::Stroke, device_rgb())?,
            Operator::SetFillCmyk => self.set_device_color(Target::Fill, device_cmyk())?,
            Operator::SetStrokeCmyk => self.set_device_color(Target::Stroke, device_cmyk())?,
            Operator::SetFillColorSpace => self.set_colorspace(resources, Target::Fill)?,
            Operator::SetStrokeColorSpace => self.set_colorspace(resources, Target::Stroke)?,
            Operator::SetFillColor => self.set_color(resources, Target::Fill)?,
            Operator::SetStrokeColor => self.set_color(resources, Target::Stroke)?,

            // Text Object Operations
            Operator::BeginText => {
                self.in_text = true;
                self.tm = TextToUserSpace::identity();
                self.tlm = TextToUserSpace::identity();
            }
            Operator::EndText => {
                self.flush_text();
                self.text_clip = ClipAccumulate::Begin;
                self.in_text = false;
            }

            // Text State Operations
            Operator::SetCharSpacing => {
                let v = self.operand(0);
                self.text_state_mut().char_spacing = v;
            }
            Operator::SetWordSpacing => {
                let v = self.operand(0);
                self.text_state_mut().word_spacing = v;
            }
            Operator::SetHorizontalScale => {
                self.flush_text();
                let scale = self.operand(0) / 100.0;
                self.text_state_mut().scale = scale;
            }
            Operator::SetLeading => {
                let v = self.operand(0);
                self.text_state_mut().leading = v;
            }
            Operator::SetFont => self.set_font(resources)?,
            Operator::SetRenderMode => {
                let mode = int_to_style(self.int_operand(0), TextRenderingMode::from_repr);
                self.text_state_mut().render_mode = mode;
            }
            Operator::SetRise => {
                let v = self.operand(0);
                self.text_state_mut().rise = v;
            }

            // Text Positioning Operations
            Operator::MoveTextPosition => {
                let [tx, ty] = self.operands();
                self.move_text(tx, ty);
            }
            Operator::MoveTextPositionSetLeading => {
                let [tx, ty] = self.operands();
                self.text_state_mut().leading = -ty;
                self.move_text(tx, ty);
            }
            Operator::SetTextMatrix => {
                self.tm = matrix_from_operands(self.operands());
                self.tlm = self.tm;
            }
            Operator::NextLine => self.next_line(),

            // Text Showing Operations
            Operator::ShowText | Operator::ShowTextArray => self.show_text_operand()?,
            Operator::NextLineShowText => {
                self.next_line();
                self.show_text_operand()?;
            }
            Operator::NextLineSetSpacingShowText => {
                let [word_spacing, char_spacing] = self.operands();
                let text = self.text_state_mut();
                text.word_spacing = word_spacing;
                text.char_spacing = char_spacing;
                self.next_line();
                self.show_text_operand()?;
            }

            // Type 3 Font
            Operator::SetGlyphWidth => self.device.set_flags(DeviceFlags::CHARPROC_COLOR),
            Operator::SetGlyphWidthAndBBox => self.device.set_flags(DeviceFlags::CHARPROC_MASK),

            // XObjects, Inline Images and Shadings
            Operator::PaintXObject => self.paint_xobject(resources)?,
            Operator::BeginInlineImage => self.inline_image(resources, lexer)?,
            Operator::PaintShading => self.paint_shading(resources)?,

            // Marked Content Operations
            Operator::MarkedContentPoint | Operator::MarkedContentPointWithProperties => (),
            Operator::BeginMarkedContent => {
                if self.hidden > 0 {
                    self.hidden += 1;
                }
            }
            Operator::BeginMarkedContentWithProperties => self.begin_marked_content(resources),
            Operator::EndMarkedContent => {
                if self.hidden > 0 {
                    self.flush_text();
                    self.hidden -= 1;
                }
            }

            // Compatibility Operations
            Operator::BeginCompatibility => self.xbalance += 1,
            Operator::EndCompatibility => self.xbalance = self.xbalance.saturating_sub(1),
        }
        Ok(())
    }

    fn set_device_color(&mut self, target: Target, cs: Arc<ColorSpace>) -> InterpretResult<()> {
        self.flush_text();
        let material = self.gstates.top_mut().material_mut(target);
        material.set_colorspace(cs);
        material.set_color(&self.stack)
    }

    /// `cs`/`CS`, device families are resolved without resources.
    fn set_colorspace(&mut self, resources: &Dictionary, target: Target) -> InterpretResult<()> {
        let name = self.take_name();
        let loader = self.loader;
        let cs = match name.as_str() {
            "DeviceGray" => device_gray(),
            "DeviceRGB" => device_rgb(),
            "DeviceCMYK" => device_cmyk(),
            "Pattern" => {
                self.flush_text();
                let material = self.gstates.top_mut().material_mut(target);
                material.set_pattern(None, None);
                return Ok(());
            }
            _ => {
                let obj = lookup(loader, resources, ResourceKind::ColorSpace, name.as_str())?;
                loader
                    .load_colorspace(obj)
                    .with_context(|| format!("cannot load colorspace '{}'", name))?
            }
        };

        self.flush_text();
        let material = self.gstates.top_mut().material_mut(target);
        if cs.family() == ColorSpaceFamily::Pattern {
            if let Some(base) = cs.base() {
                material.set_colorspace(Arc::clone(base));
            }
            material.set_pattern(None, None);
        } else {
            material.set_colorspace(cs);
        }
        Ok(())
    }

    /// `sc`/`scn`/`SC`/`SCN`, a name operand selects a pattern resource.
    fn set_color(&mut self, resources: &Dictionary, target: Target) -> InterpretResult<()> {
        self.flush_text();
        let Some(name) = self.name.take() else {
            let material = self.gstates.top_mut().material_mut(target);
            match material.paint() {
                Paint::None => return Err(InterpretError::NoColorInMask),
                Paint::Shading(_) => return Err(InterpretError::NoColorInShading),
                Paint::Color | Paint::Pattern(_) => (),
            }
            return material.set_color(&self.stack);
        };

        let loader = self.loader;
        let obj = lookup(loader, resources, ResourceKind::Pattern, name.as_str())?;
        match obj.as_dict()?.get_int("PatternType", 0)? {
            1 => {
                let pattern = loader
                    .load_pattern(obj)
                    .with_context(|| format!("cannot load pattern '{}'", name))?;
                let color = (!self.stack.is_empty()).then_some(&self.stack[..]);
                self.gstates
                    .top_mut()
                    .material_mut(target)
                    .set_pattern(Some(pattern), color);
            }
            2 => {
                let shading = loader
                    .load_shading(obj)
                    .with_context(|| format!("cannot load shading pattern '{}'", name))?;
                self.gstates.top_mut().material_mut(target).set_shading(shading);
            }
            t => return Err(InterpretError::UnknownPatternType(t)),
        }
        Ok(())
    }

    fn set_font(&mut self, resources: &Dictionary) -> InterpretResult<()> {
        let name = self.take_name();
        let size = self.operand(0);
        let text = self.text_state_mut();
        text.size = size;
        text.font = None;

        let loader = self.loader;
        let obj = lookup(loader, resources, ResourceKind::Font, name.as_str())?;
        let font = loader
            .load_font(obj)
            .with_context(|| format!("cannot load font '{}'", name))?;
        self.text_state_mut().font = Some(font);
        Ok(())
    }

    /// `BDC`, hidden optional content starts a hidden section.
    fn begin_marked_content(&mut self, resources: &Dictionary) {
        if self.hidden > 0 {
            self.hidden += 1;
            return;
        }

        let loader = self.loader;
        let evaluator = OcgEvaluator::new(loader, loader.ocg_config(), self.option.usage);
        let hidden = match (&self.obj, &self.name) {
            (Some(obj @ Object::Dictionary(_)), _) => evaluator.is_hidden(obj),
            (_, Some(name)) => evaluator
                .is_hidden_name(loader.get_dict(resources, "Properties"), name.as_str()),
            _ => false,
        };
        if hidden {
            self.flush_text();
            self.hidden += 1;
        }
    }

    /// Optional content `oc` of a form, image or annotation is hidden.
    fn is_hidden_oc(&self, oc: &Object) -> bool {
        OcgEvaluator::new(self.loader, self.loader.ocg_config(), self.option.usage).is_hidden(oc)
    }
}

impl Drop for Interpreter<'_> {
    fn drop(&mut self) {
        self.gstates.unwind(self.device);
    }
}
