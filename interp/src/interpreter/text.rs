//! Text positioning and showing.
use super::Interpreter;
use crate::{
    error::{InterpretError, InterpretResult},
    graphics::trans::GlyphToTextSpace,
    lexer::{SyntaxError, Token, TokenSource},
    object::Object,
    text::{same_font, Font, TextRun, WritingMode},
};
use log::warn;
use smallvec::smallvec;
use std::sync::Arc;

impl Interpreter<'_> {
    pub(super) fn move_text(&mut self, tx: f32, ty: f32) {
        self.tlm = self.tlm.pre_translate((tx, ty).into());
        self.tm = self.tlm;
    }

    pub(super) fn next_line(&mut self) {
        let leading = self.gstates.top().text.leading;
        self.move_text(0.0, -leading);
    }

    /// String operand of `Tj`, `'` and `"`, or array operand of `TJ`.
    pub(super) fn show_text_operand(&mut self) -> InterpretResult<()> {
        if !self.string.is_empty() {
            let s = std::mem::take(&mut self.string);
            self.show_string(&s)
        } else if let Some(obj) = self.obj.take() {
            self.show_text(&obj)
        } else {
            Ok(())
        }
    }

    /// Show `TJ` array items one by one as they are read, returns false if
    /// the stream ended inside the array.
    pub(super) fn stream_text_array(
        &mut self,
        lexer: &mut dyn TokenSource,
    ) -> InterpretResult<bool> {
        loop {
            let r = match lexer.next_token()? {
                Token::CloseArray => return Ok(true),
                Token::EndOfStream => return Ok(false),
                Token::Integer(v) => self.show_adjustment(v as f32),
                Token::Real(v) => self.show_adjustment(v),
                Token::String(s) => self.show_string(&s),
                Token::Keyword(kw) if matches!(kw.as_str(), "Tw" | "Tc") => {
                    warn!("ignoring keyword '{}' inside array", kw);
                    Ok(())
                }
                t => return Err(SyntaxError::UnexpectedToken(format!("{:?}", t)).into()),
            };
            if let Err(e) = r {
                warn!("TJ: {}", e);
            }
        }
    }

    pub(super) fn show_text(&mut self, obj: &Object) -> InterpretResult<()> {
        match obj {
            Object::Array(items) => {
                for item in items {
                    match item {
                        Object::String(s) => self.show_string(s)?,
                        Object::Integer(_) | Object::Number(_) => {
                            self.show_adjustment(item.as_number()?)?
                        }
                        _ => (),
                    }
                }
                Ok(())
            }
            Object::String(s) => self.show_string(s),
            _ => Ok(()),
        }
    }

    /// `TJ` number, in thousandths of text space unit.
    fn show_adjustment(&mut self, v: f32) -> InterpretResult<()> {
        let size = self.gstates.top().text.size;
        self.show_space(-v * size * 0.001)
    }

    pub(super) fn show_space(&mut self, tadj: f32) -> InterpretResult<()> {
        let text = &self.gstates.top().text;
        let font = text.font.as_ref().ok_or(InterpretError::FontNotSet)?;
        let offset = match font.writing_mode() {
            WritingMode::Horizontal => (tadj * text.scale, 0.0),
            WritingMode::Vertical => (0.0, tadj),
        };
        self.tm = self.tm.pre_translate(offset.into());
        Ok(())
    }

    pub(super) fn show_string(&mut self, s: &[u8]) -> InterpretResult<()> {
        let text = &self.gstates.top().text;
        let font = text.font.clone().ok_or(InterpretError::FontNotSet)?;
        let word_spacing = text.word_spacing;

        let mut rest = s;
        while !rest.is_empty() {
            let (code, len) = font.decode(rest);
            let len = len.clamp(1, rest.len());
            rest = &rest[len..];
            match font.lookup_cid(code) {
                Some(cid) => self.show_char(&font, cid),
                None => warn!("cannot encode character with code point {:#x}", code),
            }
            if code == 32 && len == 1 {
                self.show_space(word_spacing)?;
            }
        }
        Ok(())
    }

    /// Add glyph of `cid` to current text run, then advance text matrix.
    fn show_char(&mut self, font: &Arc<dyn Font>, cid: u32) {
        let state = &self.gstates.top().text;
        let (size, scale, rise) = (state.size, state.scale, state.rise);
        let char_spacing = state.char_spacing;
        let render_mode = state.render_mode;
        let wmode = font.writing_mode();

        let mut tsm = GlyphToTextSpace::new(size * scale, 0.0, 0.0, size, 0.0, rise);
        let mut unicode = font.to_unicode(cid);
        if unicode.is_empty() || unicode.as_slice() == ['\0'] {
            unicode = smallvec!['?'];
        }
        let mut gid = font.cid_to_gid(cid);
        let vmetrics = (wmode == WritingMode::Vertical).then(|| font.v_metrics(cid));
        if let Some(v) = vmetrics {
            gid = font.vertical_gid(gid);
            tsm.m31 -= v.x * size * 0.001;
            tsm.m32 -= v.y * size * 0.001;
        }
        let trm = tsm.then(&self.tm);

        let same_run = self.text.as_ref().is_some_and(|run| {
            same_font(&run.font, font)
                && run.wmode == wmode
                && (run.trm.m11 - trm.m11).abs() <= f32::EPSILON
                && (run.trm.m12 - trm.m12).abs() <= f32::EPSILON
                && (run.trm.m21 - trm.m21).abs() <= f32::EPSILON
                && (run.trm.m22 - trm.m22).abs() <= f32::EPSILON
                && self.text_mode == render_mode
        });
        if !same_run {
            self.flush_text();
            self.text = Some(TextRun::new(Arc::clone(font), trm, wmode));
            self.text_mode = render_mode;
        }
        if let Some(run) = &mut self.text {
            run.push(gid, &unicode, trm.m31, trm.m32);
        }

        let advance = match vmetrics {
            None => {
                let w0 = font.h_metrics(cid) * 0.001;
                ((w0 * size + char_spacing) * scale, 0.0)
            }
            Some(v) => (0.0, v.w * 0.001 * size + char_spacing),
        };
        self.tm = self.tm.pre_translate(advance.into());
    }
}
