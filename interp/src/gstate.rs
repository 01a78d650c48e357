//! Graphics state, and the stack of it saved by `q` and restored by `Q`.
use crate::{
    device::Device,
    graphics::{
        pattern::XObject, trans::UserToDeviceSpace, BlendMode, StrokeState, TextRenderingMode,
    },
    material::{Components, Material, Target},
    text::Font,
};
use log::warn;
use std::sync::Arc;

/// Soft mask set by ExtGState `SMask`.
#[derive(Debug, Clone)]
pub struct SoftMask {
    pub xobject: Arc<XObject>,
    /// CTM when the soft mask was set, mask content is drawn under it.
    pub ctm: UserToDeviceSpace,
    /// Backdrop color `BC`, sized to color space of the mask group.
    pub backdrop: Components,
    pub luminosity: bool,
}

#[derive(Debug, Clone)]
pub struct TextState {
    pub char_spacing: f32,
    pub word_spacing: f32,
    /// Horizontal scale, `Tz` operand divided by 100.
    pub scale: f32,
    pub leading: f32,
    pub font: Option<Arc<dyn Font>>,
    /// Negative until `Tf` sets it.
    pub size: f32,
    pub render_mode: TextRenderingMode,
    pub rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            scale: 1.0,
            leading: 0.0,
            font: None,
            size: -1.0,
            render_mode: TextRenderingMode::default(),
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GraphicsState {
    pub ctm: UserToDeviceSpace,
    /// Device clip depth of this state, clips above the parent state's
    /// depth are popped when this state is restored.
    pub clip_depth: usize,
    pub stroke_state: StrokeState,
    pub fill: Material,
    pub stroke: Material,
    pub text: TextState,
    pub blend_mode: BlendMode,
    pub soft_mask: Option<SoftMask>,
}

impl GraphicsState {
    pub fn new(ctm: UserToDeviceSpace) -> Self {
        Self {
            ctm,
            clip_depth: 0,
            stroke_state: StrokeState::default(),
            fill: Material::default(),
            stroke: Material::default(),
            text: TextState::default(),
            blend_mode: BlendMode::Normal,
            soft_mask: None,
        }
    }

    pub fn material(&self, target: Target) -> &Material {
        match target {
            Target::Fill => &self.fill,
            Target::Stroke => &self.stroke,
        }
    }

    pub fn material_mut(&mut self, target: Target) -> &mut Material {
        match target {
            Target::Fill => &mut self.fill,
            Target::Stroke => &mut self.stroke,
        }
    }
}

/// Never empty, the base state is kept until dropped.
#[derive(Debug)]
pub struct GraphicsStateStack {
    states: Vec<GraphicsState>,
    /// Nesting deeper than this warns once, then the threshold doubles.
    capacity: usize,
}

impl GraphicsStateStack {
    pub fn new(base: GraphicsState, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut states = Vec::with_capacity(capacity);
        states.push(base);
        Self { states, capacity }
    }

    pub fn top(&self) -> &GraphicsState {
        // stack is never empty
        &self.states[self.states.len() - 1]
    }

    pub fn top_mut(&mut self) -> &mut GraphicsState {
        let idx = self.states.len() - 1;
        &mut self.states[idx]
    }

    /// Count of saved states above the base state.
    pub fn depth(&self) -> usize {
        self.states.len() - 1
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn save(&mut self) {
        if self.states.len() == self.capacity {
            warn!("gstate overflow in content stream");
            self.capacity *= 2;
        }
        let top = self.top().clone();
        self.states.push(top);
    }

    /// Pop top state and clips pushed in it. Returns false if only the
    /// base state left, nothing is popped.
    pub fn restore(&mut self, device: &mut dyn Device) -> bool {
        if self.states.len() <= 1 {
            warn!("gstate underflow in content stream");
            return false;
        }

        let popped = self.states.pop();
        let clip_depth = popped.map_or(0, |s| s.clip_depth);
        for _ in self.top().clip_depth..clip_depth {
            device.pop_clip();
        }
        true
    }

    /// Restore until depth not greater than `depth`.
    pub fn restore_to(&mut self, depth: usize, device: &mut dyn Device) {
        while self.depth() > depth {
            self.restore(device);
        }
    }

    /// Restore all saved states, then pop clips of the base state.
    pub fn unwind(&mut self, device: &mut dyn Device) {
        self.restore_to(0, device);
        let base = self.top_mut();
        let clips = std::mem::take(&mut base.clip_depth);
        for _ in 0..clips {
            device.pop_clip();
        }
    }
}
