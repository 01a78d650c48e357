use educe::Educe;
use strum::{Display, EnumString};

/// Usage intent of optional content, selects which Usage entries and
/// annotation flags apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
pub enum Usage {
    #[default]
    View,
    Print,
    Export,
}

/// Option for Interpreter
#[derive(Debug, Clone, Educe)]
#[educe(Default)]
pub struct InterpretOption {
    pub usage: Usage,
    /// Nesting ceiling of form XObjects, exceeding it aborts the nested stream.
    #[educe(Default = 96)]
    pub max_xobject_depth: usize,
    /// Tolerance used when computing covering tile range of a pattern.
    #[educe(Default = 0.001)]
    pub tile_epsilon: f32,
    /// Let the device replicate pattern tiles, pattern content runs once.
    pub device_tiling: bool,
    /// Graphics state nesting that is considered normal, deeper nesting warns.
    #[educe(Default = 32)]
    pub initial_gstate_capacity: usize,
}

#[derive(Educe)]
#[educe(Default(new))]
pub struct InterpretOptionBuilder(InterpretOption);

impl InterpretOptionBuilder {
    pub fn usage(mut self, usage: Usage) -> Self {
        self.0.usage = usage;
        self
    }

    pub fn max_xobject_depth(mut self, depth: usize) -> Self {
        self.0.max_xobject_depth = depth;
        self
    }

    pub fn tile_epsilon(mut self, epsilon: f32) -> Self {
        self.0.tile_epsilon = epsilon;
        self
    }

    pub fn device_tiling(mut self, enabled: bool) -> Self {
        self.0.device_tiling = enabled;
        self
    }

    pub fn initial_gstate_capacity(mut self, capacity: usize) -> Self {
        self.0.initial_gstate_capacity = capacity;
        self
    }

    pub fn build(self) -> InterpretOption {
        self.0
    }
}
