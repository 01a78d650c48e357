//! Tiling pattern painting.
use super::Interpreter;
use crate::{
    graphics::{
        pattern::Pattern,
        trans::{transform_rect, DeviceRect, PatternSpace, PatternToDeviceSpace, UserSpace},
    },
    material::Target,
};
use euclid::Transform2D;
use log::{error, warn};

/// Tile loops larger than this are skipped.
const MAX_TILES: i64 = 1 << 20;

impl Interpreter<'_> {
    /// Paint `pattern` over device `area`, clip is already set by the caller.
    #[allow(clippy::cast_possible_truncation)]
    pub(super) fn show_pattern(&mut self, pattern: &Pattern, area: &DeviceRect, target: Target) {
        if self.nesting >= self.option.max_xobject_depth {
            error!("aborting potentially infinite recursion");
            return;
        }

        self.gstates.save();
        let depth = self.gstates.depth();
        let gs = self.gstates.top_mut();
        if pattern.is_mask {
            gs.fill.unset_pattern();
            gs.stroke.unset_pattern();
            match target {
                Target::Fill => gs.stroke = gs.fill.clone(),
                Target::Stroke => gs.fill = gs.stroke.clone(),
            }
        } else {
            gs.material_mut(target).unset_pattern();
        }
        gs.soft_mask = None;

        let ptm: PatternToDeviceSpace = pattern.matrix.then(&self.top_ctm);
        let Some(inv) = ptm.inverse() else {
            warn!("cannot render pattern with singular matrix");
            self.gstates.restore(self.device);
            return;
        };
        let area = transform_rect(&inv, area);
        let (xs, ys) = (pattern.x_step, pattern.y_step);
        if xs == 0.0 || ys == 0.0 {
            warn!("cannot render pattern with zero step");
            self.gstates.restore(self.device);
            return;
        }
        let eps = self.option.tile_epsilon;
        let x0 = (area.min.x / xs + eps).floor() as i32;
        let y0 = (area.min.y / ys + eps).floor() as i32;
        let x1 = (area.max.x / xs - eps).ceil() as i32;
        let y1 = (area.max.y / ys - eps).ceil() as i32;
        let tiles = (i64::from(x1) - i64::from(x0)) * (i64::from(y1) - i64::from(y0));

        let old_top_ctm = self.top_ctm;
        self.nesting += 1;
        if self.option.device_tiling && tiles > 1 {
            self.device.begin_tile(&area, &pattern.bbox, xs, ys, &ptm);
            let ctm = ptm.with_source::<UserSpace>();
            self.gstates.top_mut().ctm = ctm;
            self.top_ctm = ctm;
            self.run_tile(pattern, depth);
            self.device.end_tile();
        } else if tiles > MAX_TILES {
            warn!("cannot render pattern over {} tiles", tiles);
        } else {
            for y in y0..y1 {
                for x in x0..x1 {
                    let offset = Transform2D::<f32, PatternSpace, PatternSpace>::translation(
                        x as f32 * xs,
                        y as f32 * ys,
                    );
                    let ctm = offset.then(&ptm).with_source::<UserSpace>();
                    self.gstates.top_mut().ctm = ctm;
                    self.top_ctm = ctm;
                    self.run_tile(pattern, depth);
                }
            }
        }
        self.nesting -= 1;
        self.top_ctm = old_top_ctm;
        self.gstates.restore(self.device);
    }

    /// Run pattern content once, discarding any state it leaves above `depth`.
    fn run_tile(&mut self, pattern: &Pattern, depth: usize) {
        self.gstates.save();
        self.run_buffer(&pattern.resources, pattern.contents.data());
        self.gstates.restore_to(depth, self.device);
    }
}
