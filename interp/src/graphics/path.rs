use super::{
    trans::{expansion, DeviceRect, UserPoint, UserToDeviceSpace},
    LineJoinStyle, StrokeState,
};
use euclid::{point2, Box2D};
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(UserPoint),
    LineTo(UserPoint),
    CurveTo(UserPoint, UserPoint, UserPoint),
    Close,
}

/// Path in user space, built by path construction operators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
    start: Option<UserPoint>,
    current: Option<UserPoint>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn current_point(&self) -> Option<UserPoint> {
        self.current
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        let p = point2(x, y);
        // consecutive move to replaces the previous one
        if let Some(PathSegment::MoveTo(last)) = self.segments.last_mut() {
            *last = p;
        } else {
            self.segments.push(PathSegment::MoveTo(p));
        }
        self.start = Some(p);
        self.current = Some(p);
    }

    fn ensure_current(&mut self, op: &str, x: f32, y: f32) -> bool {
        if self.current.is_none() {
            warn!("{} with no current point", op);
            self.move_to(x, y);
            return false;
        }
        true
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        if self.ensure_current("lineto", x, y) {
            let p = point2(x, y);
            self.segments.push(PathSegment::LineTo(p));
            self.current = Some(p);
        }
    }

    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        if self.ensure_current("curveto", x3, y3) {
            let p = point2(x3, y3);
            self.segments
                .push(PathSegment::CurveTo(point2(x1, y1), point2(x2, y2), p));
            self.current = Some(p);
        }
    }

    /// `v` operator, current point is the first control point.
    pub fn curve_v(&mut self, x2: f32, y2: f32, x3: f32, y3: f32) {
        if let Some(c) = self.current {
            self.curve_to(c.x, c.y, x2, y2, x3, y3);
        } else {
            self.ensure_current("curvetov", x3, y3);
        }
    }

    /// `y` operator, end point is also the second control point.
    pub fn curve_y(&mut self, x1: f32, y1: f32, x3: f32, y3: f32) {
        self.curve_to(x1, y1, x3, y3, x3, y3);
    }

    pub fn close_path(&mut self) {
        if self.current.is_none() {
            warn!("closepath with no current point");
            return;
        }
        if !matches!(self.segments.last(), Some(PathSegment::Close)) {
            self.segments.push(PathSegment::Close);
        }
        self.current = self.start;
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.move_to(x, y);
        self.line_to(x + w, y);
        self.line_to(x + w, y + h);
        self.line_to(x, y + h);
        self.close_path();
    }

    /// Path only contains one line segment, optionally closed. Filling
    /// such path paints nothing.
    pub fn is_single_line(&self) -> bool {
        matches!(
            self.segments.as_slice(),
            [PathSegment::MoveTo(_), PathSegment::LineTo(_)]
                | [
                    PathSegment::MoveTo(_),
                    PathSegment::LineTo(_),
                    PathSegment::Close
                ]
        )
    }

    fn points(&self) -> impl Iterator<Item = UserPoint> + '_ {
        self.segments.iter().flat_map(|seg| {
            let (pts, n): ([UserPoint; 3], usize) = match *seg {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => ([p, p, p], 1),
                PathSegment::CurveTo(p1, p2, p3) => ([p1, p2, p3], 3),
                PathSegment::Close => ([UserPoint::zero(); 3], 0),
            };
            pts.into_iter().take(n)
        })
    }

    /// Device space bounds of path, expanded by half line width if stroking.
    pub fn bounds(&self, ctm: &UserToDeviceSpace, stroke: Option<&StrokeState>) -> DeviceRect {
        let mut points = self.points().map(|p| ctm.transform_point(p));
        let Some(first) = points.next() else {
            return DeviceRect::zero();
        };
        let mut r = Box2D::new(first, first);
        for p in points {
            r.min = r.min.min(p);
            r.max = r.max.max(p);
        }

        if let Some(stroke) = stroke {
            let mut expand = stroke.line_width.max(0.0) * 0.5 * expansion(ctm);
            if stroke.join == LineJoinStyle::Miter && stroke.miter_limit > 1.0 {
                expand *= stroke.miter_limit;
            }
            r = r.inflate(expand, expand);
        }
        r
    }
}
