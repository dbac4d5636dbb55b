use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in logical world units. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.w / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    /// A rectangle with no area (or NaN extents) never overlaps anything.
    pub fn is_degenerate(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0) || !self.x.is_finite() || !self.y.is_finite()
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            w: self.w + margin * 2.0,
            h: self.h + margin * 2.0,
        }
    }

    /// Shrink horizontally by `inset` on both sides, keeping the vertical extent.
    pub fn inset_x(&self, inset: f32) -> Rect {
        Rect {
            x: self.x + inset,
            y: self.y,
            w: self.w - inset * 2.0,
            h: self.h,
        }
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            w: self.w,
            h: self.h,
        }
    }

    /// Whether the horizontal extents overlap (vertical position ignored).
    pub fn overlaps_x(&self, x0: f32, x1: f32) -> bool {
        self.x < x1 && self.right() > x0
    }
}

/// Overlap test with strict inequalities: touching edges do not intersect.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// True if `a` and `b` are closer than `buffer` on both axes.
pub fn within_clearance(a: &Rect, b: &Rect, buffer: f32) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }
    intersects(&a.inflate(buffer), b)
}

/// Subtract `[cut_x0, cut_x1)` from a set of horizontal spans.
pub fn subtract_span(spans: &mut Vec<(f32, f32)>, cut_x0: f32, cut_x1: f32) {
    if cut_x1 <= cut_x0 {
        return;
    }
    let mut out = Vec::with_capacity(spans.len() + 1);
    for &(x0, x1) in spans.iter() {
        if cut_x1 <= x0 || cut_x0 >= x1 {
            out.push((x0, x1));
            continue;
        }
        if cut_x0 > x0 {
            out.push((x0, cut_x0));
        }
        if cut_x1 < x1 {
            out.push((cut_x1, x1));
        }
    }
    *spans = out;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(intersects(&a, &b));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!intersects(&a, &right));
        assert!(!intersects(&a, &below));
    }

    #[test]
    fn degenerate_rects_never_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!intersects(&a, &Rect::new(2.0, 2.0, 0.0, 5.0)));
        assert!(!intersects(&a, &Rect::new(2.0, 2.0, -4.0, 5.0)));
        assert!(!intersects(&a, &Rect::new(f32::NAN, 2.0, 4.0, 5.0)));
        assert!(!intersects(&Rect::default(), &Rect::default()));
    }

    #[test]
    fn clearance_detects_near_miss() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(30.0, 0.0, 10.0, 10.0);
        assert!(within_clearance(&a, &b, 42.0));
        assert!(!within_clearance(&a, &b, 20.0));
    }

    #[test]
    fn subtract_span_splits_and_trims() {
        let mut spans = vec![(0.0, 100.0)];
        subtract_span(&mut spans, 20.0, 40.0);
        assert_eq!(spans, vec![(0.0, 20.0), (40.0, 100.0)]);
        subtract_span(&mut spans, 90.0, 120.0);
        assert_eq!(spans, vec![(0.0, 20.0), (40.0, 90.0)]);
        subtract_span(&mut spans, -5.0, 30.0);
        assert_eq!(spans, vec![(40.0, 90.0)]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn rect_strategy() -> impl Strategy<Value = Rect> {
            (-500.0f32..500.0, -500.0f32..500.0, -50.0f32..200.0, -50.0f32..200.0)
                .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
        }

        proptest! {
            #[test]
            fn intersection_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
                prop_assert_eq!(intersects(&a, &b), intersects(&b, &a));
            }

            #[test]
            fn rect_strictly_outside_never_intersects(
                a in rect_strategy(),
                gap in 0.5f32..100.0,
                w in 1.0f32..100.0,
                h in 1.0f32..100.0,
            ) {
                let right = Rect::new(a.right() + gap, a.y, w, h);
                let below = Rect::new(a.x, a.bottom() + gap, w, h);
                let left = Rect::new(a.x - gap - w, a.y, w, h);
                let above = Rect::new(a.x, a.y - gap - h, w, h);
                prop_assert!(!intersects(&a, &right));
                prop_assert!(!intersects(&a, &below));
                prop_assert!(!intersects(&a, &left));
                prop_assert!(!intersects(&a, &above));
            }
        }
    }
}
