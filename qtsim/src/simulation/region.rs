//! Integer rectangles for quadtree regions.
//!
//! A `Rect` covers `[low_x, high_x) x [low_y, high_y)`. Bisection uses integer
//! halving of the span, so on odd spans the split point leans toward the lower
//! bound and the four children always tile the parent exactly.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub low_x: i64,
    pub low_y: i64,
    pub high_x: i64,
    pub high_y: i64,
}

impl Rect {
    pub fn new(low_x: i64, low_y: i64, high_x: i64, high_y: i64) -> Self {
        Self { low_x, low_y, high_x, high_y }
    }

    /// Arena rectangle anchored at the origin
    pub fn arena(width: u32, height: u32) -> Self {
        Self::new(0, 0, i64::from(width), i64::from(height))
    }

    #[inline]
    pub fn width(&self) -> i64 {
        self.high_x - self.low_x
    }

    #[inline]
    pub fn height(&self) -> i64 {
        self.high_y - self.low_y
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// Half-open containment; NaN coordinates are never contained
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        y >= self.low_y as f64
            && y < self.high_y as f64
            && x >= self.low_x as f64
            && x < self.high_x as f64
    }

    /// Split point on both axes: `low + span / 2`
    #[inline]
    pub fn midpoint(&self) -> (i64, i64) {
        (
            self.low_x + self.width() / 2,
            self.low_y + self.height() / 2,
        )
    }

    /// The four quadrants in child-slot order (see [`Rect::quadrant`])
    pub fn quadrants(&self) -> [Rect; 4] {
        [0, 1, 2, 3].map(|q| self.quadrant(q))
    }

    /// Bounding box of quadrant `q` in `0..4`.
    ///
    /// - Bit 0 (value 1): X axis - 0 for the low half, 1 for the high half
    /// - Bit 1 (value 2): Y axis - 0 for the low half, 1 for the high half
    pub fn quadrant(&self, q: usize) -> Rect {
        let (mid_x, mid_y) = self.midpoint();
        let mut r = *self;

        // x: bit 0
        if (q & 1) == 0 {
            r.high_x = mid_x;
        } else {
            r.low_x = mid_x;
        }

        // y: bit 1
        if (q & 2) == 0 {
            r.high_y = mid_y;
        } else {
            r.low_y = mid_y;
        }

        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_open_bounds() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains_point(0.0, 0.0));
        assert!(r.contains_point(9.999, 9.999));
        assert!(!r.contains_point(10.0, 5.0));
        assert!(!r.contains_point(5.0, 10.0));
        assert!(!r.contains_point(-0.001, 5.0));
        assert!(!r.contains_point(f64::NAN, 5.0));
    }

    #[test]
    fn odd_span_splits_toward_low_bound() {
        let r = Rect::new(3, 0, 10, 5);
        assert_eq!(r.midpoint(), (6, 2));
        let q = r.quadrants();
        assert_eq!(q[0], Rect::new(3, 0, 6, 2));
        assert_eq!(q[3], Rect::new(6, 2, 10, 5));
    }

    #[test]
    fn quadrants_tile_parent() {
        let r = Rect::new(0, 0, 101, 57);
        let q = r.quadrants();
        let total: i64 = q.iter().map(Rect::area).sum();
        assert_eq!(total, r.area());

        // every integer cell lands in exactly one quadrant
        for x in 0..101 {
            for y in 0..57 {
                let hits = q
                    .iter()
                    .filter(|c| c.contains_point(x as f64, y as f64))
                    .count();
                assert_eq!(hits, 1, "cell ({x}, {y}) hit {hits} quadrants");
            }
        }
    }

    #[test]
    fn repeated_splits_do_not_drift() {
        let mut r = Rect::arena(1920, 1045);
        for _ in 0..10 {
            let q = r.quadrants();
            assert_eq!(q.iter().map(Rect::area).sum::<i64>(), r.area());
            r = q[3];
        }
        assert_eq!(r.high_x, 1920);
        assert_eq!(r.high_y, 1045);
    }
}
