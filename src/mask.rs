//! Pixel-accurate collision masks.
//!
//! A mask is a `width x height` bitmap of solid pixels anchored at the
//! top-left corner of the rectangle it belongs to. Two masks overlap when
//! at least one pixel is solid in both after applying the offset between
//! their anchors.

/// How a sprite fills its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Every pixel of the bounding box is solid.
    Filled,
    /// The inscribed ellipse is solid; the corners are transparent.
    Ellipse,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

/// Pixel extent of a floating point length. Negative and NaN lengths are
/// treated as zero.
pub fn pixel_extent(len: f32) -> usize {
    if len.is_finite() && len > 0.0 {
        len.round() as usize
    } else {
        0
    }
}

impl Mask {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn filled(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width * height],
        }
    }

    pub fn ellipse(width: usize, height: usize) -> Self {
        let mut bits = vec![false; width * height];
        let rx = width as f32 / 2.0;
        let ry = height as f32 / 2.0;
        for y in 0..height {
            for x in 0..width {
                let nx = (x as f32 + 0.5 - rx) / rx;
                let ny = (y as f32 + 0.5 - ry) / ry;
                bits[y * width + x] = nx * nx + ny * ny <= 1.0;
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn for_shape(shape: Shape, width: f32, height: f32) -> Self {
        let (w, h) = (pixel_extent(width), pixel_extent(height));
        match shape {
            Shape::Filled => Self::filled(w, h),
            Shape::Ellipse => Self::ellipse(w, h),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True when no pixel is solid, including zero-area masks.
    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|b| *b)
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// Whether `other`, anchored at `(dx, dy)` relative to this mask's
    /// anchor, shares a solid pixel with this mask.
    pub fn overlaps(&self, other: &Mask, dx: i64, dy: i64) -> bool {
        if self.width == 0 || self.height == 0 || other.width == 0 || other.height == 0 {
            return false;
        }
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = (self.width as i64).min(dx + other.width as i64);
        let y1 = (self.height as i64).min(dy + other.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }
        for y in y0..y1 {
            let oy = (y - dy) as usize;
            for x in x0..x1 {
                let ox = (x - dx) as usize;
                if self.get(x as usize, y as usize) && other.get(ox, oy) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_masks_overlap_when_shifted_inside() {
        let a = Mask::filled(10, 10);
        let b = Mask::filled(4, 4);
        assert!(a.overlaps(&b, 3, 3));
        assert!(a.overlaps(&b, -3, -3));
        assert!(!a.overlaps(&b, 10, 0));
        assert!(!a.overlaps(&b, -4, 0));
    }

    #[test]
    fn ellipse_corners_are_transparent() {
        let circle = Mask::ellipse(10, 10);
        assert!(circle.get(5, 5));
        assert!(!circle.get(0, 0));
        assert!(!circle.get(9, 9));
        let dot = Mask::filled(1, 1);
        // The bounding boxes overlap at the corner but no solid pixel does.
        assert!(!circle.overlaps(&dot, 0, 0));
        assert!(circle.overlaps(&dot, 5, 5));
    }

    #[test]
    fn zero_area_never_overlaps() {
        let solid = Mask::filled(8, 8);
        let flat = Mask::for_shape(Shape::Filled, 0.0, 8.0);
        assert!(flat.is_empty());
        assert!(!solid.overlaps(&flat, 0, 0));
        assert!(!flat.overlaps(&solid, 0, 0));
        assert!(Mask::for_shape(Shape::Ellipse, f32::NAN, -3.0).is_empty());
    }
}
