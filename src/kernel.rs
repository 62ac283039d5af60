//! Escape-time iteration.

use crate::{arithmetic::Arithmetic, config::MAX_LOOPS};

/// Iterations of `z ← z² + c` for `c = a + bi` before `|z|² >= 4`, capped at
/// [`MAX_LOOPS`]. Points in the set return `MAX_LOOPS`.
pub fn escape_time<A: Arithmetic>(a: A::Elem, b: A::Elem) -> u8 {
    let escape = A::from_f64(4.0);
    let mut x = A::Elem::default();
    let mut y = A::Elem::default();
    let mut remaining = MAX_LOOPS;
    loop {
        let (xx, yy, xy) = A::products(x, y);
        x = A::add(A::sub(xx, yy), a);
        y = A::add(A::add(xy, xy), b);
        remaining -= 1;
        if remaining == 0 || A::add(xx, yy) >= escape {
            break;
        }
    }
    MAX_LOOPS - remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::{Fixed, Float, SplitFixed};

    fn at<A: Arithmetic>(a: f64, b: f64) -> u8 {
        escape_time::<A>(A::from_f64(a), A::from_f64(b))
    }

    #[test]
    fn origin_is_bounded() {
        assert_eq!(at::<Fixed>(0.0, 0.0), MAX_LOOPS);
        assert_eq!(at::<SplitFixed>(0.0, 0.0), MAX_LOOPS);
        assert_eq!(at::<Float>(0.0, 0.0), MAX_LOOPS);
    }

    #[test]
    fn far_points_escape_immediately() {
        for count in [at::<Fixed>(3.0, 0.0), at::<SplitFixed>(3.0, 0.0), at::<Float>(3.0, 0.0)] {
            assert!((1..=2).contains(&count), "{}", count);
        }
        assert!(at::<SplitFixed>(0.0, -3.0) <= 2);
    }

    #[test]
    fn interior_points_are_bounded() {
        for (a, b) in [(-1.0, 0.0), (-0.1, 0.1), (0.25, 0.0), (-1.75, 0.0)] {
            assert_eq!(at::<SplitFixed>(a, b), MAX_LOOPS, "({}, {})", a, b);
            assert_eq!(at::<Float>(a, b), MAX_LOOPS, "({}, {})", a, b);
        }
    }

    #[test]
    fn exterior_points_escape() {
        for (a, b) in [(0.5, 0.0), (-2.0, 1.0), (0.3, 0.6)] {
            assert!(at::<SplitFixed>(a, b) < MAX_LOOPS, "({}, {})", a, b);
            assert!(at::<Fixed>(a, b) < MAX_LOOPS, "({}, {})", a, b);
        }
    }

    #[test]
    fn fixed_point_variants_agree_on_the_real_axis() {
        // Non-negative real parts never produce a negative cross product.
        for step in 0..64 {
            let a = step as f64 / 32.0 - 2.0;
            assert_eq!(at::<Fixed>(a, 0.0), at::<SplitFixed>(a, 0.0), "a = {}", a);
        }
    }
}
