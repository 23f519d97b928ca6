//! Float keys and tie-breaks.
//!
//! Viewport edges become cache keys and pick distances decide which marker
//! wins, so both need an ordering that never depends on signed zero or NaN
//! payloads.

use core::cmp::Ordering;

/// Collapse `-0.0` into `0.0` and every NaN into one canonical NaN.
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Total order over canonicalized floats.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, stable_total_cmp_f64};
    use core::cmp::Ordering;

    #[test]
    fn signed_zero_shares_one_key() {
        assert_eq!(canonical_f64(-0.0).to_bits(), canonical_f64(0.0).to_bits());
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
    }

    #[test]
    fn nan_payloads_compare_equal() {
        let odd_nan = f64::from_bits(f64::NAN.to_bits() ^ 1);
        assert!(odd_nan.is_nan());
        assert_eq!(canonical_f64(odd_nan).to_bits(), f64::NAN.to_bits());
        assert_eq!(stable_total_cmp_f64(odd_nan, f64::NAN), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(1.0, 2.0), Ordering::Less);
    }
}
