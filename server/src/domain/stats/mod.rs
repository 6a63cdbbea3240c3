//! Time-bucketed statistics engine
//!
//! Pure, synchronous computations over points already fetched from the
//! store. Every operation takes an explicit `now` where it needs one; real
//! "now" is injected only at the request boundary so all of this is
//! deterministic under test.

pub mod bucket;
pub mod daily;
pub mod evolution;
pub mod hourly;
pub mod monthly;
pub mod types;
pub mod weekly;
pub mod yearly;

/// Guarded division: 0 when the denominator is 0, never NaN or Infinity.
pub(crate) fn guard_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::guard_div;

    #[test]
    fn test_guard_div_zero_denominator() {
        assert_eq!(guard_div(10.0, 0.0), 0.0);
        assert_eq!(guard_div(0.0, 0.0), 0.0);
        assert_eq!(guard_div(10.0, 4.0), 2.5);
    }
}
