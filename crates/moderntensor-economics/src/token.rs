// crates/moderntensor-economics/src/token.rs
//
// Token unit and fixed-point helpers.
//
// The smallest unit is the "octa". 1 token = 10^8 octas. All internal
// accounting uses integer octas; rates and percentages are integers scaled by
// SCALE (10^8 == 100%) and are applied with floor division in u128 so the
// intermediate product cannot overflow.

use moderntensor_core::SCALE;

/// Number of octas in one token.
pub const OCTAS_PER_TOKEN: u64 = 100_000_000;

/// `floor(amount * rate / SCALE)`.
///
/// `rate` is a SCALE-based fixed-point fraction; values above SCALE are
/// allowed and scale the amount up.
pub fn apply_rate(amount: u64, rate: u64) -> u64 {
    let product = amount as u128 * rate as u128 / SCALE as u128;
    product.min(u64::MAX as u128) as u64
}

/// `floor(amount * numerator / denominator)`, zero when the denominator is zero.
pub fn mul_div(amount: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let product = amount as u128 * numerator as u128 / denominator as u128;
    product.min(u64::MAX as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_rate_half() {
        assert_eq!(apply_rate(1_000_001, SCALE / 2), 500_000);
        assert_eq!(apply_rate(0, SCALE / 2), 0);
        assert_eq!(apply_rate(12_345, SCALE), 12_345);
    }

    #[test]
    fn test_apply_rate_no_overflow() {
        assert_eq!(apply_rate(u64::MAX, SCALE), u64::MAX);
        assert_eq!(apply_rate(u64::MAX, SCALE / 2), u64::MAX / 2);
    }

    #[test]
    fn test_mul_div() {
        assert_eq!(mul_div(100, 1, 3), 33);
        assert_eq!(mul_div(100, 1, 0), 0);
    }
}
