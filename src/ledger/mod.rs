//! Pure computations over already-fetched records: academic scoring,
//! payroll, identifier generation and dashboard aggregation.

pub mod aggregate;
pub mod codes;
pub mod payroll;
pub mod scoring;

/// Round half up to the nearest integer unit: `Int(x + 0.5)`.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halves_round_up() {
        assert_eq!(round_half_up(0.0), 0.0);
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.4999), 2.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(99.00000000000001), 99.0);
    }
}
