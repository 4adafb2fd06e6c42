//! Human-facing identifiers: student and staff codes, receipt numbers and
//! the deterministic keys that make marks and attendance writes idempotent.

use crate::config::CodesConfig;
use crate::model::MonthKey;
use chrono::NaiveDate;
use rand::Rng;

/// Next sequential student code after the largest `<prefix><n>` among `codes`.
///
/// Codes of any other shape, including staff codes that share the prefix, are
/// ignored. With no match the sequence starts at `cfg.student_start`.
pub fn next_student_code<'a, I>(codes: I, cfg: &CodesConfig) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = codes
        .into_iter()
        .filter_map(|c| c.trim().strip_prefix(cfg.student_prefix.as_str()))
        .filter(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|n| n.parse::<u64>().ok())
        .max();
    let next = match max {
        Some(n) => n.saturating_add(1),
        None => cfg.student_start,
    };
    format!("{}{}", cfg.student_prefix, next)
}

fn four_digits<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(1000..=9999)
}

/// Random staff code, e.g. `DT-S-4821`. Not checked for collisions.
pub fn staff_code<R: Rng + ?Sized>(rng: &mut R, cfg: &CodesConfig) -> String {
    format!("{}{}", cfg.staff_prefix, four_digits(rng))
}

/// Receipt number `TMS-YYYYMMDD-NNNN` for a payment recorded on `date`.
pub fn receipt_number<R: Rng + ?Sized>(rng: &mut R, date: NaiveDate, cfg: &CodesConfig) -> String {
    format!(
        "{}-{}-{}",
        cfg.receipt_prefix,
        date.format("%Y%m%d"),
        four_digits(rng)
    )
}

pub fn marks_entry_id(exam_id: &str, student_id: &str, subject: &str) -> String {
    format!("{}_{}_{}", exam_id, student_id, subject)
}

pub fn attendance_id(staff_id: &str, date: NaiveDate) -> String {
    format!("{}_{}", staff_id, date.format("%Y-%m-%d"))
}

/// One slip per staff member and month.
pub fn salary_slip_id(staff_id: &str, period: MonthKey) -> String {
    format!("{}_{:04}-{:02}", staff_id, period.year, period.month)
}

pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn first_student_code_uses_sequence_start() {
        let cfg = CodesConfig::default();
        assert_eq!(next_student_code(std::iter::empty(), &cfg), "DT-1001");
    }

    #[test]
    fn student_code_follows_highest_stored_code() {
        let cfg = CodesConfig::default();
        let stored = ["DT-1001", "DT-1042", "DT-1007", "DT-S-9999", "legacy", "DT-", "DT-12a"];
        assert_eq!(next_student_code(stored.iter().copied(), &cfg), "DT-1043");
    }

    #[test]
    fn only_foreign_codes_fall_back_to_start() {
        let cfg = CodesConfig::default();
        let stored = ["DT-S-1234", "STU001"];
        assert_eq!(next_student_code(stored.iter().copied(), &cfg), "DT-1001");
    }

    #[test]
    fn random_codes_have_four_digits() {
        let cfg = CodesConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).expect("date");
        for _ in 0..200 {
            let code = staff_code(&mut rng, &cfg);
            let n: u32 = code
                .strip_prefix("DT-S-")
                .and_then(|s| s.parse().ok())
                .expect("numeric suffix");
            assert!((1000..=9999).contains(&n));

            let receipt = receipt_number(&mut rng, date, &cfg);
            assert!(receipt.starts_with("TMS-20260309-"));
            assert_eq!(receipt.len(), "TMS-20260309-0000".len());
        }
    }

    #[test]
    fn same_seed_gives_same_codes() {
        let cfg = CodesConfig::default();
        let a = staff_code(&mut StdRng::seed_from_u64(42), &cfg);
        let b = staff_code(&mut StdRng::seed_from_u64(42), &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn deterministic_keys() {
        assert_eq!(marks_entry_id("e1", "s9", "Math"), "e1_s9_Math");
        let d = NaiveDate::from_ymd_opt(2026, 1, 5).expect("date");
        assert_eq!(attendance_id("st3", d), "st3_2026-01-05");
        assert_eq!(salary_slip_id("st3", MonthKey { year: 2026, month: 4 }), "st3_2026-04");
    }
}
