use super::now;
use crate::config::CodesConfig;
use crate::error::Result;
use crate::ledger::codes;
use crate::model::Payment;
use crate::store::{fetch_all, set_op, Direction, Query, RecordStore};
use rand::Rng;
use tracing::info;

/// Records a fee payment and issues its receipt number from today's UTC date.
pub fn add_payment<S, R>(
    store: &mut S,
    mut payment: Payment,
    rng: &mut R,
    cfg: &CodesConfig,
) -> Result<Payment>
where
    S: RecordStore + ?Sized,
    R: Rng + ?Sized,
{
    payment.validate()?;
    let recorded_at = now();
    payment.id = codes::new_document_id();
    payment.receipt_number = Some(codes::receipt_number(rng, recorded_at.date_naive(), cfg));
    payment.created_at = Some(recorded_at);
    store.batch_write(vec![set_op(&payment)?])?;
    info!(
        payment_id = %payment.id,
        receipt = payment.receipt_number.as_deref().unwrap_or(""),
        amount = payment.amount,
        "payment recorded"
    );
    Ok(payment)
}

pub fn recent_payments<S: RecordStore + ?Sized>(store: &S, limit: usize) -> Result<Vec<Payment>> {
    fetch_all(
        store,
        &Query::new()
            .order_by("createdAt", Direction::Desc)
            .limit(limit),
    )
}

pub fn payments_by_student<S: RecordStore + ?Sized>(
    store: &S,
    student_id: &str,
) -> Result<Vec<Payment>> {
    fetch_all(
        store,
        &Query::new()
            .eq("studentId", student_id)
            .order_by("createdAt", Direction::Desc),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::model::FeeMonth;
    use crate::store::{MemoryStore, SqliteStore};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn payment(student_id: &str, amount: f64) -> Payment {
        Payment {
            id: String::new(),
            student_id: student_id.into(),
            student_code: Some("DT-1001".into()),
            student_name: "Asha".into(),
            grade: "8".into(),
            amount,
            fee_month: FeeMonth::Calendar(4),
            fee_year: 2026,
            payment_date: NaiveDate::from_ymd_opt(2026, 4, 2).expect("date"),
            receipt_number: None,
            remarks: None,
            created_at: None,
        }
    }

    #[test]
    fn receipt_uses_recording_date() {
        let mut store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(11);
        let p = add_payment(&mut store, payment("s1", 1500.0), &mut rng, &CodesConfig::default())
            .expect("add");
        let receipt = p.receipt_number.expect("receipt");
        let created = p.created_at.expect("created");
        let prefix = format!("TMS-{}-", created.format("%Y%m%d"));
        assert!(receipt.starts_with(&prefix), "{receipt}");
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut store = MemoryStore::new();
        let mut rng = StdRng::seed_from_u64(11);
        let err = add_payment(&mut store, payment("s1", -5.0), &mut rng, &CodesConfig::default())
            .expect_err("must fail");
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn recent_and_per_student_lists_are_newest_first() {
        let cfg = CodesConfig::default();
        let mut store = SqliteStore::open_in_memory().expect("open");
        let mut rng = StdRng::seed_from_u64(2);
        let a = add_payment(&mut store, payment("s1", 100.0), &mut rng, &cfg).expect("add");
        let b = add_payment(&mut store, payment("s2", 200.0), &mut rng, &cfg).expect("add");
        let c = add_payment(&mut store, payment("s1", 300.0), &mut rng, &cfg).expect("add");

        let recent: Vec<String> = recent_payments(&store, 2)
            .expect("recent")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(recent, vec![c.id.clone(), b.id]);

        let mine: Vec<String> = payments_by_student(&store, "s1")
            .expect("by student")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(mine, vec![c.id, a.id]);
    }
}
