use crate::model::{MonthKey, Payment, RecordStatus, Student};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub amount: f64,
}

/// Fee collection for the trailing `months` calendar months ending at
/// `window_end`, oldest first. Every month gets a bucket even when nothing was
/// paid; admission fees and payments for months outside the window are skipped.
pub fn monthly_collection(
    payments: &[Payment],
    window_end: MonthKey,
    months: u32,
) -> Vec<MonthlyBucket> {
    let mut keys = Vec::with_capacity(months as usize);
    let mut k = window_end;
    for _ in 0..months {
        keys.push(k);
        k = k.pred();
    }
    keys.reverse();

    let mut totals: HashMap<MonthKey, f64> = keys.iter().map(|k| (*k, 0.0)).collect();
    for p in payments {
        if let Some(slot) = p.month_key().and_then(|k| totals.get_mut(&k)) {
            *slot += p.amount;
        }
    }

    keys.into_iter()
        .map(|k| MonthlyBucket {
            year: k.year,
            month: k.month,
            label: k.label(),
            amount: totals.get(&k).copied().unwrap_or(0.0),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: usize,
    pub active_students: usize,
    pub total_collected: f64,
    pub payment_count: usize,
    pub current_month_collection: f64,
    pub current_month_payments: usize,
    pub total_exams: usize,
    pub recent_payments: Vec<Payment>,
}

/// Headline figures. `payments` is expected newest first; the first `recent`
/// of them are returned as the recent list.
pub fn dashboard_summary(
    students: &[Student],
    payments: &[Payment],
    exam_count: usize,
    current: MonthKey,
    recent: usize,
) -> DashboardSummary {
    let this_month: Vec<&Payment> = payments
        .iter()
        .filter(|p| p.month_key() == Some(current))
        .collect();

    DashboardSummary {
        total_students: students.len(),
        active_students: students.iter().filter(|s| s.is_active()).count(),
        total_collected: payments.iter().map(|p| p.amount).sum(),
        payment_count: payments.len(),
        current_month_collection: this_month.iter().map(|p| p.amount).sum(),
        current_month_payments: this_month.len(),
        total_exams: exam_count,
        recent_payments: payments.iter().take(recent).cloned().collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeCount {
    pub grade: String,
    pub count: usize,
}

/// Students per grade, grades in order of first appearance.
pub fn grade_distribution(students: &[Student]) -> Vec<GradeCount> {
    let mut out: Vec<GradeCount> = Vec::new();
    for s in students {
        match out.iter_mut().find(|g| g.grade == s.grade) {
            Some(g) => g.count += 1,
            None => out.push(GradeCount {
                grade: s.grade.clone(),
                count: 1,
            }),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSplit {
    pub active: usize,
    pub inactive: usize,
}

pub fn status_split(students: &[Student]) -> StatusSplit {
    students
        .iter()
        .fold(StatusSplit::default(), |mut acc, s| {
            match s.status {
                RecordStatus::Active => acc.active += 1,
                RecordStatus::Inactive => acc.inactive += 1,
            }
            acc
        })
}
