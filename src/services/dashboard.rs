use super::fees::recent_payments;
use super::marks::{list_exams, marks_by_exam};
use super::students::list_students;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::ledger::aggregate::{self, DashboardSummary, GradeCount, MonthlyBucket, StatusSplit};
use crate::ledger::scoring::{self, SubjectAverage};
use crate::model::{Exam, MonthKey};
use crate::store::{Query, RecordStore};
use chrono::NaiveDate;
use serde::Serialize;

/// Headline figures over every student, every exam and the newest
/// `dashboard_payments_window` payments.
pub fn dashboard_summary<S: RecordStore + ?Sized>(
    store: &S,
    today: NaiveDate,
    cfg: &DashboardConfig,
) -> Result<DashboardSummary> {
    let students = list_students(store)?;
    let payments = recent_payments(store, cfg.dashboard_payments_window)?;
    let exam_count = store.query(crate::store::Collection::Exams, &Query::new())?.len();
    Ok(aggregate::dashboard_summary(
        &students,
        &payments,
        exam_count,
        MonthKey::from_date(today),
        cfg.recent_payments_shown,
    ))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub grade_distribution: Vec<GradeCount>,
    pub monthly_collection: Vec<MonthlyBucket>,
    pub status: StatusSplit,
    pub subject_averages: Vec<SubjectAverage>,
    pub total_students: usize,
    pub total_exams: usize,
}

pub fn analytics_overview<S: RecordStore + ?Sized>(
    store: &S,
    today: NaiveDate,
    cfg: &DashboardConfig,
) -> Result<AnalyticsOverview> {
    let students = list_students(store)?;
    let payments = recent_payments(store, cfg.analytics_payments_window)?;
    let exams: Vec<Exam> = list_exams(store)?;

    let mut marks = Vec::new();
    for exam in &exams {
        marks.extend(marks_by_exam(store, &exam.id)?);
    }

    Ok(AnalyticsOverview {
        grade_distribution: aggregate::grade_distribution(&students),
        monthly_collection: aggregate::monthly_collection(
            &payments,
            MonthKey::from_date(today),
            cfg.trailing_months,
        ),
        status: aggregate::status_split(&students),
        subject_averages: scoring::subject_averages(&marks, cfg.subject_chart_limit),
        total_students: students.len(),
        total_exams: exams.len(),
    })
}
