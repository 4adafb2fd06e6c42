use super::round_half_up;
use crate::error::{LedgerError, Result};
use crate::model::{Exam, MarksEntry, Student};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub const DEFAULT_PASSING_PERCENTAGE: i64 = 35;

/// Whole-number percentage; a zero maximum yields 0 rather than an error.
pub fn percentage(obtained: f64, max: f64) -> i64 {
    if max == 0.0 {
        return 0;
    }
    round_half_up(obtained / max * 100.0) as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn letter_grade(percentage: i64) -> LetterGrade {
    match percentage {
        p if p >= 90 => LetterGrade::APlus,
        p if p >= 80 => LetterGrade::A,
        p if p >= 70 => LetterGrade::BPlus,
        p if p >= 60 => LetterGrade::B,
        p if p >= 50 => LetterGrade::C,
        p if p >= 35 => LetterGrade::D,
        _ => LetterGrade::F,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PassStatus {
    Pass,
    Fail,
}

impl fmt::Display for PassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PassStatus::Pass => "Pass",
            PassStatus::Fail => "Fail",
        })
    }
}

pub fn pass_status(percentage: i64, passing_percentage: i64) -> PassStatus {
    if percentage >= passing_percentage {
        PassStatus::Pass
    } else {
        PassStatus::Fail
    }
}

pub fn validate_marks(obtained: f64, max: f64) -> Result<()> {
    if !max.is_finite() || max <= 0.0 {
        return Err(LedgerError::InvalidMaxMarks(max));
    }
    if !obtained.is_finite() || obtained < 0.0 {
        return Err(LedgerError::InvalidMarks(format!(
            "marks obtained must be a non-negative number (got {})",
            obtained
        )));
    }
    if obtained > max {
        return Err(LedgerError::MarksExceedMaximum { obtained, max });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub total: f64,
    pub max: f64,
    pub percentage: i64,
    pub grade: LetterGrade,
    pub status: PassStatus,
    pub subjects_entered: usize,
}

/// Totals over the exam's subjects that have an entry. Subjects without an
/// entry are left out of both the obtained and the maximum sums.
pub fn exam_result<'a, I>(exam: &Exam, entries: I, passing_percentage: i64) -> ExamResult
where
    I: IntoIterator<Item = &'a MarksEntry>,
{
    let mut by_subject: HashMap<&str, &MarksEntry> = HashMap::new();
    for e in entries {
        if e.exam_id == exam.id {
            by_subject.insert(e.subject.as_str(), e);
        }
    }

    let mut total = 0.0;
    let mut max = 0.0;
    let mut subjects_entered = 0;
    for subject in &exam.subjects {
        if let Some(e) = by_subject.get(subject.as_str()) {
            total += e.marks_obtained;
            max += e.max_marks;
            subjects_entered += 1;
        }
    }

    let pct = percentage(total, max);
    ExamResult {
        total,
        max,
        percentage: pct,
        grade: letter_grade(pct),
        status: pass_status(pct, passing_percentage),
        subjects_entered,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRow {
    pub student_id: String,
    pub student_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_code: Option<String>,
    #[serde(flatten)]
    pub result: ExamResult,
}

/// One row per active student in the exam's grade, in the given order.
pub fn result_sheet(
    exam: &Exam,
    students: &[Student],
    entries: &[MarksEntry],
    passing_percentage: i64,
) -> Vec<ResultRow> {
    let mut by_student: HashMap<&str, Vec<&MarksEntry>> = HashMap::new();
    for e in entries {
        by_student.entry(e.student_id.as_str()).or_default().push(e);
    }

    students
        .iter()
        .filter(|s| s.is_active() && s.grade == exam.grade)
        .map(|s| {
            let mine = by_student.get(s.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            ResultRow {
                student_id: s.id.clone(),
                student_name: s.full_name.clone(),
                student_code: s.student_code.clone(),
                result: exam_result(exam, mine.iter().copied(), passing_percentage),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverage {
    pub subject: String,
    pub average: i64,
    pub entries: usize,
}

/// Mean of per-entry percentages for each subject, in order of first
/// appearance, capped at `limit` subjects.
pub fn subject_averages(entries: &[MarksEntry], limit: usize) -> Vec<SubjectAverage> {
    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for e in entries {
        let slot = sums.entry(e.subject.as_str()).or_insert_with(|| {
            order.push(e.subject.as_str());
            (0.0, 0)
        });
        if e.max_marks > 0.0 {
            slot.0 += e.marks_obtained / e.max_marks * 100.0;
        }
        slot.1 += 1;
    }

    order
        .into_iter()
        .take(limit)
        .map(|subject| {
            let (total, count) = sums.get(subject).copied().unwrap_or((0.0, 0));
            let average = if count > 0 {
                round_half_up(total / count as f64) as i64
            } else {
                0
            };
            SubjectAverage {
                subject: subject.to_string(),
                average,
                entries: count,
            }
        })
        .collect()
}
