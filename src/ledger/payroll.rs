use super::round_half_up;
use crate::error::{LedgerError, Result};
use crate::model::{AttendanceStatus, MonthKey, SalaryType, StaffAttendance};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_HOURS_PER_DAY: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryInput {
    pub basic_salary: f64,
    pub salary_type: SalaryType,
    pub present_days: u32,
    #[serde(default)]
    pub half_days: u32,
    pub total_working_days: u32,
}

impl SalaryInput {
    /// Present days plus half days at half weight.
    pub fn effective_days(&self) -> f64 {
        f64::from(self.present_days) + f64::from(self.half_days) * 0.5
    }

    fn absent_days(&self) -> f64 {
        f64::from(self.total_working_days) - self.effective_days()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryBreakdown {
    pub absent_days: f64,
    pub deductions: f64,
    pub net_salary: f64,
}

/// Net pay for one month.
///
/// Monthly staff lose a per-day share of `basic_salary` for every day not
/// worked. Daily staff are paid `basic_salary` per effective day, hourly staff
/// `basic_salary` per hour at a flat `hours_per_day`; neither has deductions.
pub fn calculate_net_salary(input: &SalaryInput, hours_per_day: f64) -> Result<SalaryBreakdown> {
    if !input.basic_salary.is_finite() || input.basic_salary < 0.0 {
        return Err(LedgerError::InvalidAmount(format!(
            "basicSalary must be >= 0 (got {})",
            input.basic_salary
        )));
    }

    match input.salary_type {
        SalaryType::Monthly => {
            if input.total_working_days == 0 {
                return Err(LedgerError::InvalidWorkingDays(
                    "totalWorkingDays must be greater than zero for monthly salary".to_string(),
                ));
            }
            let marked = u64::from(input.present_days) + u64::from(input.half_days);
            if marked > u64::from(input.total_working_days) {
                return Err(LedgerError::InvalidWorkingDays(format!(
                    "presentDays ({}) + halfDays ({}) exceed totalWorkingDays ({})",
                    input.present_days, input.half_days, input.total_working_days
                )));
            }
            let per_day = input.basic_salary / f64::from(input.total_working_days);
            let absent_days = input.absent_days();
            let deductions = round_half_up(per_day * absent_days);
            Ok(SalaryBreakdown {
                absent_days,
                deductions,
                net_salary: (input.basic_salary - deductions).max(0.0),
            })
        }
        SalaryType::Daily => Ok(SalaryBreakdown {
            absent_days: input.absent_days().max(0.0),
            deductions: 0.0,
            net_salary: round_half_up(input.basic_salary * input.effective_days()),
        }),
        SalaryType::Hourly => Ok(SalaryBreakdown {
            absent_days: input.absent_days().max(0.0),
            deductions: 0.0,
            net_salary: round_half_up(input.basic_salary * hours_per_day * input.effective_days()),
        }),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceTally {
    pub present: u32,
    pub half_day: u32,
    pub absent: u32,
    pub leave: u32,
}

impl AttendanceTally {
    pub fn marked_days(&self) -> u32 {
        self.present + self.half_day + self.absent + self.leave
    }
}

/// Counts one status per date; a later record for the same date replaces an
/// earlier one. Leave is unpaid and counts toward neither present nor half days.
pub fn tally_attendance<'a, I>(records: I) -> AttendanceTally
where
    I: IntoIterator<Item = &'a StaffAttendance>,
{
    let mut by_date: BTreeMap<NaiveDate, AttendanceStatus> = BTreeMap::new();
    for r in records {
        by_date.insert(r.date, r.status);
    }

    let mut tally = AttendanceTally::default();
    for status in by_date.values() {
        match status {
            AttendanceStatus::Present => tally.present += 1,
            AttendanceStatus::HalfDay => tally.half_day += 1,
            AttendanceStatus::Absent => tally.absent += 1,
            AttendanceStatus::Leave => tally.leave += 1,
        }
    }
    tally
}

/// Calendar days in the month; the default working-day count for a slip.
pub fn working_days_in_month(month: MonthKey) -> u32 {
    month.days()
}
