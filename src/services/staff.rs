//! Staff records, daily attendance and monthly salary slips.

use super::{delete_record, now, patch_record, require};
use crate::config::{CodesConfig, PayrollConfig};
use crate::error::{LedgerError, Result};
use crate::ledger::codes;
use crate::ledger::payroll::{self, AttendanceTally, SalaryInput};
use crate::model::{AttendanceStatus, MonthKey, PaymentStatus, Staff, StaffAttendance, StaffSalary};
use crate::store::{fetch_all, set_op, Direction, Query, RecordStore};
use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

pub fn add_staff<S, R>(
    store: &mut S,
    mut staff: Staff,
    rng: &mut R,
    cfg: &CodesConfig,
) -> Result<Staff>
where
    S: RecordStore + ?Sized,
    R: Rng + ?Sized,
{
    staff.validate()?;
    staff.id = codes::new_document_id();
    staff.staff_code = Some(codes::staff_code(rng, cfg));
    staff.created_at = Some(now());
    store.batch_write(vec![set_op(&staff)?])?;
    info!(staff_id = %staff.id, code = staff.staff_code.as_deref().unwrap_or(""), "staff added");
    Ok(staff)
}

pub fn list_staff<S: RecordStore + ?Sized>(store: &S) -> Result<Vec<Staff>> {
    fetch_all(store, &Query::new().order_by("createdAt", Direction::Desc))
}

pub fn get_staff<S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Staff> {
    require(store, id)
}

pub fn update_staff<S: RecordStore + ?Sized>(
    store: &mut S,
    id: &str,
    patch: &Value,
) -> Result<Staff> {
    patch_record(store, id, patch, Staff::validate)
}

pub fn delete_staff<S: RecordStore + ?Sized>(store: &mut S, id: &str) -> Result<()> {
    delete_record::<Staff, S>(store, id)
}

/// Writes a day's attendance in one batch. Records are keyed by staff and
/// date, so marking the same day again replaces the earlier status.
pub fn mark_attendance<S: RecordStore + ?Sized>(
    store: &mut S,
    entries: Vec<StaffAttendance>,
) -> Result<Vec<StaffAttendance>> {
    let created_at = now();
    let mut saved = Vec::with_capacity(entries.len());
    let mut ops = Vec::with_capacity(entries.len());
    for mut e in entries {
        if e.staff_id.trim().is_empty() {
            return Err(LedgerError::InvalidRecord("attendance staffId is required".into()));
        }
        e.id = codes::attendance_id(&e.staff_id, e.date);
        e.created_at = Some(created_at);
        ops.push(set_op(&e)?);
        saved.push(e);
    }
    store.batch_write(ops)?;
    info!(count = saved.len(), "attendance marked");
    Ok(saved)
}

pub fn attendance_for_date<S: RecordStore + ?Sized>(
    store: &S,
    date: NaiveDate,
) -> Result<Vec<StaffAttendance>> {
    fetch_all(store, &Query::new().eq("date", date.to_string()))
}

/// One staff member's attendance within a calendar month, by date.
pub fn monthly_attendance<S: RecordStore + ?Sized>(
    store: &S,
    staff_id: &str,
    month: MonthKey,
) -> Result<Vec<StaffAttendance>> {
    let (first, last) = month.date_range();
    fetch_all(
        store,
        &Query::new()
            .eq("staffId", staff_id)
            .gte("date", first)
            .lte("date", last)
            .order_by("date", Direction::Asc),
    )
}

pub fn present_today_count<S: RecordStore + ?Sized>(store: &S, today: NaiveDate) -> Result<usize> {
    let q = Query::new()
        .eq("date", today.to_string())
        .eq("status", AttendanceStatus::Present.as_str());
    Ok(store.query(crate::store::Collection::StaffAttendance, &q)?.len())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryPreview {
    pub attendance: AttendanceTally,
    pub slip: StaffSalary,
}

/// Computes a month's slip from the staff record and the attendance marked in
/// that month without storing anything. `total_working_days` defaults to the
/// calendar length of the month.
pub fn preview_salary<S: RecordStore + ?Sized>(
    store: &S,
    staff_id: &str,
    month: MonthKey,
    total_working_days: Option<u32>,
    cfg: &PayrollConfig,
) -> Result<SalaryPreview> {
    let staff = get_staff(store, staff_id)?;
    let records = monthly_attendance(store, staff_id, month)?;
    let tally = payroll::tally_attendance(&records);
    let total_working_days =
        total_working_days.unwrap_or_else(|| payroll::working_days_in_month(month));

    let input = SalaryInput {
        basic_salary: staff.basic_salary,
        salary_type: staff.salary_type,
        present_days: tally.present,
        half_days: tally.half_day,
        total_working_days,
    };
    let breakdown = payroll::calculate_net_salary(&input, cfg.hours_per_day)?;

    Ok(SalaryPreview {
        attendance: tally,
        slip: StaffSalary {
            id: codes::salary_slip_id(staff_id, month),
            staff_id: staff.id,
            staff_name: Some(staff.full_name),
            month: month.month,
            year: month.year,
            salary_type: staff.salary_type,
            total_working_days,
            present_days: tally.present,
            absent_days: breakdown.absent_days,
            half_days: tally.half_day,
            basic_salary: staff.basic_salary,
            deductions: breakdown.deductions,
            net_salary: breakdown.net_salary,
            payment_status: PaymentStatus::Unpaid,
            paid_at: None,
            created_at: None,
        },
    })
}

/// Computes and stores the month's slip. Regenerating an unpaid slip replaces
/// it; a slip already paid is left alone and reported as an invalid record.
pub fn generate_salary<S: RecordStore + ?Sized>(
    store: &mut S,
    staff_id: &str,
    month: MonthKey,
    total_working_days: Option<u32>,
    cfg: &PayrollConfig,
) -> Result<StaffSalary> {
    let mut slip = preview_salary(store, staff_id, month, total_working_days, cfg)?.slip;

    if let Some(existing) = crate::store::fetch::<StaffSalary, S>(store, &slip.id)? {
        if existing.payment_status == PaymentStatus::Paid {
            warn!(slip_id = %slip.id, "refusing to regenerate a paid salary slip");
            return Err(LedgerError::InvalidRecord(format!(
                "salary for {} is already paid",
                month.label()
            )));
        }
    }

    slip.created_at = Some(now());
    store.batch_write(vec![set_op(&slip)?])?;
    info!(
        slip_id = %slip.id,
        net_salary = slip.net_salary,
        deductions = slip.deductions,
        "salary generated"
    );
    Ok(slip)
}

pub fn mark_salary_paid<S: RecordStore + ?Sized>(
    store: &mut S,
    slip_id: &str,
) -> Result<StaffSalary> {
    let mut slip: StaffSalary = require(store, slip_id)?;
    slip.payment_status = PaymentStatus::Paid;
    slip.paid_at = Some(now());
    store.batch_write(vec![set_op(&slip)?])?;
    info!(slip_id = %slip_id, "salary marked paid");
    Ok(slip)
}

/// Newest first.
pub fn salary_history<S: RecordStore + ?Sized>(
    store: &S,
    staff_id: &str,
) -> Result<Vec<StaffSalary>> {
    fetch_all(
        store,
        &Query::new()
            .eq("staffId", staff_id)
            .order_by("createdAt", Direction::Desc),
    )
}

pub fn monthly_salaries<S: RecordStore + ?Sized>(
    store: &S,
    month: MonthKey,
) -> Result<Vec<StaffSalary>> {
    fetch_all(
        store,
        &Query::new().eq("month", month.month).eq("year", month.year),
    )
}
