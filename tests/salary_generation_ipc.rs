mod test_support;

use serde_json::{json, Value};
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

fn april_attendance(staff_id: &str) -> Value {
    let entries: Vec<Value> = (1..=30)
        .map(|day| {
            let status = match day {
                1..=25 => "Present",
                26 | 27 => "Half Day",
                _ => "Absent",
            };
            json!({
                "staffId": staff_id,
                "staffName": "Ravi Kumar",
                "date": format!("2026-04-{:02}", day),
                "status": status
            })
        })
        .collect();
    json!({ "entries": entries })
}

#[test]
fn monthly_salary_is_generated_from_marked_attendance() {
    let workspace = temp_dir("tuition-salary-ipc");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let staff = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "staff.create",
        json!({
            "fullName": "Ravi Kumar",
            "role": "Teacher",
            "joiningDate": "2025-06-01",
            "salaryType": "Monthly",
            "basicSalary": 3000,
            "status": "Active"
        }),
    );
    let staff_id = staff["id"].as_str().expect("staff id").to_string();
    assert!(staff["staffCode"]
        .as_str()
        .map(|c| c.starts_with("DT-S-"))
        .unwrap_or(false));

    let entries = april_attendance(&staff_id);
    let marked = request_ok(&mut stdin, &mut reader, "3", "attendance.mark", entries);
    assert_eq!(marked["saved"], json!(30));

    // Re-marking a day replaces it rather than adding a second record.
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "attendance.mark",
        json!({ "entries": [{ "staffId": staff_id, "date": "2026-04-30", "status": "Absent" }] }),
    );
    let month = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "attendance.monthly",
        json!({ "staffId": staff_id, "year": 2026, "month": 4 }),
    );
    assert_eq!(month["entries"].as_array().map(|a| a.len()), Some(30));
    assert_eq!(month["tally"]["present"], json!(25));
    assert_eq!(month["tally"]["halfDay"], json!(2));
    assert_eq!(month["tally"]["absent"], json!(3));
    assert_eq!(month["markedDays"], json!(30));

    let present = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "attendance.presentToday",
        json!({ "date": "2026-04-10" }),
    );
    assert_eq!(present["present"], json!(1));

    let preview = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "salary.preview",
        json!({ "staffId": staff_id, "year": 2026, "month": 4 }),
    );
    assert_eq!(preview["slip"]["netSalary"].as_f64(), Some(2600.0));
    let history = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "salary.history",
        json!({ "staffId": staff_id }),
    );
    assert_eq!(history["salaries"].as_array().map(|a| a.len()), Some(0));

    let slip = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "salary.generate",
        json!({ "staffId": staff_id, "year": 2026, "month": 4 }),
    );
    assert_eq!(slip["totalWorkingDays"], json!(30));
    assert_eq!(slip["presentDays"], json!(25));
    assert_eq!(slip["halfDays"], json!(2));
    assert_eq!(slip["absentDays"].as_f64(), Some(4.0));
    assert_eq!(slip["deductions"].as_f64(), Some(400.0));
    assert_eq!(slip["netSalary"].as_f64(), Some(2600.0));
    assert_eq!(slip["paymentStatus"], json!("Unpaid"));
    let slip_id = slip["id"].as_str().expect("slip id").to_string();

    // An unpaid slip can be regenerated with a different working-day count.
    let redo = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "salary.generate",
        json!({ "staffId": staff_id, "year": 2026, "month": 4, "totalWorkingDays": 28 }),
    );
    assert_eq!(redo["id"], json!(slip_id));
    assert_eq!(redo["deductions"].as_f64(), Some(214.0));
    assert_eq!(redo["netSalary"].as_f64(), Some(2786.0));

    let paid = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "salary.markPaid",
        json!({ "id": slip_id }),
    );
    assert_eq!(paid["paymentStatus"], json!("Paid"));
    assert!(paid["paidAt"].is_string());

    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "12",
            "salary.generate",
            json!({ "staffId": staff_id, "year": 2026, "month": 4 })
        ),
        "invalid_record"
    );

    let monthly = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "salary.monthly",
        json!({ "year": 2026, "month": 4 }),
    );
    assert_eq!(monthly["salaries"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(monthly["totalNetSalary"].as_f64(), Some(2786.0));

    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "14",
            "salary.generate",
            json!({ "staffId": staff_id, "year": 2026, "month": 5, "totalWorkingDays": 0 })
        ),
        "invalid_working_days"
    );
    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "15",
            "salary.preview",
            json!({ "staffId": "ghost", "year": 2026, "month": 4 })
        ),
        "not_found"
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn net_salary_preview_needs_no_workspace() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let hourly = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "calc.netSalary",
        json!({
            "basicSalary": 100,
            "salaryType": "Hourly",
            "presentDays": 20,
            "halfDays": 2,
            "totalWorkingDays": 26
        }),
    );
    assert_eq!(hourly["deductions"].as_f64(), Some(0.0));
    assert_eq!(hourly["netSalary"].as_f64(), Some(16800.0));

    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "2",
            "calc.netSalary",
            json!({
                "basicSalary": 3000,
                "salaryType": "Monthly",
                "presentDays": 31,
                "totalWorkingDays": 30
            })
        ),
        "invalid_working_days"
    );
    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "3",
            "calc.netSalary",
            json!({
                "basicSalary": -5,
                "salaryType": "Daily",
                "presentDays": 3,
                "totalWorkingDays": 30
            })
        ),
        "invalid_amount"
    );

    drop(stdin);
    let _ = child.wait();
}
