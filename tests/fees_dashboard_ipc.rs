mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn payments_feed_dashboard_and_monthly_collection() {
    let workspace = temp_dir("tuition-fees-dashboard");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let student = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.create",
        json!({
            "fullName": "Arjun Mehta",
            "grade": "7",
            "joiningDate": "2026-01-05",
            "status": "Active"
        }),
    );
    let student_id = student["id"].as_str().expect("student id").to_string();

    for (i, (amount, month)) in [(500.0, "Admission"), (800.0, "March"), (1000.0, "May")]
        .iter()
        .enumerate()
    {
        let p = request_ok(
            &mut stdin,
            &mut reader,
            &format!("pay-{i}"),
            "fees.create",
            json!({
                "studentId": student_id,
                "studentName": "Arjun Mehta",
                "grade": "7",
                "amount": amount,
                "feeMonth": month,
                "feeYear": 2026,
                "paymentDate": "2026-05-02"
            }),
        );
        let receipt = p["receiptNumber"].as_str().expect("receipt");
        assert!(receipt.starts_with("TMS-"), "{receipt}");
        assert_eq!(receipt.len(), "TMS-20260502-0000".len());
    }

    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "3",
            "fees.create",
            json!({
                "studentId": student_id,
                "studentName": "Arjun Mehta",
                "amount": -10,
                "feeMonth": "June",
                "feeYear": 2026,
                "paymentDate": "2026-05-02"
            })
        ),
        "invalid_amount"
    );
    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "4",
            "fees.create",
            json!({
                "studentId": student_id,
                "studentName": "Arjun Mehta",
                "amount": 10,
                "feeMonth": "Smarch",
                "feeYear": 2026,
                "paymentDate": "2026-05-02"
            })
        ),
        "bad_params"
    );

    let by_student = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "fees.byStudent",
        json!({ "studentId": student_id }),
    );
    assert_eq!(by_student["payments"].as_array().map(|a| a.len()), Some(3));
    assert_eq!(by_student["totalPaid"].as_f64(), Some(2300.0));

    let recent = request_ok(&mut stdin, &mut reader, "6", "fees.recent", json!({ "limit": 2 }));
    assert_eq!(recent["payments"].as_array().map(|a| a.len()), Some(2));

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "dashboard.summary",
        json!({ "today": "2026-05-15" }),
    );
    assert_eq!(summary["totalStudents"], json!(1));
    assert_eq!(summary["activeStudents"], json!(1));
    assert_eq!(summary["paymentCount"], json!(3));
    assert_eq!(summary["totalCollected"].as_f64(), Some(2300.0));
    assert_eq!(summary["currentMonthCollection"].as_f64(), Some(1000.0));
    assert_eq!(summary["currentMonthPayments"], json!(1));
    assert_eq!(summary["totalExams"], json!(0));
    assert_eq!(summary["recentPayments"].as_array().map(|a| a.len()), Some(3));

    let overview = request_ok(
        &mut stdin,
        &mut reader,
        "8",
        "analytics.overview",
        json!({ "today": "2026-05-15" }),
    );
    let buckets = overview["monthlyCollection"].as_array().expect("buckets");
    assert_eq!(buckets.len(), 6);
    assert_eq!(buckets[0]["label"], json!("Dec 2025"));
    assert_eq!(buckets[3]["label"], json!("Mar 2026"));
    assert_eq!(buckets[3]["amount"].as_f64(), Some(800.0));
    assert_eq!(buckets[4]["amount"].as_f64(), Some(0.0));
    assert_eq!(buckets[5]["amount"].as_f64(), Some(1000.0));
    assert_eq!(overview["gradeDistribution"], json!([{ "grade": "7", "count": 1 }]));
    assert_eq!(overview["status"], json!({ "active": 1, "inactive": 0 }));

    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "9",
            "dashboard.summary",
            json!({ "today": "15/05/2026" })
        ),
        "bad_params"
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
