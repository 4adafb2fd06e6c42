mod test_support;

use serde_json::json;
use test_support::{request_err, request_ok, spawn_sidecar, temp_dir};

#[test]
fn saving_the_same_mark_twice_keeps_one_entry() {
    let workspace = temp_dir("tuition-marks-idem");
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
            "fullName": "Meera Iyer",
            "grade": "10",
            "joiningDate": "2026-04-01",
            "status": "Active"
        }),
    );
    let student_id = student["id"].as_str().expect("student id").to_string();

    let exam = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "exams.create",
        json!({
            "name": "Unit Test 1",
            "date": "2026-07-10",
            "grade": "10",
            "subjects": ["Math", "Science"],
            "maxMarks": 50
        }),
    );
    let exam_id = exam["id"].as_str().expect("exam id").to_string();

    let entry = |marks: f64| {
        json!({
            "entries": [{
                "examId": exam_id,
                "studentId": student_id,
                "studentName": "Meera Iyer",
                "subject": "Math",
                "marksObtained": marks
            }]
        })
    };

    let first = request_ok(&mut stdin, &mut reader, "4", "marks.save", entry(31.0));
    let second = request_ok(&mut stdin, &mut reader, "5", "marks.save", entry(44.0));
    assert_eq!(first["entries"][0]["id"], second["entries"][0]["id"]);
    assert_eq!(second["entries"][0]["maxMarks"].as_f64(), Some(50.0));

    let stored = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "marks.byExam",
        json!({ "examId": exam_id }),
    );
    let entries = stored["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["marksObtained"].as_f64(), Some(44.0));

    // Rejected sheets write nothing.
    assert_eq!(
        request_err(&mut stdin, &mut reader, "7", "marks.save", entry(51.0)),
        "marks_exceed_maximum"
    );
    assert_eq!(
        request_err(
            &mut stdin,
            &mut reader,
            "8",
            "marks.save",
            json!({
                "entries": [{
                    "examId": exam_id,
                    "studentId": student_id,
                    "subject": "History",
                    "marksObtained": 20
                }]
            })
        ),
        "invalid_record"
    );
    let still = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "marks.byStudent",
        json!({ "studentId": student_id }),
    );
    assert_eq!(still["entries"].as_array().map(|a| a.len()), Some(1));
    assert_eq!(still["entries"][0]["marksObtained"].as_f64(), Some(44.0));

    let sheet = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "marks.resultSheet",
        json!({ "examId": exam_id }),
    );
    let row = &sheet["rows"][0];
    assert_eq!(row["studentName"], json!("Meera Iyer"));
    assert_eq!(row["total"].as_f64(), Some(44.0));
    assert_eq!(row["max"].as_f64(), Some(50.0));
    assert_eq!(row["percentage"].as_i64(), Some(88));
    assert_eq!(row["grade"], json!("A"));
    assert_eq!(row["status"], json!("Pass"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
