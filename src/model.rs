//! Record schemas for every stored collection.
//!
//! Documents are parsed into these types at the store boundary; a document
//! that does not match its schema is reported as `MalformedRecord` instead of
//! flowing through as a loosely-typed map.

use crate::error::{LedgerError, Result};
use crate::store::{Collection, Document};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.wrapping_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}

/// A stored record kind with a fixed collection.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    fn from_document(doc: Document) -> Result<Self> {
        let Document { id, body } = doc;
        let mut rec: Self =
            serde_json::from_value(body).map_err(|e| LedgerError::MalformedRecord {
                collection: Self::COLLECTION.as_str().to_string(),
                id: id.clone(),
                reason: e.to_string(),
            })?;
        rec.set_id(id);
        Ok(rec)
    }

    fn to_document(&self) -> Result<Document> {
        Ok(Document {
            id: self.id().to_string(),
            body: serde_json::to_value(self)?,
        })
    }
}

macro_rules! impl_record {
    ($ty:ty, $collection:expr) => {
        impl Record for $ty {
            const COLLECTION: Collection = $collection;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

/// RFC 3339 UTC with fixed microsecond precision, so stored timestamps sort
/// lexically in chronological order.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(t: &DateTime<Utc>) -> String {
        t.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn serialize<S: Serializer>(
        v: &Option<DateTime<Utc>>,
        s: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match v {
            Some(t) => s.serialize_str(&format(t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalaryType {
    Monthly,
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
    #[serde(rename = "Half Day")]
    HalfDay,
    Leave,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::HalfDay => "Half Day",
            AttendanceStatus::Leave => "Leave",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

/// Calendar month key used for bucketing and salary periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn pred(self) -> Self {
        if self.month <= 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn days(self) -> u32 {
        let y = self.year;
        let leap = (y % 4 == 0 && y % 100 != 0) || y % 400 == 0;
        match self.month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if leap => 29,
            2 => 28,
            _ => 30,
        }
    }

    /// ISO date strings bounding the month, inclusive.
    pub fn date_range(self) -> (String, String) {
        (
            format!("{:04}-{:02}-01", self.year, self.month),
            format!("{:04}-{:02}-{:02}", self.year, self.month, self.days()),
        )
    }

    /// Chart label, e.g. "Mar 2026".
    pub fn label(self) -> String {
        format!("{} {}", &month_name(self.month)[..3], self.year)
    }
}

/// Month a fee payment is for. Stored as a month name or `"Admission"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeMonth {
    Admission,
    Calendar(u32),
}

impl FeeMonth {
    /// Accepts full month names, three-letter abbreviations, `1`..`12`, and
    /// `Admission`, all case-insensitive.
    pub fn parse(raw: &str) -> Option<Self> {
        let t = raw.trim();
        if t.eq_ignore_ascii_case("admission") {
            return Some(FeeMonth::Admission);
        }
        if let Ok(n) = t.parse::<u32>() {
            return (1..=12).contains(&n).then_some(FeeMonth::Calendar(n));
        }
        if t.len() < 3 {
            return None;
        }
        MONTH_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(t) || name[..3].eq_ignore_ascii_case(t))
            .map(|i| FeeMonth::Calendar(i as u32 + 1))
    }
}

impl fmt::Display for FeeMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeeMonth::Admission => f.write_str("Admission"),
            FeeMonth::Calendar(m) => f.write_str(month_name(*m)),
        }
    }
}

impl Serialize for FeeMonth {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FeeMonth {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u32),
            Text(String),
        }
        let parsed = match Raw::deserialize(d)? {
            Raw::Num(n) => FeeMonth::parse(&n.to_string()),
            Raw::Text(s) => FeeMonth::parse(&s),
        };
        parsed.ok_or_else(|| serde::de::Error::custom("feeMonth must be a month name or Admission"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_code: Option<String>,
    pub full_name: String,
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub parent_name: String,
    pub joining_date: NaiveDate,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(Student, Collection::Students);

impl Student {
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(LedgerError::InvalidRecord("student fullName is required".into()));
        }
        if self.grade.trim().is_empty() {
            return Err(LedgerError::InvalidRecord("student grade is required".into()));
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_code: Option<String>,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub address: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    pub joining_date: NaiveDate,
    pub salary_type: SalaryType,
    pub basic_salary: f64,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(Staff, Collection::Staff);

impl Staff {
    pub fn validate(&self) -> Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(LedgerError::InvalidRecord("staff fullName is required".into()));
        }
        if !self.basic_salary.is_finite() || self.basic_salary < 0.0 {
            return Err(LedgerError::InvalidAmount(format!(
                "basicSalary must be >= 0 (got {})",
                self.basic_salary
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_code: Option<String>,
    pub student_name: String,
    #[serde(default)]
    pub grade: String,
    pub amount: f64,
    pub fee_month: FeeMonth,
    pub fee_year: i32,
    pub payment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(Payment, Collection::Payments);

impl Payment {
    pub fn validate(&self) -> Result<()> {
        if self.student_id.trim().is_empty() {
            return Err(LedgerError::InvalidRecord("payment studentId is required".into()));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(LedgerError::InvalidAmount(format!(
                "payment amount must be >= 0 (got {})",
                self.amount
            )));
        }
        Ok(())
    }

    /// Bucket key for calendar-month fees; admission fees have none.
    pub fn month_key(&self) -> Option<MonthKey> {
        match self.fee_month {
            FeeMonth::Calendar(m) => MonthKey::new(self.fee_year, m),
            FeeMonth::Admission => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub grade: String,
    pub subjects: Vec<String>,
    pub max_marks: f64,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(Exam, Collection::Exams);

impl Exam {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::InvalidRecord("exam name is required".into()));
        }
        if self.grade.trim().is_empty() {
            return Err(LedgerError::InvalidRecord("exam grade is required".into()));
        }
        if !self.max_marks.is_finite() || self.max_marks <= 0.0 {
            return Err(LedgerError::InvalidMaxMarks(self.max_marks));
        }
        if self.subjects.is_empty() {
            return Err(LedgerError::InvalidRecord(
                "exam must have at least one subject".into(),
            ));
        }
        for (i, s) in self.subjects.iter().enumerate() {
            if s.trim().is_empty() {
                return Err(LedgerError::InvalidRecord(
                    "exam subject names must be non-empty".into(),
                ));
            }
            if self.subjects[..i].contains(s) {
                return Err(LedgerError::InvalidRecord(format!("duplicate subject: {}", s)));
            }
        }
        Ok(())
    }

    pub fn has_subject(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksEntry {
    #[serde(default)]
    pub id: String,
    pub exam_id: String,
    pub student_id: String,
    #[serde(default)]
    pub student_name: String,
    pub subject: String,
    pub marks_obtained: f64,
    pub max_marks: f64,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(MarksEntry, Collection::Marks);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAttendance {
    #[serde(default)]
    pub id: String,
    pub staff_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(StaffAttendance, Collection::StaffAttendance);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSalary {
    #[serde(default)]
    pub id: String,
    pub staff_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_name: Option<String>,
    pub month: u32,
    pub year: i32,
    pub salary_type: SalaryType,
    pub total_working_days: u32,
    pub present_days: u32,
    pub absent_days: f64,
    pub half_days: u32,
    pub basic_salary: f64,
    pub deductions: f64,
    pub net_salary: f64,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl_record!(StaffSalary, Collection::StaffSalary);

impl StaffSalary {
    pub fn period(&self) -> Option<MonthKey> {
        MonthKey::new(self.year, self.month)
    }
}
