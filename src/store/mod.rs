//! Document store seam.
//!
//! Services talk to `RecordStore` only; the SQLite adapter backs a workspace
//! and the memory adapter backs tests and embedding.

pub mod memory;
pub mod sqlite;

use crate::error::Result;
use crate::model::Record;
use serde_json::Value;
use std::cmp::Ordering;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Students,
    Staff,
    Payments,
    Exams,
    Marks,
    StaffAttendance,
    StaffSalary,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Students => "students",
            Collection::Staff => "staff",
            Collection::Payments => "payments",
            Collection::Exams => "exams",
            Collection::Marks => "marks",
            Collection::StaffAttendance => "staff_attendance",
            Collection::StaffSalary => "staff_salary",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Conjunction of top-level field conditions with optional ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub conditions: Vec<Condition>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, field: &str, op: Op, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Eq, value)
    }

    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Gte, value)
    }

    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.push(field, Op::Lte, value)
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert or fully replace.
    Set {
        collection: Collection,
        id: String,
        body: Value,
    },
    /// Shallow field update of an existing document.
    Merge {
        collection: Collection,
        id: String,
        patch: Value,
    },
    Delete {
        collection: Collection,
        id: String,
    },
}

pub trait RecordStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>>;

    fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>>;

    /// Applies every op or none of them.
    fn batch_write(&mut self, ops: Vec<WriteOp>) -> Result<()>;
}

pub fn fetch<T: Record, S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<Option<T>> {
    store
        .get(T::COLLECTION, id)?
        .map(T::from_document)
        .transpose()
}

pub fn fetch_all<T: Record, S: RecordStore + ?Sized>(store: &S, query: &Query) -> Result<Vec<T>> {
    store
        .query(T::COLLECTION, query)?
        .into_iter()
        .map(T::from_document)
        .collect()
}

pub fn set_op<T: Record>(record: &T) -> Result<WriteOp> {
    let doc = record.to_document()?;
    Ok(WriteOp::Set {
        collection: T::COLLECTION,
        id: doc.id,
        body: doc.body,
    })
}

/// Shallow merge of `patch` object fields into `body`.
pub(crate) fn merge_fields(body: &mut Value, patch: &Value) {
    if let (Some(dst), Some(src)) = (body.as_object_mut(), patch.as_object()) {
        for (k, v) in src {
            dst.insert(k.clone(), v.clone());
        }
    }
}

/// SQLite-like ordering across JSON values: null, then numbers, then text.
pub(crate) fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) | Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(_) => 3,
        }
    }
    fn num(v: &Value) -> f64 {
        match v {
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    match (rank(a), rank(b)) {
        (ra, rb) if ra != rb => ra.cmp(&rb),
        (1, _) => {
            let (x, y) = (a.map(num).unwrap_or(0.0), b.map(num).unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (2, _) => {
            let x = a.and_then(|v| v.as_str()).unwrap_or("");
            let y = b.and_then(|v| v.as_str()).unwrap_or("");
            x.cmp(y)
        }
        (3, _) => a.map(|v| v.to_string()).cmp(&b.map(|v| v.to_string())),
        _ => Ordering::Equal,
    }
}
