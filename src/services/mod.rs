//! Record services: fetch documents, parse them into typed records, call the
//! ledger engine and write back in one batch.
//!
//! Every service is a free function generic over `RecordStore`, so the same
//! code runs against a workspace database and the in-memory store.

pub mod dashboard;
pub mod fees;
pub mod marks;
pub mod staff;
pub mod students;

use crate::error::{LedgerError, Result};
use crate::model::Record;
use crate::store::{merge_fields, set_op, Document, RecordStore, WriteOp};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Fields a caller can never patch.
const PROTECTED_FIELDS: [&str; 2] = ["id", "createdAt"];

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

pub(crate) fn require<T: Record, S: RecordStore + ?Sized>(store: &S, id: &str) -> Result<T> {
    crate::store::fetch::<T, S>(store, id)?
        .ok_or_else(|| LedgerError::not_found(T::COLLECTION.as_str(), id))
}

/// Applies a shallow patch to a stored record, re-parses and re-checks it,
/// then writes the full record back.
pub(crate) fn patch_record<T, S, F>(store: &mut S, id: &str, patch: &Value, check: F) -> Result<T>
where
    T: Record,
    S: RecordStore + ?Sized,
    F: Fn(&T) -> Result<()>,
{
    let Some(fields) = patch.as_object() else {
        return Err(LedgerError::InvalidRecord("patch must be an object".into()));
    };
    let Some(doc) = store.get(T::COLLECTION, id)? else {
        return Err(LedgerError::not_found(T::COLLECTION.as_str(), id));
    };

    let mut allowed = fields.clone();
    for key in PROTECTED_FIELDS {
        allowed.remove(key);
    }
    let mut body = doc.body;
    merge_fields(&mut body, &Value::Object(allowed));

    let record = T::from_document(Document {
        id: id.to_string(),
        body,
    })
    .map_err(|e| match e {
        LedgerError::MalformedRecord { reason, .. } => LedgerError::InvalidRecord(reason),
        other => other,
    })?;
    check(&record)?;
    store.batch_write(vec![set_op(&record)?])?;
    Ok(record)
}

pub(crate) fn delete_record<T: Record, S: RecordStore + ?Sized>(
    store: &mut S,
    id: &str,
) -> Result<()> {
    if store.get(T::COLLECTION, id)?.is_none() {
        return Err(LedgerError::not_found(T::COLLECTION.as_str(), id));
    }
    store.batch_write(vec![WriteOp::Delete {
        collection: T::COLLECTION,
        id: id.to_string(),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RecordStatus, Student};
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use serde_json::json;

    fn seed(store: &mut MemoryStore) {
        let s = Student {
            id: "s1".into(),
            student_code: Some("DT-1001".into()),
            full_name: "Asha Rao".into(),
            grade: "8".into(),
            section: None,
            gender: None,
            dob: None,
            address: String::new(),
            phone: String::new(),
            email: None,
            parent_name: String::new(),
            joining_date: NaiveDate::from_ymd_opt(2026, 1, 1).expect("date"),
            status: RecordStatus::Active,
            created_at: None,
        };
        store.batch_write(vec![set_op(&s).expect("op")]).expect("seed");
    }

    #[test]
    fn patch_ignores_protected_fields() {
        let mut store = MemoryStore::new();
        seed(&mut store);
        let patch = json!({ "id": "hijack", "grade": "9" });
        let s: Student = patch_record(&mut store, "s1", &patch, |_| Ok(())).expect("patch");
        assert_eq!(s.id, "s1");
        assert_eq!(s.grade, "9");
        assert!(store.get(crate::store::Collection::Students, "hijack").expect("get").is_none());
    }

    #[test]
    fn patch_with_wrong_type_is_invalid_record() {
        let mut store = MemoryStore::new();
        seed(&mut store);
        let patch = json!({ "status": 7 });
        let err = patch_record::<Student, _, _>(&mut store, "s1", &patch, |_| Ok(()))
            .expect_err("must fail");
        assert!(matches!(err, LedgerError::InvalidRecord(_)));
        let kept: Student = require(&store, "s1").expect("still there");
        assert_eq!(kept.status, RecordStatus::Active);
    }

    #[test]
    fn delete_missing_record_is_not_found() {
        let mut store = MemoryStore::new();
        let err = delete_record::<Student, _>(&mut store, "nope").expect_err("must fail");
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }
}
