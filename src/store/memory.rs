use super::{
    compare_values, merge_fields, Collection, Direction, Document, Op, Query, RecordStore, WriteOp,
};
use crate::error::{LedgerError, Result};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    body: Value,
}

/// In-process store with the same query semantics as the SQLite adapter.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: HashMap<(Collection, String), Slot>,
    next_seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(body: &Value, query: &Query) -> bool {
    query.conditions.iter().all(|c| {
        let field = body.get(&c.field);
        let ord = compare_values(field, Some(&c.value));
        let present = !matches!(field, None | Some(Value::Null));
        // SQL comparisons with NULL are never true.
        present
            && match c.op {
                Op::Eq => ord == Ordering::Equal,
                Op::Gte => ord != Ordering::Less,
                Op::Lte => ord != Ordering::Greater,
            }
    })
}

impl RecordStore for MemoryStore {
    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        Ok(self
            .docs
            .get(&(collection, id.to_string()))
            .map(|slot| Document {
                id: id.to_string(),
                body: slot.body.clone(),
            }))
    }

    fn query(&self, collection: Collection, query: &Query) -> Result<Vec<Document>> {
        let mut rows: Vec<(&String, &Slot)> = self
            .docs
            .iter()
            .filter(|((c, _), slot)| *c == collection && matches(&slot.body, query))
            .map(|((_, id), slot)| (id, slot))
            .collect();

        match &query.order_by {
            Some((field, dir)) => rows.sort_by(|(_, a), (_, b)| {
                let ord = compare_values(a.body.get(field), b.body.get(field))
                    .then(a.seq.cmp(&b.seq));
                match dir {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            }),
            None => rows.sort_by_key(|(_, slot)| slot.seq),
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|(id, slot)| Document {
                id: id.clone(),
                body: slot.body.clone(),
            })
            .collect())
    }

    fn batch_write(&mut self, ops: Vec<WriteOp>) -> Result<()> {
        // Stage on a copy so a failing op leaves the store untouched.
        let mut docs = self.docs.clone();
        let mut next_seq = self.next_seq;

        for op in ops {
            match op {
                WriteOp::Set {
                    collection,
                    id,
                    body,
                } => match docs.get_mut(&(collection, id.clone())) {
                    Some(slot) => slot.body = body,
                    None => {
                        next_seq += 1;
                        docs.insert((collection, id), Slot { seq: next_seq, body });
                    }
                },
                WriteOp::Merge {
                    collection,
                    id,
                    patch,
                } => {
                    let Some(slot) = docs.get_mut(&(collection, id.clone())) else {
                        return Err(LedgerError::not_found(collection.as_str(), id));
                    };
                    merge_fields(&mut slot.body, &patch);
                }
                WriteOp::Delete { collection, id } => {
                    docs.remove(&(collection, id));
                }
            }
        }

        self.docs = docs;
        self.next_seq = next_seq;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(id: &str, body: Value) -> WriteOp {
        WriteOp::Set {
            collection: Collection::Students,
            id: id.to_string(),
            body,
        }
    }

    #[test]
    fn failed_batch_leaves_store_unchanged() {
        let mut store = MemoryStore::new();
        store
            .batch_write(vec![set("a", json!({ "grade": "5" }))])
            .expect("seed");

        let res = store.batch_write(vec![
            set("b", json!({ "grade": "6" })),
            WriteOp::Merge {
                collection: Collection::Students,
                id: "missing".into(),
                patch: json!({ "grade": "7" }),
            },
        ]);
        assert!(matches!(res, Err(LedgerError::NotFound { .. })));
        assert_eq!(
            store
                .query(Collection::Students, &Query::new())
                .expect("query")
                .len(),
            1
        );
        assert!(store.get(Collection::Students, "b").expect("get").is_none());
    }

    #[test]
    fn query_filters_orders_and_limits() {
        let mut store = MemoryStore::new();
        store
            .batch_write(vec![
                set("a", json!({ "grade": "5", "fullName": "Zara" })),
                set("b", json!({ "grade": "5", "fullName": "Anil" })),
                set("c", json!({ "grade": "6", "fullName": "Bela" })),
                set("d", json!({ "grade": "5", "fullName": "Meera" })),
            ])
            .expect("seed");

        let q = Query::new()
            .eq("grade", "5")
            .order_by("fullName", Direction::Asc)
            .limit(2);
        let ids: Vec<String> = store
            .query(Collection::Students, &q)
            .expect("query")
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["b", "d"]);
    }

    #[test]
    fn set_replaces_but_keeps_insertion_position() {
        let mut store = MemoryStore::new();
        store
            .batch_write(vec![set("a", json!({ "n": 1 })), set("b", json!({ "n": 2 }))])
            .expect("seed");
        store
            .batch_write(vec![set("a", json!({ "n": 3 }))])
            .expect("overwrite");
        let docs = store
            .query(Collection::Students, &Query::new())
            .expect("query");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "a");
        assert_eq!(docs[0].body, json!({ "n": 3 }));
    }

    #[test]
    fn range_conditions_skip_missing_fields() {
        let mut store = MemoryStore::new();
        store
            .batch_write(vec![
                set("a", json!({ "date": "2026-03-01" })),
                set("b", json!({ "date": "2026-03-31" })),
                set("c", json!({ "date": "2026-04-01" })),
                set("d", json!({})),
            ])
            .expect("seed");
        let q = Query::new()
            .gte("date", "2026-03-01")
            .lte("date", "2026-03-31");
        let docs = store.query(Collection::Students, &q).expect("query");
        assert_eq!(docs.len(), 2);
    }
}
