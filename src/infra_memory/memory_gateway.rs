use super::query_eval;
use crate::domain_port::*;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

struct Subscriber {
    query: Query,
    sender: UnboundedSender<Vec<Document>>,
}

#[derive(Default)]
struct StoreState {
    collections: BTreeMap<String, BTreeMap<String, Fields>>,
    clock: Option<DateTime<Utc>>,
}

impl StoreState {
    /// Strictly increasing commit time, even if the wall clock stalls.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.clock {
            Some(last) if now <= last => last + Duration::nanoseconds(1),
            _ => now,
        };
        self.clock = Some(next);
        next
    }

    fn get(&self, collection: &str, id: &str) -> Option<&Fields> {
        self.collections.get(collection)?.get(id)
    }

    fn remove_cascading(&mut self, collection: &str, id: &str, touched: &mut BTreeSet<String>) {
        if let Some(documents) = self.collections.get_mut(collection) {
            documents.remove(id);
        }
        touched.insert(collection.to_owned());

        let prefix = format!("{collection}/{id}/");
        let nested: Vec<String> = self
            .collections
            .keys()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect();
        for key in nested {
            self.collections.remove(&key);
            touched.insert(key);
        }
    }
}

/// In-process document store. Commits are serialised behind one lock and
/// every subscriber of a touched collection gets a fresh snapshot before the
/// lock is released, so snapshots arrive in commit order.
pub struct MemoryGateway {
    state: Mutex<StoreState>,
    subscribers: Arc<DashMap<u64, Subscriber>>,
    next_subscriber: AtomicU64,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            subscribers: Arc::new(DashMap::new()),
            next_subscriber: AtomicU64::new(1),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn state(&self) -> Result<MutexGuard<'_, StoreState>, GatewayError> {
        self.state
            .lock()
            .map_err(|_| GatewayError::Unavailable("store lock poisoned".to_owned()))
    }

    fn read(&self, collection: &str, id: &str) -> Result<Option<Document>, GatewayError> {
        let state = self.state()?;
        Ok(state.get(collection, id).map(|fields| Document {
            id: id.to_owned(),
            fields: fields.clone(),
        }))
    }

    fn run_query(&self, query: &Query) -> Result<Vec<Document>, GatewayError> {
        let state = self.state()?;
        Ok(query_eval::evaluate(state.collections.get(&query.collection), query))
    }

    fn register(&self, query: Query) -> Result<Subscription, GatewayError> {
        let state = self.state()?;
        let (sender, receiver) = unbounded_channel();
        let initial = query_eval::evaluate(state.collections.get(&query.collection), &query);
        // receiver is alive, the send cannot fail
        let _ = sender.send(initial);

        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(subscriber = id, collection = %query.collection, "subscribe");
        self.subscribers.insert(id, Subscriber { query, sender });
        drop(state);

        let subscribers = self.subscribers.clone();
        Ok(Subscription::new(receiver, move || {
            if subscribers.remove(&id).is_some() {
                tracing::debug!(subscriber = id, "unsubscribe");
            }
        }))
    }

    fn commit(&self, ops: Vec<AtomicOp>) -> Result<(), GatewayError> {
        let mut state = self.state()?;
        let now = state.tick();

        // later ops in the batch see the effect of earlier ones
        let mut staged: BTreeMap<(String, String), Option<Fields>> = BTreeMap::new();
        for op in &ops {
            let (collection, id) = op.target();
            let key = (collection.to_owned(), id.to_owned());
            let current = match staged.get(&key) {
                Some(pending) => pending.clone(),
                None => state.get(collection, id).cloned(),
            };

            let next = match op {
                AtomicOp::Set {
                    patch,
                    merge,
                    precondition,
                    ..
                } => {
                    query_eval::check_precondition(precondition, current.as_ref(), collection, id)?;
                    let base = if *merge {
                        current.unwrap_or_default()
                    } else {
                        Fields::new()
                    };
                    Some(query_eval::apply_patch(base, patch, now)?)
                }
                AtomicOp::Update {
                    patch,
                    precondition,
                    ..
                } => {
                    let base = current.ok_or_else(|| GatewayError::NotFound {
                        collection: collection.to_owned(),
                        id: id.to_owned(),
                    })?;
                    query_eval::check_precondition(precondition, Some(&base), collection, id)?;
                    Some(query_eval::apply_patch(base, patch, now)?)
                }
                AtomicOp::Delete { precondition, .. } => {
                    query_eval::check_precondition(precondition, current.as_ref(), collection, id)?;
                    None
                }
            };
            staged.insert(key, next);
        }

        let mut touched = BTreeSet::new();
        for ((collection, id), next) in staged {
            match next {
                Some(fields) => {
                    state
                        .collections
                        .entry(collection.clone())
                        .or_default()
                        .insert(id, fields);
                    touched.insert(collection);
                }
                None => state.remove_cascading(&collection, &id, &mut touched),
            }
        }

        self.notify(&state, &touched);
        Ok(())
    }

    fn notify(&self, state: &StoreState, touched: &BTreeSet<String>) {
        let mut closed = Vec::new();
        for entry in self.subscribers.iter() {
            let subscriber = entry.value();
            if !touched.contains(&subscriber.query.collection) {
                continue;
            }
            let snapshot = query_eval::evaluate(
                state.collections.get(&subscriber.query.collection),
                &subscriber.query,
            );
            if subscriber.sender.send(snapshot).is_err() {
                closed.push(*entry.key());
            }
        }
        for id in closed {
            self.subscribers.remove(&id);
        }
    }
}

#[async_trait::async_trait]
impl PersistenceGateway for MemoryGateway {
    fn allocate_id(&self, _collection: &str) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, GatewayError> {
        self.read(collection, id)
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, GatewayError> {
        self.run_query(query)
    }

    async fn subscribe(&self, query: Query) -> Result<Subscription, GatewayError> {
        self.register(query)
    }

    async fn run_atomic(&self, ops: Vec<AtomicOp>) -> Result<(), GatewayError> {
        self.commit(ops)
    }

    async fn close(&self) {
        let open = self.subscribers.len();
        self.subscribers.clear();
        tracing::info!(open, "memory gateway closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use serde_json::json;

    fn patch(value: serde_json::Value) -> FieldPatch {
        FieldPatch::from_serializable(&value).unwrap()
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let gateway = MemoryGateway::new();
        gateway
            .set_document("users", "u1", patch(json!({ "name": "alice" })), false)
            .await
            .unwrap();

        let doc = gateway.get_document("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc.get("name"), Some(&json!("alice")));
        assert!(gateway.get_document("users", "u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_merge_keeps_other_fields() {
        let gateway = MemoryGateway::new();
        gateway
            .set_document("users", "u1", patch(json!({ "a": 1, "b": 2 })), false)
            .await
            .unwrap();
        gateway
            .set_document("users", "u1", patch(json!({ "b": 3 })), true)
            .await
            .unwrap();

        let doc = gateway.get_document("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc.get("a"), Some(&json!(1)));
        assert_eq!(doc.get("b"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_update_missing_document_fails() {
        let gateway = MemoryGateway::new();
        let err = gateway
            .increment_field("users", "ghost", "followersCount", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_array_field_helpers() {
        let gateway = MemoryGateway::new();
        gateway
            .set_document("groups", "g1", patch(json!({ "uids": [] })), false)
            .await
            .unwrap();
        gateway
            .append_to_array_field("groups", "g1", "uids", json!("u1"))
            .await
            .unwrap();
        gateway
            .append_to_array_field("groups", "g1", "uids", json!("u1"))
            .await
            .unwrap();
        gateway
            .append_to_array_field("groups", "g1", "uids", json!("u2"))
            .await
            .unwrap();
        gateway
            .remove_from_array_field("groups", "g1", "uids", json!("u1"))
            .await
            .unwrap();

        let doc = gateway.get_document("groups", "g1").await.unwrap().unwrap();
        assert_eq!(doc.get("uids"), Some(&json!(["u2"])));
    }

    #[tokio::test]
    async fn test_failed_precondition_aborts_whole_batch() {
        let gateway = MemoryGateway::new();
        gateway
            .set_document("codes", "GRP-AAAAAA", patch(json!({ "groupId": "g1" })), false)
            .await
            .unwrap();

        let err = gateway
            .run_atomic(vec![
                AtomicOp::create("groups", "g2", patch(json!({ "name": "beta" }))),
                AtomicOp::create("codes", "GRP-AAAAAA", patch(json!({ "groupId": "g2" }))),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::PreconditionFailed { .. }));
        assert!(gateway.get_document("groups", "g2").await.unwrap().is_none());
        let code = gateway.get_document("codes", "GRP-AAAAAA").await.unwrap().unwrap();
        assert_eq!(code.get("groupId"), Some(&json!("g1")));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_subcollections() {
        let gateway = MemoryGateway::new();
        gateway
            .set_document("groups", "g1", patch(json!({ "name": "alpha" })), false)
            .await
            .unwrap();
        gateway
            .set_document("groups/g1/messages", "m1", patch(json!({ "text": "hi" })), false)
            .await
            .unwrap();
        gateway
            .set_document("groups/g10/messages", "m2", patch(json!({ "text": "yo" })), false)
            .await
            .unwrap();

        gateway.delete_document("groups", "g1").await.unwrap();

        assert!(gateway.get_document("groups", "g1").await.unwrap().is_none());
        assert!(
            gateway
                .get_document("groups/g1/messages", "m1")
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            gateway
                .get_document("groups/g10/messages", "m2")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_server_timestamps_strictly_increase() {
        let gateway = MemoryGateway::new();
        for id in ["m1", "m2", "m3"] {
            let write = FieldPatch::new().server_timestamp("timestamp");
            gateway.set_document("messages", id, write, false).await.unwrap();
        }
        let docs = gateway
            .query(&Query::new("messages").order_by("timestamp", Direction::Ascending))
            .await
            .unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_ne!(docs[0].get("timestamp"), docs[1].get("timestamp"));
    }

    #[tokio::test]
    async fn test_subscription_receives_initial_and_updates() {
        let gateway = MemoryGateway::new();
        let query = Query::new("groups").filter(Filter::eq("type", json!("public")));
        let mut sub = gateway.subscribe(query).await.unwrap();

        assert!(sub.next().await.unwrap().is_empty());

        gateway
            .set_document("groups", "g1", patch(json!({ "type": "public" })), false)
            .await
            .unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "g1");
    }

    #[tokio::test]
    async fn test_cancel_releases_and_is_idempotent() {
        let gateway = MemoryGateway::new();
        let mut sub = gateway.subscribe(Query::new("groups")).await.unwrap();
        assert_eq!(gateway.subscriber_count(), 1);

        sub.cancel();
        sub.cancel();
        assert_eq!(gateway.subscriber_count(), 0);
        assert!(sub.is_cancelled());
        assert!(sub.next().await.is_none());

        gateway
            .set_document("groups", "g1", patch(json!({ "type": "public" })), false)
            .await
            .unwrap();
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_close_ends_open_subscriptions() {
        let gateway = MemoryGateway::new();
        let mut sub = gateway.subscribe(Query::new("groups")).await.unwrap();
        assert!(sub.next().await.unwrap().is_empty());

        gateway.close().await;
        assert_eq!(gateway.subscriber_count(), 0);
        assert!(sub.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_subscription_releases_it() {
        let gateway = MemoryGateway::new();
        let sub = gateway.subscribe(Query::new("groups")).await.unwrap();
        drop(sub);
        assert_eq!(gateway.subscriber_count(), 0);
    }
}
