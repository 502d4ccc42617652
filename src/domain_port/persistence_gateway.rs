use crate::domain_port::{AtomicOp, Document, FieldPatch, FieldValue, Query, Subscription};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("precondition failed on {collection}/{id}")]
    PreconditionFailed { collection: String, id: String },
    #[error("codec error: {0}")]
    Codec(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Document store the community core persists through. Collections are
/// slash-separated paths; `groups/{id}/messages` lives under `groups/{id}`.
#[async_trait::async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Fresh document id for `collection`. Never reused.
    fn allocate_id(&self, collection: &str) -> String;

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, GatewayError>;

    async fn query(&self, query: &Query) -> Result<Vec<Document>, GatewayError>;

    /// Emits the current result set immediately, then again after every
    /// commit touching `query.collection`.
    async fn subscribe(&self, query: Query) -> Result<Subscription, GatewayError>;

    /// All-or-nothing. A failed precondition aborts the whole batch.
    async fn run_atomic(&self, ops: Vec<AtomicOp>) -> Result<(), GatewayError>;

    /// Ends every live subscription. Later calls may fail.
    async fn close(&self) {}

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        patch: FieldPatch,
        merge: bool,
    ) -> Result<(), GatewayError> {
        self.run_atomic(vec![AtomicOp::set(collection, id, patch, merge)])
            .await
    }

    async fn update_fields(
        &self,
        collection: &str,
        id: &str,
        patch: FieldPatch,
    ) -> Result<(), GatewayError> {
        self.run_atomic(vec![AtomicOp::update(collection, id, patch)])
            .await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), GatewayError> {
        self.run_atomic(vec![AtomicOp::delete(collection, id)]).await
    }

    async fn append_to_array_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), GatewayError> {
        let patch = FieldPatch::new().transform(field, FieldValue::ArrayUnion(vec![value]));
        self.update_fields(collection, id, patch).await
    }

    async fn remove_from_array_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), GatewayError> {
        let patch = FieldPatch::new().transform(field, FieldValue::ArrayRemove(vec![value]));
        self.update_fields(collection, id, patch).await
    }

    async fn increment_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<(), GatewayError> {
        let patch = FieldPatch::new().increment(field, delta);
        self.update_fields(collection, id, patch).await
    }
}
