use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult, store::Store};

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<Value>,
}

impl AuditEntry {
    pub fn new(actor_id: Uuid, action: &str, resource: &str, metadata: Value) -> Self {
        Self {
            actor_id: Some(actor_id),
            action: action.to_string(),
            resource: Some(resource.to_string()),
            metadata: Some(metadata),
        }
    }
}

/// Records an audit entry after the fact; a failure is logged, never returned.
pub async fn log_audit<S: Store>(store: &S, entry: AuditEntry) {
    let action = entry.action.clone();
    if let Err(err) = store.record_audit(entry).await {
        tracing::warn!(error = %err, %action, "audit log failed");
    }
}

pub async fn insert_audit(pool: &DbPool, entry: AuditEntry) -> AppResult<()> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, actor_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(entry.actor_id)
    .bind(entry.action)
    .bind(entry.resource)
    .bind(entry.metadata)
    .execute(pool)
    .await?;

    Ok(())
}
