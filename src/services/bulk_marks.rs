use std::collections::BTreeMap;

use sqlx::PgPool;

use crate::core::metrics;
use crate::schemas::exam_mark::{
    BulkItemError, BulkItemReference, BulkMarkItem, BulkMarkResponse, BulkStatus,
};
use crate::services::grading::{self, GradingError};

/// Applies every item independently; one bad item never rolls back the others.
pub(crate) async fn bulk_upsert(pool: &PgPool, items: Vec<serde_json::Value>) -> BulkMarkResponse {
    let total = items.len();
    let mut updated = 0usize;
    let mut errors = Vec::new();

    for (index, raw) in items.into_iter().enumerate() {
        let reference = reference_of(&raw);
        match apply_item(pool, raw).await {
            Ok(mark_id) => {
                updated += 1;
                tracing::debug!(index, mark_id = %mark_id, "Bulk item applied");
            }
            Err(error) => {
                if let GradingError::Database(db_error) = &error {
                    tracing::error!(index, error = %db_error, "Bulk item failed on database write");
                } else {
                    tracing::debug!(index, code = error.code(), "Bulk item rejected");
                }
                errors.push(item_error(index, reference, &error));
            }
        }
    }

    metrics::record_bulk_items(updated, errors.len());
    tracing::info!(
        total,
        updated,
        failed = errors.len(),
        action = "bulk_upsert",
        "Bulk marks processed"
    );

    let status = if errors.is_empty() { BulkStatus::Success } else { BulkStatus::Partial };
    BulkMarkResponse { status, updated, total, errors }
}

async fn apply_item(pool: &PgPool, raw: serde_json::Value) -> Result<String, GradingError> {
    if !raw.is_object() {
        return Err(GradingError::validation("item", "Each item must be a JSON object"));
    }
    let item: BulkMarkItem = serde_json::from_value(raw)
        .map_err(|err| GradingError::validation("item", err.to_string()))?;

    let mark = match item.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => grading::update_mark(pool, id, item.fields.into_changes()?).await?,
        None => grading::record_mark(pool, item.fields.into_new_mark()?).await?,
    };
    Ok(mark.id)
}

/// Echoes `id` and `student_id` back so callers can match errors to their rows.
fn reference_of(raw: &serde_json::Value) -> BulkItemReference {
    let field = |name: &str| raw.get(name).and_then(|value| value.as_str()).map(str::to_string);
    BulkItemReference { id: field("id"), student_id: field("student_id") }
}

fn item_error(index: usize, reference: BulkItemReference, error: &GradingError) -> BulkItemError {
    let message = match error {
        GradingError::Database(_) => "Failed to write exam mark".to_string(),
        other => other.to_string(),
    };
    let mut errors = BTreeMap::new();
    errors.insert(error.field().to_string(), vec![message]);
    BulkItemError { index, reference, code: error.code(), errors }
}
