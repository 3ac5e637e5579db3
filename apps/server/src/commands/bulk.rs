//! # Bulk Price Modification Commands
//!
//! Intents of the bulk repricing workflow and the read endpoints around it.
//!
//! ```text
//!   POST /api/bulk-price-modifications
//!     { "intent": "setup-bulk-price-modification", "scope": "CATEGORY",
//!       "categoryIds": [...], "strategy": "PERCENTAGE",
//!       "direction": "INCREASE", "adjustmentValue": 10 }
//!     { "intent": "execute-bulk-price-modification", "id": "..." }
//!     { "intent": "cancel-bulk-price-modification",  "id": "..." }
//!     { "intent": "revert-bulk-price-modification",  "id": "..." }
//!
//!   GET  /api/bulk-price-modifications        → newest first
//!   GET  /api/bulk-price-modifications/{id}   → rows, snapshot, preview
//! ```
//!
//! Status rules live in `ventesca_core::bulk`; the transactions in
//! `ventesca_db::BulkModificationRepository`. A request that breaks a status
//! rule is answered with 409 CONFLICT.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::ApiError;
use crate::session::Session;
use crate::state::AppState;
use ventesca_core::bulk::{BulkProjection, BulkSetup};
use ventesca_core::validation::validate_uuid;
use ventesca_core::{
    BulkPriceModification, BulkScope, BulkStatus, PriceModification, PriceModificationSnapshot,
    ValidationError, ValidationErrors,
};
use ventesca_db::Database;

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "intent", rename_all = "kebab-case")]
pub enum BulkIntent {
    SetupBulkPriceModification(BulkSetup),
    ExecuteBulkPriceModification { id: String },
    CancelBulkPriceModification { id: String },
    RevertBulkPriceModification { id: String },
}

/// Result of a bulk intent. `modification` is absent after a cancel.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification: Option<BulkPriceModification>,
}

/// One bulk modification with everything recorded under it.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BulkDetail {
    pub modification: BulkPriceModification,
    pub rows: Vec<PriceModification>,
    pub snapshots: Vec<PriceModificationSnapshot>,
    /// Projected inventory totals; only while PENDING.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<BulkProjection>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/bulk-price-modifications`
pub async fn list_bulk_modifications(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<BulkPriceModification>>, ApiError> {
    let bulks = state.db.bulk_modifications().list(&session.tenant_id).await?;
    Ok(Json(bulks))
}

/// `GET /api/bulk-price-modifications/{id}`
pub async fn get_bulk_modification(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<BulkDetail>, ApiError> {
    let detail = load_detail(&state.db, &session, &id).await?;
    Ok(Json(detail))
}

/// `POST /api/bulk-price-modifications`
pub async fn post_bulk_intent(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<BulkIntent>, JsonRejection>,
) -> Result<Json<BulkOutcome>, ApiError> {
    let Json(intent) = payload?;
    let outcome = dispatch(&state.db, &session, intent).await?;
    Ok(Json(outcome))
}

// =============================================================================
// Dispatch
// =============================================================================

pub async fn dispatch(
    db: &Database,
    session: &Session,
    intent: BulkIntent,
) -> Result<BulkOutcome, ApiError> {
    debug!(intent = ?intent, user = %session.user_id, "Dispatching bulk intent");

    let repo = db.bulk_modifications();

    match intent {
        BulkIntent::SetupBulkPriceModification(setup) => {
            validate_setup(db, session, &setup).await?;

            let bulk = repo
                .setup(&session.tenant_id, &session.user_id, &setup)
                .await?;

            Ok(BulkOutcome {
                message: format!(
                    "{} product(s) staged for repricing",
                    bulk.affected_products_count
                ),
                modification: Some(bulk),
            })
        }

        BulkIntent::ExecuteBulkPriceModification { id } => {
            validate_uuid("id", &id)?;
            let bulk = repo
                .execute(&session.tenant_id, &id, &session.user_id)
                .await?;

            Ok(BulkOutcome {
                message: format!("{} product price(s) updated", bulk.affected_products_count),
                modification: Some(bulk),
            })
        }

        BulkIntent::CancelBulkPriceModification { id } => {
            validate_uuid("id", &id)?;
            repo.cancel(&session.tenant_id, &id).await?;

            Ok(BulkOutcome {
                message: "Bulk price modification cancelled".to_string(),
                modification: None,
            })
        }

        BulkIntent::RevertBulkPriceModification { id } => {
            validate_uuid("id", &id)?;
            let bulk = repo
                .revert(&session.tenant_id, &id, &session.user_id)
                .await?;

            info!(bulk_id = %id, "Bulk price modification reverted on request");

            Ok(BulkOutcome {
                message: "Previous prices restored".to_string(),
                modification: Some(bulk),
            })
        }
    }
}

/// Field checks plus: every selected category must belong to the tenant.
async fn validate_setup(
    db: &Database,
    session: &Session,
    setup: &BulkSetup,
) -> Result<(), ApiError> {
    setup.validate()?;

    if setup.scope == BulkScope::Category {
        let found = db
            .categories()
            .count_existing(&session.tenant_id, &setup.category_ids)
            .await?;

        if found != setup.category_ids.len() {
            let mut errors = ValidationErrors::new();
            errors.push(ValidationError::InvalidFormat {
                field: "categoryIds".to_string(),
                reason: "contains an unknown category".to_string(),
            });
            return Err(errors.into());
        }
    }

    Ok(())
}

async fn load_detail(db: &Database, session: &Session, id: &str) -> Result<BulkDetail, ApiError> {
    validate_uuid("id", id)?;

    let repo = db.bulk_modifications();

    let modification = repo
        .get(&session.tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bulk price modification", id))?;

    let rows = repo.modifications(id).await?;
    let snapshots = repo.snapshots(id).await?;

    let preview = if modification.status == BulkStatus::Pending {
        Some(repo.preview(&session.tenant_id, id).await?)
    } else {
        None
    };

    Ok(BulkDetail {
        modification,
        rows,
        snapshots,
        preview,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
