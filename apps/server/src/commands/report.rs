//! Inventory valuation report.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::error::ApiError;
use crate::session::Session;
use crate::state::AppState;
use ventesca_core::InventoryValuation;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    #[serde(flatten)]
    pub valuation: InventoryValuation,
    pub currency_symbol: String,
}

/// `GET /api/reports/inventory`
pub async fn inventory_report(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<InventoryReport>, ApiError> {
    let valuation = state.db.products().valuation(&session.tenant_id).await?;

    Ok(Json(InventoryReport {
        valuation,
        currency_symbol: state.config.currency_symbol.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{insert_product, session, test_state};

    #[tokio::test]
    async fn test_inventory_report() {
        let state = test_state().await;
        // cost is half the selling price
        insert_product(&state.db, "A", 1000, 3).await;
        insert_product(&state.db, "B", 200, 10).await;

        let Json(report) = inventory_report(State(state.clone()), session())
            .await
            .unwrap();

        assert_eq!(report.valuation.product_count, 2);
        assert_eq!(report.valuation.total_units, 13);
        assert_eq!(report.valuation.total_selling_value, 5000);
        assert_eq!(report.valuation.total_cost_value, 2500);
        assert_eq!(report.valuation.potential_profit, 2500);
        assert_eq!(report.currency_symbol, "$");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalSellingValue"], 5000);
        assert_eq!(json["currencySymbol"], "$");
    }
}
