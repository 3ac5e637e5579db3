//! # Validation Module
//!
//! Input validation for every mutating payload.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                       │
//! │  ├── Required fields present                                            │
//! │  └── Enum membership (LineType, BulkStrategy, ...)                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Numeric ranges (quantity, price and stock within their maximums)   │
//! │  └── String rules (code, name)                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── UNIQUE (tenant_id, code)                                           │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Payload validators collect every failure into
//! [`ValidationErrors`](crate::error::ValidationErrors) so the client gets the
//! full per-field list in one response.

use std::collections::HashSet;

use crate::error::{ValidationError, ValidationErrors};
use crate::types::{BulkScope, BulkStrategy, DiscountScope, DiscountType};
use crate::{MAX_ADJUSTMENT_PERCENT, MAX_LINE_QUANTITY, MAX_PRICE, MAX_STOCK};

/// Result type for single-field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, numbers, hyphens and underscores only (barcodes included)
///
/// ```rust
/// use ventesca_core::validation::validate_code;
///
/// assert!(validate_code("7801234567890").is_ok());
/// assert!(validate_code("BEB-001").is_ok());
/// assert!(validate_code("").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product, category, supplier, discount).
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in minor units. Zero is allowed, up to [`MAX_PRICE`].
pub fn validate_price(field: &str, amount: i64) -> ValidationResult<()> {
    if amount < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if amount > MAX_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE,
        });
    }
    Ok(())
}

/// Validates a stock level (0 to [`MAX_STOCK`]).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }
    if stock > MAX_STOCK {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_STOCK,
        });
    }
    Ok(())
}

/// Validates a quantity set directly on an order line.
///
/// ## Rules
/// - Must not be negative; zero is a valid line quantity
/// - Must not exceed [`MAX_LINE_QUANTITY`]
///
/// Stock is NOT checked here: exceeding stock is a business-rule
/// rejection reported as the `over` status, not a validation failure.
///
/// ```rust
/// use ventesca_core::validation::validate_line_quantity;
///
/// assert!(validate_line_quantity(0).is_ok());
/// assert!(validate_line_quantity(-1).is_err());
/// assert!(validate_line_quantity(100_000_000_000_000_000).is_err());
/// ```
pub fn validate_line_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a discount value against its type.
///
/// ## Rules
/// - Must be positive
/// - PERCENTAGE values are whole percents, at most 100
/// - FIXED values are minor units, at most [`MAX_PRICE`]
pub fn validate_discount_value(discount_type: DiscountType, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "value".to_string(),
        });
    }

    let max = match discount_type {
        DiscountType::Percentage => 100,
        DiscountType::Fixed => MAX_PRICE,
    };
    if value > max {
        return Err(ValidationError::OutOfRange {
            field: "value".to_string(),
            min: 1,
            max,
        });
    }

    Ok(())
}

/// Validates a discount's minimum quantity (at least one unit).
pub fn validate_minimum_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_LINE_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "minimumQuantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates a bulk adjustment value.
///
/// ## Rules
/// - Must be positive (the direction carries the sign)
/// - PERCENTAGE adjustments may exceed 100, up to [`MAX_ADJUSTMENT_PERCENT`];
///   a decrease is floored at zero
/// - FIXED_AMOUNT adjustments are minor units, at most [`MAX_PRICE`]
pub fn validate_adjustment_value(strategy: BulkStrategy, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "adjustmentValue".to_string(),
        });
    }

    let max = match strategy {
        BulkStrategy::Percentage => MAX_ADJUSTMENT_PERCENT,
        BulkStrategy::FixedAmount => MAX_PRICE,
    };
    if value > max {
        return Err(ValidationError::OutOfRange {
            field: "adjustmentValue".to_string(),
            min: 1,
            max,
        });
    }
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string for the named field.
///
/// ```rust
/// use ventesca_core::validation::validate_uuid;
///
/// assert!(validate_uuid("lineId", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("lineId", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Rejects an id list that names the same id twice.
pub fn validate_distinct(field: &str, ids: &[String]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(ids.len());
    if ids.iter().all(|id| seen.insert(id.as_str())) {
        return Ok(());
    }
    Err(ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "contains duplicate ids".to_string(),
    })
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates the scope selection of a bulk modification.
///
/// CATEGORY scope needs at least one valid category id; INVENTORY ignores them.
pub fn validate_bulk_scope(scope: BulkScope, category_ids: &[String]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if scope == BulkScope::Category {
        if category_ids.is_empty() {
            errors.push(ValidationError::Required {
                field: "categoryIds".to_string(),
            });
        }
        for id in category_ids {
            errors.check(validate_uuid("categoryIds", id));
        }
        errors.check(validate_distinct("categoryIds", category_ids));
    }

    errors
}

/// Validates the targets of a discount against its scope.
pub fn validate_discount_targets(
    scope: DiscountScope,
    product_ids: &[String],
    category_ids: &[String],
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    match scope {
        DiscountScope::Global => {}
        DiscountScope::Category => {
            if category_ids.is_empty() {
                errors.push(ValidationError::Required {
                    field: "categoryIds".to_string(),
                });
            }
            for id in category_ids {
                errors.check(validate_uuid("categoryIds", id));
            }
            errors.check(validate_distinct("categoryIds", category_ids));
        }
        DiscountScope::SingleProduct => {
            if product_ids.is_empty() {
                errors.push(ValidationError::Required {
                    field: "productIds".to_string(),
                });
            }
            for id in product_ids {
                errors.check(validate_uuid("productIds", id));
            }
            errors.check(validate_distinct("productIds", product_ids));
        }
    }

    errors
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert!(validate_code("BEB-001").is_ok());
        assert!(validate_code("7801234567890").is_ok());
        assert!(validate_code("snack_12").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("has space").is_err());
        assert!(validate_code(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Agua mineral 500ml").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price("sellingPrice", 0).is_ok());
        assert!(validate_price("sellingPrice", 1990).is_ok());
        assert_eq!(
            validate_price("cost", -1).unwrap_err().field(),
            "cost"
        );
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-3).is_err());

        assert!(validate_price("sellingPrice", MAX_PRICE).is_ok());
        assert!(matches!(
            validate_price("sellingPrice", MAX_PRICE + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_stock(MAX_STOCK).is_ok());
        assert!(validate_stock(i64::MAX).is_err());
    }

    #[test]
    fn test_validate_line_quantity() {
        assert!(validate_line_quantity(0).is_ok());
        assert!(validate_line_quantity(500).is_ok());
        assert!(validate_line_quantity(-1).is_err());
        assert!(validate_line_quantity(MAX_LINE_QUANTITY).is_ok());
        assert_eq!(
            validate_line_quantity(100_000_000_000_000_000)
                .unwrap_err()
                .field(),
            "quantity"
        );
    }

    #[test]
    fn test_validate_discount_value() {
        assert!(validate_discount_value(DiscountType::Fixed, 500).is_ok());
        assert!(validate_discount_value(DiscountType::Percentage, 100).is_ok());
        assert!(validate_discount_value(DiscountType::Percentage, 101).is_err());
        assert!(validate_discount_value(DiscountType::Fixed, 0).is_err());
        assert!(validate_discount_value(DiscountType::Fixed, MAX_PRICE + 1).is_err());
    }

    #[test]
    fn test_validate_minimum_quantity() {
        assert!(validate_minimum_quantity(1).is_ok());
        assert!(validate_minimum_quantity(0).is_err());
    }

    #[test]
    fn test_validate_adjustment_value() {
        assert!(validate_adjustment_value(BulkStrategy::Percentage, 150).is_ok());
        assert!(validate_adjustment_value(BulkStrategy::FixedAmount, 0).is_err());
        assert!(validate_adjustment_value(BulkStrategy::FixedAmount, -10).is_err());

        assert!(validate_adjustment_value(BulkStrategy::Percentage, MAX_ADJUSTMENT_PERCENT).is_ok());
        assert!(matches!(
            validate_adjustment_value(BulkStrategy::Percentage, 1_000_000_000_000_000_000),
            Err(ValidationError::OutOfRange { max: MAX_ADJUSTMENT_PERCENT, .. })
        ));
        assert!(matches!(
            validate_adjustment_value(BulkStrategy::FixedAmount, i64::MAX),
            Err(ValidationError::OutOfRange { max: MAX_PRICE, .. })
        ));
    }

    #[test]
    fn test_validate_bulk_scope() {
        assert!(validate_bulk_scope(BulkScope::Inventory, &[]).is_empty());
        assert_eq!(validate_bulk_scope(BulkScope::Category, &[]).len(), 1);

        let ids = vec!["550e8400-e29b-41d4-a716-446655440000".to_string()];
        assert!(validate_bulk_scope(BulkScope::Category, &ids).is_empty());

        let bad = vec!["nope".to_string()];
        assert_eq!(validate_bulk_scope(BulkScope::Category, &bad).len(), 1);
    }

    #[test]
    fn test_validate_discount_targets() {
        assert!(validate_discount_targets(DiscountScope::Global, &[], &[]).is_empty());
        assert_eq!(
            validate_discount_targets(DiscountScope::SingleProduct, &[], &[]).errors()[0].field(),
            "productIds"
        );
        assert_eq!(
            validate_discount_targets(DiscountScope::Category, &[], &[]).errors()[0].field(),
            "categoryIds"
        );
    }

    #[test]
    fn test_repeated_ids_are_rejected() {
        let id = "550e8400-e29b-41d4-a716-446655440000".to_string();
        let twice = vec![id.clone(), id.clone()];

        let errors = validate_discount_targets(DiscountScope::SingleProduct, &twice, &[]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field(), "productIds");

        let errors = validate_discount_targets(DiscountScope::Category, &[], &twice);
        assert_eq!(errors.errors()[0].field(), "categoryIds");

        assert_eq!(validate_bulk_scope(BulkScope::Category, &twice).len(), 1);
        assert!(validate_distinct("productIds", &[id]).is_ok());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("id", "550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("id", "").is_err());
        assert!(validate_uuid("id", "123").is_err());
    }
}
