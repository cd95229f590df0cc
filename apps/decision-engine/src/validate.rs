//! Structural validation of a built plan document.
//!
//! Runs after every build and before anything is written or simulated.
//! A violation here means the builder itself is broken, so the caller
//! treats it as fatal rather than as a refusal.

use rust_decimal::Decimal;

use crate::models::plan::{OrderSide, PlanAction, PlanDocument};

/// One violated invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolation {
    /// Stable violation code.
    pub code: &'static str,
    /// Human-readable description.
    pub message: String,
    /// Path of the offending field, e.g. `plan.orders[2].quantity_base`.
    pub field_path: String,
}

/// The full set of violations found in one document.
#[derive(Debug, Clone, Default)]
pub struct PlanValidationError {
    /// Every violation, in document order.
    pub violations: Vec<ValidationViolation>,
}

impl std::error::Error for PlanValidationError {}

impl std::fmt::Display for PlanValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "plan document failed validation")?;
        for violation in &self.violations {
            write!(
                f,
                "; {} at {}: {}",
                violation.code, violation.field_path, violation.message
            )?;
        }
        Ok(())
    }
}

struct Checker {
    violations: Vec<ValidationViolation>,
}

impl Checker {
    fn record(&mut self, code: &'static str, field_path: String, message: String) {
        self.violations.push(ValidationViolation {
            code,
            message,
            field_path,
        });
    }
}

/// Validate a plan document against its structural invariants.
///
/// # Errors
///
/// [`PlanValidationError`] listing every violated invariant.
pub fn validate_plan_document(doc: &PlanDocument) -> Result<(), PlanValidationError> {
    let mut checker = Checker { violations: vec![] };

    if doc.schema_version.is_empty() {
        checker.record(
            "EMPTY_SCHEMA_VERSION",
            "schema_version".to_string(),
            "schema_version must be non-empty".to_string(),
        );
    }
    if doc.venue.is_empty() {
        checker.record(
            "EMPTY_VENUE",
            "venue".to_string(),
            "venue must be non-empty".to_string(),
        );
    }
    if doc.portfolio.notional_budget_quote <= Decimal::ZERO {
        checker.record(
            "NON_POSITIVE_BUDGET",
            "portfolio.notional_budget_quote".to_string(),
            format!(
                "budget must be positive, got {}",
                doc.portfolio.notional_budget_quote
            ),
        );
    }

    // The action and the order list must agree in both directions.
    match doc.plan.action {
        PlanAction::Rebalance if doc.plan.orders.is_empty() => {
            checker.record(
                "ACTION_ORDERS_MISMATCH",
                "plan.action".to_string(),
                "action is rebalance but the order list is empty".to_string(),
            );
        }
        PlanAction::NoAction if !doc.plan.orders.is_empty() => {
            checker.record(
                "ACTION_ORDERS_MISMATCH",
                "plan.action".to_string(),
                format!(
                    "action is no_action but {} orders are present",
                    doc.plan.orders.len()
                ),
            );
        }
        _ => {}
    }

    for (i, order) in doc.plan.orders.iter().enumerate() {
        let path = |field: &str| format!("plan.orders[{i}].{field}");

        if order.side != OrderSide::Buy {
            checker.record(
                "UNSUPPORTED_SIDE",
                path("side"),
                format!("{}: only BUY orders are emitted", order.symbol),
            );
        }
        if order.notional_quote <= Decimal::ZERO {
            checker.record(
                "NON_POSITIVE_NOTIONAL",
                path("notional_quote"),
                format!("{}: notional_quote={}", order.symbol, order.notional_quote),
            );
        }
        if order.price_used <= Decimal::ZERO {
            checker.record(
                "NON_POSITIVE_PRICE",
                path("price_used"),
                format!("{}: price_used={}", order.symbol, order.price_used),
            );
        }
        if order.quantity_base <= Decimal::ZERO {
            checker.record(
                "NON_POSITIVE_QUANTITY",
                path("quantity_base"),
                format!("{}: quantity_base={}", order.symbol, order.quantity_base),
            );
        }
        if order.step_size_used <= Decimal::ZERO {
            checker.record(
                "NON_POSITIVE_STEP",
                path("step_size_used"),
                format!("{}: step_size_used={}", order.symbol, order.step_size_used),
            );
        } else if order.quantity_base % order.step_size_used != Decimal::ZERO {
            checker.record(
                "QUANTITY_OFF_GRID",
                path("quantity_base"),
                format!(
                    "{}: quantity_base={} is not a multiple of step_size={}",
                    order.symbol, order.quantity_base, order.step_size_used
                ),
            );
        }
        if order.quantity_base < order.min_qty_used {
            checker.record(
                "BELOW_MIN_QTY",
                path("quantity_base"),
                format!(
                    "{}: quantity_base={} < min_qty={}",
                    order.symbol, order.quantity_base, order.min_qty_used
                ),
            );
        }
        if order.min_notional_used > Decimal::ZERO
            && order.quantity_base * order.price_used < order.min_notional_used
        {
            checker.record(
                "BELOW_MIN_NOTIONAL",
                path("quantity_base"),
                format!(
                    "{}: effective notional {} < min_notional={}",
                    order.symbol,
                    order.quantity_base * order.price_used,
                    order.min_notional_used
                ),
            );
        }
    }

    for (i, refusal) in doc.refusals.iter().enumerate() {
        if refusal.message.is_empty() {
            checker.record(
                "EMPTY_REFUSAL_MESSAGE",
                format!("refusals[{i}].message"),
                format!("refusal {} has no message", refusal.code),
            );
        }
    }

    if checker.violations.is_empty() {
        Ok(())
    } else {
        tracing::error!(
            violations = checker.violations.len(),
            "plan document failed validation"
        );
        Err(PlanValidationError {
            violations: checker.violations,
        })
    }
}
