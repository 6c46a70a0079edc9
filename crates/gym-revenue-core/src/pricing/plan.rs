use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RevenueError;
use crate::types::Money;
use crate::RevenueResult;

/// How often a plan bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingInterval {
    /// Calendar months covered by one billing cycle.
    pub const fn months(&self) -> u32 {
        match self {
            BillingInterval::Monthly => 1,
            BillingInterval::Quarterly => 3,
            BillingInterval::Yearly => 12,
        }
    }
}

/// A membership plan as configured by organization staff.
///
/// Immutable once referenced by an active subscription; the engine treats
/// plans as values and never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipPlan {
    pub id: String,
    pub name: String,
    pub base_price: Money,
    /// One-time fee charged on the first invoice. Defaults to zero.
    #[serde(default)]
    pub signup_fee: Money,
    pub billing_interval: BillingInterval,
    /// Optional per-cycle facility maintenance fee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_fee: Option<Money>,
}

impl MembershipPlan {
    pub fn validate(&self) -> RevenueResult<()> {
        if self.id.trim().is_empty() {
            return Err(RevenueError::InvalidInput {
                field: "plan.id".into(),
                reason: "Plan identifier must not be empty".into(),
            });
        }
        if self.base_price < Decimal::ZERO {
            return Err(RevenueError::InvalidInput {
                field: "plan.base_price".into(),
                reason: "Base price cannot be negative".into(),
            });
        }
        if self.signup_fee < Decimal::ZERO {
            return Err(RevenueError::InvalidInput {
                field: "plan.signup_fee".into(),
                reason: "Signup fee cannot be negative".into(),
            });
        }
        if let Some(fee) = self.maintenance_fee {
            if fee < Decimal::ZERO {
                return Err(RevenueError::InvalidInput {
                    field: "plan.maintenance_fee".into(),
                    reason: "Maintenance fee cannot be negative".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn monthly_plan(base: Money) -> MembershipPlan {
        MembershipPlan {
            id: "plan-standard".into(),
            name: "Standard".into(),
            base_price: base,
            signup_fee: Decimal::ZERO,
            billing_interval: BillingInterval::Monthly,
            maintenance_fee: None,
        }
    }

    #[test]
    fn test_valid_plan() {
        assert!(monthly_plan(dec!(49.99)).validate().is_ok());
    }

    #[test]
    fn test_negative_base_price_rejected() {
        let plan = monthly_plan(dec!(-1));
        match plan.validate().unwrap_err() {
            RevenueError::InvalidInput { field, .. } => assert_eq!(field, "plan.base_price"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }

    #[test]
    fn test_negative_fees_rejected() {
        let mut plan = monthly_plan(dec!(50));
        plan.signup_fee = dec!(-10);
        assert!(plan.validate().is_err());

        let mut plan = monthly_plan(dec!(50));
        plan.maintenance_fee = Some(dec!(-5));
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_interval_months() {
        assert_eq!(BillingInterval::Monthly.months(), 1);
        assert_eq!(BillingInterval::Quarterly.months(), 3);
        assert_eq!(BillingInterval::Yearly.months(), 12);
    }
}
