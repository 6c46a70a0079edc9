use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RevenueError;
use crate::RevenueResult;

/// Sentinel plan identifier meaning "every plan qualifies".
pub const ALL_PLANS: &str = "all";

/// The shape of a promotional discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscountType {
    /// Percentage off the base price (value on the 0-100 scale)
    Percentage,
    /// Fixed currency amount off the base price
    FixedAmount,
    /// N fully waived billing cycles; the current cycle's price is unchanged
    FreeMonths,
}

/// A promotion as configured by organization staff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: String,
    pub name: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    /// Plans the promotion may be applied to. Empty, or containing the
    /// "all" sentinel, means every plan qualifies.
    #[serde(default)]
    pub applicable_plans: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uses: Option<u32>,
    #[serde(default)]
    pub current_uses: u32,
}

/// Why a promotion failed the applicability gate.
///
/// An ineligible promotion is treated as "no promotion", not an error; the
/// reason is surfaced through the resolver's warnings channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    Inactive,
    PlanNotCovered,
    NotYetValid,
    Expired,
    UsesExhausted,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Ineligibility::Inactive => "promotion is inactive",
            Ineligibility::PlanNotCovered => "plan is not covered by the promotion",
            Ineligibility::NotYetValid => "promotion is not yet valid",
            Ineligibility::Expired => "promotion has expired",
            Ineligibility::UsesExhausted => "promotion usage cap is exhausted",
        };
        f.write_str(reason)
    }
}

impl Promotion {
    pub fn validate(&self) -> RevenueResult<()> {
        if self.id.trim().is_empty() {
            return Err(RevenueError::InvalidInput {
                field: "promotion.id".into(),
                reason: "Promotion identifier must not be empty".into(),
            });
        }
        match self.discount_type {
            DiscountType::Percentage => {
                if self.discount_value < Decimal::ZERO
                    || self.discount_value > Decimal::ONE_HUNDRED
                {
                    return Err(RevenueError::InvalidInput {
                        field: "promotion.discount_value".into(),
                        reason: "Percentage discount must be between 0 and 100".into(),
                    });
                }
            }
            DiscountType::FixedAmount => {
                if self.discount_value < Decimal::ZERO {
                    return Err(RevenueError::InvalidInput {
                        field: "promotion.discount_value".into(),
                        reason: "Fixed discount amount cannot be negative".into(),
                    });
                }
            }
            DiscountType::FreeMonths => {
                let is_positive_whole = self.discount_value > Decimal::ZERO
                    && self.discount_value.fract().is_zero()
                    && self.discount_value.to_u32().is_some();
                if !is_positive_whole {
                    return Err(RevenueError::InvalidInput {
                        field: "promotion.discount_value".into(),
                        reason: "Free months must be a positive whole number of billing periods"
                            .into(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The applicability gate, re-checked per plan.
    ///
    /// One promotion may be offered against several plans in the same
    /// selection screen with different outcomes, so this takes the candidate
    /// plan rather than assuming a single pairing.
    pub fn applies_to(&self, plan_id: &str, as_of: NaiveDate) -> Result<(), Ineligibility> {
        if !self.is_active {
            return Err(Ineligibility::Inactive);
        }
        let covers_plan = self.applicable_plans.is_empty()
            || self.applicable_plans.iter().any(|p| p == ALL_PLANS)
            || self.applicable_plans.iter().any(|p| p == plan_id);
        if !covers_plan {
            return Err(Ineligibility::PlanNotCovered);
        }
        if let Some(from) = self.valid_from {
            if as_of < from {
                return Err(Ineligibility::NotYetValid);
            }
        }
        if let Some(until) = self.valid_until {
            if as_of > until {
                return Err(Ineligibility::Expired);
            }
        }
        if let Some(max) = self.max_uses {
            if self.current_uses >= max {
                return Err(Ineligibility::UsesExhausted);
            }
        }
        Ok(())
    }
}
