use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::pricing::plan::MembershipPlan;
use crate::pricing::promotion::{DiscountType, Promotion};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::RevenueResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Input for resolving a plan selection against an optional promotion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountInput {
    pub plan: MembershipPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<Promotion>,
    /// Evaluation date for promotion validity windows
    pub as_of: NaiveDate,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Resolved pricing for one plan selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountOutput {
    /// Pre-discount plan price
    pub base_price: Money,
    /// Post-discount price for the current cycle (full precision)
    pub final_price: Money,
    /// Amount taken off the current cycle
    pub discount_amount: Money,
    /// Human-readable discount descriptor, e.g. "20% OFF"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_label: Option<String>,
    /// Fully waived billing cycles following the current one (FreeMonths only)
    pub applies_next_n_cycles: u32,
    /// Whether a promotion survived the applicability gate
    pub promotion_applied: bool,
    /// One-time signup fee from the plan
    pub signup_fee: Money,
    /// Final price plus signup fee: what the first invoice totals
    pub first_cycle_total: Money,
    /// Final price plus maintenance fee, when the plan carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurring_cycle_total: Option<Money>,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Resolve the final charge for a plan selection.
///
/// A promotion that fails the applicability gate (inactive, wrong plan,
/// outside its validity window, usage cap exhausted) is treated as no
/// promotion; the reason is reported as a warning rather than an error so
/// selection screens can explain why a code did nothing.
pub fn resolve_discount(input: &DiscountInput) -> RevenueResult<ComputationOutput<DiscountOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // --- Validation ---
    input.plan.validate()?;
    if let Some(promo) = &input.promotion {
        promo.validate()?;
    }

    // --- Applicability gate, re-checked per plan ---
    let active_promo = match &input.promotion {
        Some(promo) => match promo.applies_to(&input.plan.id, input.as_of) {
            Ok(()) => Some(promo),
            Err(reason) => {
                warnings.push(format!(
                    "Promotion '{}' not applied to plan '{}': {}",
                    promo.id, input.plan.id, reason
                ));
                None
            }
        },
        None => None,
    };

    let base = input.plan.base_price;
    let (final_price, discount_label, applies_next_n_cycles) = match active_promo {
        None => (base, None, 0),
        Some(promo) => apply_promotion(base, promo),
    };

    let first_cycle_total = final_price + input.plan.signup_fee;
    let recurring_cycle_total = input.plan.maintenance_fee.map(|fee| final_price + fee);

    let output = DiscountOutput {
        base_price: base,
        final_price,
        discount_amount: base - final_price,
        discount_label,
        applies_next_n_cycles,
        promotion_applied: active_promo.is_some(),
        signup_fee: input.plan.signup_fee,
        first_cycle_total,
        recurring_cycle_total,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Membership Discount Resolution",
        &serde_json::json!({
            "plan_id": input.plan.id,
            "base_price": base.to_string(),
            "promotion_id": input.promotion.as_ref().map(|p| p.id.clone()),
            "as_of": input.as_of.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Apply one promotion to a base price.
///
/// FreeMonths is a scheduling effect on future cycles, not a price cut on
/// this one: the current price is unchanged and the waived-cycle count is
/// reported separately. It must never be folded into FixedAmount.
fn apply_promotion(base: Money, promo: &Promotion) -> (Money, Option<String>, u32) {
    match promo.discount_type {
        DiscountType::Percentage => {
            let fraction = promo.discount_value / Decimal::ONE_HUNDRED;
            let price = (base * (Decimal::ONE - fraction)).max(Decimal::ZERO);
            let label = format!("{}% OFF", promo.discount_value.normalize());
            (price, Some(label), 0)
        }
        DiscountType::FixedAmount => {
            let price = (base - promo.discount_value).max(Decimal::ZERO);
            let label = format!("${:.2} OFF", promo.discount_value);
            (price, Some(label), 0)
        }
        DiscountType::FreeMonths => {
            let cycles = promo.discount_value.to_u32().unwrap_or(0);
            let label = if cycles == 1 {
                "1 MONTH FREE".to_string()
            } else {
                format!("{cycles} MONTHS FREE")
            };
            (base, Some(label), cycles)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::plan::BillingInterval;
    use rust_decimal_macros::dec;

    fn plan(base: Money) -> MembershipPlan {
        MembershipPlan {
            id: "plan-standard".into(),
            name: "Standard".into(),
            base_price: base,
            signup_fee: Decimal::ZERO,
            billing_interval: BillingInterval::Monthly,
            maintenance_fee: None,
        }
    }

    fn promo(discount_type: DiscountType, value: Decimal) -> Promotion {
        Promotion {
            id: "promo-1".into(),
            name: "Test Promo".into(),
            discount_type,
            discount_value: value,
            applicable_plans: vec![],
            valid_from: None,
            valid_until: None,
            is_active: true,
            max_uses: None,
            current_uses: 0,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    #[test]
    fn test_no_promotion_passthrough() {
        let input = DiscountInput {
            plan: plan(dec!(100)),
            promotion: None,
            as_of: today(),
        };
        let out = resolve_discount(&input).unwrap().result;
        assert_eq!(out.final_price, dec!(100));
        assert_eq!(out.discount_amount, dec!(0));
        assert!(out.discount_label.is_none());
        assert!(!out.promotion_applied);
    }

    #[test]
    fn test_percentage_discount() {
        // basePrice=100.00, 20% => finalPrice=80.00, label "20% OFF"
        let input = DiscountInput {
            plan: plan(dec!(100.00)),
            promotion: Some(promo(DiscountType::Percentage, dec!(20))),
            as_of: today(),
        };
        let out = resolve_discount(&input).unwrap().result;
        assert_eq!(out.final_price, dec!(80.00));
        assert_eq!(out.discount_label.as_deref(), Some("20% OFF"));
        assert_eq!(out.applies_next_n_cycles, 0);
    }

    #[test]
    fn test_fixed_amount_discount() {
        let input = DiscountInput {
            plan: plan(dec!(100.00)),
            promotion: Some(promo(DiscountType::FixedAmount, dec!(30))),
            as_of: today(),
        };
        let out = resolve_discount(&input).unwrap().result;
        assert_eq!(out.final_price, dec!(70.00));
    }

    #[test]
    fn test_fixed_amount_clamps_at_zero() {
        let input = DiscountInput {
            plan: plan(dec!(25.00)),
            promotion: Some(promo(DiscountType::FixedAmount, dec!(40))),
            as_of: today(),
        };
        let out = resolve_discount(&input).unwrap().result;
        assert_eq!(out.final_price, dec!(0));
    }

    #[test]
    fn test_free_months_leaves_price_unchanged() {
        let input = DiscountInput {
            plan: plan(dec!(50.00)),
            promotion: Some(promo(DiscountType::FreeMonths, dec!(2))),
            as_of: today(),
        };
        let out = resolve_discount(&input).unwrap().result;
        assert_eq!(out.final_price, dec!(50.00));
        assert_eq!(out.applies_next_n_cycles, 2);
        assert_eq!(out.discount_label.as_deref(), Some("2 MONTHS FREE"));
    }

    #[test]
    fn test_single_free_month_label() {
        let input = DiscountInput {
            plan: plan(dec!(50.00)),
            promotion: Some(promo(DiscountType::FreeMonths, dec!(1))),
            as_of: today(),
        };
        let out = resolve_discount(&input).unwrap().result;
        assert_eq!(out.discount_label.as_deref(), Some("1 MONTH FREE"));
    }

    #[test]
    fn test_ineligible_promotion_becomes_warning() {
        let mut p = promo(DiscountType::Percentage, dec!(20));
        p.is_active = false;
        let input = DiscountInput {
            plan: plan(dec!(100)),
            promotion: Some(p),
            as_of: today(),
        };
        let env = resolve_discount(&input).unwrap();
        assert_eq!(env.result.final_price, dec!(100));
        assert!(!env.result.promotion_applied);
        assert_eq!(env.warnings.len(), 1);
        assert!(env.warnings[0].contains("inactive"));
    }

    #[test]
    fn test_fee_rollups() {
        let mut membership = plan(dec!(100));
        membership.signup_fee = dec!(25);
        membership.maintenance_fee = Some(dec!(5));
        let input = DiscountInput {
            plan: membership,
            promotion: Some(promo(DiscountType::Percentage, dec!(50))),
            as_of: today(),
        };
        let out = resolve_discount(&input).unwrap().result;
        assert_eq!(out.final_price, dec!(50));
        assert_eq!(out.first_cycle_total, dec!(75));
        assert_eq!(out.recurring_cycle_total, Some(dec!(55)));
    }

    #[test]
    fn test_fractional_percentage_label() {
        let input = DiscountInput {
            plan: plan(dec!(100)),
            promotion: Some(promo(DiscountType::Percentage, dec!(12.5))),
            as_of: today(),
        };
        let out = resolve_discount(&input).unwrap().result;
        assert_eq!(out.final_price, dec!(87.50));
        assert_eq!(out.discount_label.as_deref(), Some("12.5% OFF"));
    }
}
