use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::commission::allocator::{
    allocate_commission, AllocationInput, AllocationOutput, RevenueAmounts,
};
use crate::commission::rule::{CommissionType, OrgCommissionConfig};
use crate::commission::selector::{select_rule, SelectedRule};
use crate::commission::split::LeadSplit;
use crate::ledger::writer::{build_ledger_entry, LedgerEntry, LedgerInput};
use crate::pricing::discount::{resolve_discount, DiscountInput, DiscountOutput};
use crate::pricing::plan::MembershipPlan;
use crate::pricing::promotion::Promotion;
use crate::types::{with_metadata, ComputationOutput, Currency, Money};
use crate::RevenueResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One conversion event as the dashboard's conversion screen submits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionInput {
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    pub plan: MembershipPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<Promotion>,
    pub commission_config: OrgCommissionConfig,
    pub salesperson_id: String,
    pub commission_type: CommissionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splits: Option<Vec<LeadSplit>>,
    /// 1-based billing cycle; a fresh conversion is cycle 1
    #[serde(default = "first_cycle")]
    pub cycle_index: u32,
    pub as_of: NaiveDate,
    /// Basis figure for rules configured with a custom revenue basis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_basis_amount: Option<Money>,
    #[serde(default)]
    pub currency: Currency,
}

const fn first_cycle() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// The full pipeline result for one conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub discount: DiscountOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_rule: Option<SelectedRule>,
    pub allocation: AllocationOutput,
    pub ledger: LedgerEntry,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the whole engine for one conversion: discount resolution, rule
/// selection, commission allocation, ledger assembly.
///
/// The resolver's final charge and the plan's pre-discount price feed the
/// allocator's revenue bases, so a rule's `revenue_basis` choice picks
/// between them without any caller plumbing.
pub fn process_conversion(
    input: &ConversionInput,
) -> RevenueResult<ComputationOutput<ConversionOutput>> {
    let start = Instant::now();

    let discount_env = resolve_discount(&DiscountInput {
        plan: input.plan.clone(),
        promotion: input.promotion.clone(),
        as_of: input.as_of,
    })?;
    let mut warnings = discount_env.warnings;
    let discount = discount_env.result;

    let selected = select_rule(
        &input.commission_config,
        &input.salesperson_id,
        input.commission_type,
        input.as_of,
    )?;

    let allocation_env = allocate_commission(&AllocationInput {
        rule: selected.clone(),
        amounts: RevenueAmounts {
            base_amount: input.plan.base_price,
            final_charge_amount: discount.final_price,
            custom_amount: input.custom_basis_amount,
        },
        cycle_index: input.cycle_index,
        splits: input.splits.clone(),
    })?;
    warnings.extend(allocation_env.warnings);
    let allocation = allocation_env.result;

    let ledger_env = build_ledger_entry(&LedgerInput {
        transaction_id: input.transaction_id.clone(),
        member_id: input.member_id.clone(),
        plan: input.plan.clone(),
        discount: discount.clone(),
        allocation: allocation.clone(),
        salesperson_id: input.salesperson_id.clone(),
        earned_date: input.as_of,
        currency: input.currency.clone(),
    })?;
    warnings.extend(ledger_env.warnings);

    let output = ConversionOutput {
        discount,
        selected_rule: selected,
        allocation,
        ledger: ledger_env.result,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Conversion Revenue Pipeline",
        &serde_json::json!({
            "transaction_id": input.transaction_id,
            "plan_id": input.plan.id,
            "salesperson_id": input.salesperson_id,
            "commission_type": input.commission_type.to_string(),
            "cycle_index": input.cycle_index,
            "as_of": input.as_of.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commission::allocator::AllocationOutcome;
    use crate::commission::rule::{CommissionRule, RevenueBasis};
    use crate::pricing::plan::BillingInterval;
    use crate::pricing::promotion::DiscountType;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_input() -> ConversionInput {
        ConversionInput {
            transaction_id: "txn-1".into(),
            member_id: None,
            plan: MembershipPlan {
                id: "plan-standard".into(),
                name: "Standard".into(),
                base_price: dec!(100),
                signup_fee: Decimal::ZERO,
                billing_interval: BillingInterval::Monthly,
                maintenance_fee: None,
            },
            promotion: Some(Promotion {
                id: "promo-20".into(),
                name: "Twenty Off".into(),
                discount_type: DiscountType::Percentage,
                discount_value: dec!(20),
                applicable_plans: vec![],
                valid_from: None,
                valid_until: None,
                is_active: true,
                max_uses: None,
                current_uses: 0,
            }),
            commission_config: OrgCommissionConfig {
                default_rules: vec![CommissionRule {
                    id: "org-pct".into(),
                    commission_type: CommissionType::Percentage,
                    commission_value: dec!(10),
                    revenue_basis: RevenueBasis::FinalChargeAmount,
                    min_threshold: None,
                    max_cap: None,
                    duration_months: None,
                    is_active: true,
                    effective_date: None,
                    expiry_date: None,
                }],
                assignments: vec![],
            },
            salesperson_id: "sp-1".into(),
            commission_type: CommissionType::Percentage,
            splits: None,
            cycle_index: 1,
            as_of: day(2026, 6, 1),
            custom_basis_amount: None,
            currency: Currency::USD,
        }
    }

    #[test]
    fn test_end_to_end_single_payee() {
        let out = process_conversion(&base_input()).unwrap().result;
        // 100 - 20% = 80 charged; 10% of 80 = 8 commission
        assert_eq!(out.discount.final_price, dec!(80));
        assert_eq!(out.allocation.amount, dec!(8.00));
        assert_eq!(out.ledger.charge.amount, dec!(80.00));
        assert_eq!(out.ledger.commissions.len(), 1);
        assert_eq!(out.ledger.commissions[0].amount, dec!(8.00));
    }

    #[test]
    fn test_end_to_end_no_rule_zero_commission() {
        let mut input = base_input();
        input.commission_config = OrgCommissionConfig::default();
        let out = process_conversion(&input).unwrap().result;
        assert_eq!(out.allocation.outcome, AllocationOutcome::NoApplicableRule);
        assert!(out.ledger.commissions.is_empty());
        assert!(out.selected_rule.is_none());
    }

    #[test]
    fn test_cycle_default_is_first() {
        let json = serde_json::json!({
            "transaction_id": "txn-2",
            "plan": {
                "id": "p", "name": "P", "base_price": "50",
                "billing_interval": "monthly"
            },
            "commission_config": {},
            "salesperson_id": "sp-1",
            "commission_type": "percentage",
            "as_of": "2026-06-01"
        });
        let input: ConversionInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.cycle_index, 1);
    }
}
