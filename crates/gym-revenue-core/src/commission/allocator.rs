use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::commission::rule::{CommissionType, RevenueBasis};
use crate::commission::selector::SelectedRule;
use crate::commission::split::{distribute, validate_splits, LeadSplit, SplitAmount};
use crate::error::RevenueError;
use crate::types::{round_money, with_metadata, ComputationOutput, Money, Percent};
use crate::RevenueResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// The candidate revenue bases for one transaction. The rule decides which
/// one the commission is computed against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenueAmounts {
    /// The plan's pre-discount price
    pub base_amount: Money,
    /// The discount resolver's final charge
    pub final_charge_amount: Money,
    /// Caller-supplied figure for rules with a custom basis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_amount: Option<Money>,
}

/// Input for one commission allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationInput {
    /// The selector's result. `None` means no rule applies and the
    /// allocation is a distinguished zero, not an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<SelectedRule>,
    pub amounts: RevenueAmounts,
    /// 1-based billing cycle, counted from the conversion's first cycle
    pub cycle_index: u32,
    /// Split agreement for the conversion, when one exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splits: Option<Vec<LeadSplit>>,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Why an allocation produced (or did not produce) an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AllocationOutcome {
    /// Commission earned
    Earned,
    /// Basis fell below the rule's minimum threshold; the sale does not
    /// qualify
    BelowMinThreshold,
    /// The cycle is past the rule's recurring duration window
    DurationExhausted,
    /// No active rule applied; zero commission is the business outcome
    NoApplicableRule,
}

/// Result of one commission allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationOutput {
    /// Final amount, rounded for persistence
    pub amount: Money,
    /// Amount before persistence rounding (after caps)
    pub raw_amount: Money,
    /// The basis the rule was computed against
    pub basis_used: Money,
    pub outcome: AllocationOutcome,
    pub cap_applied: bool,
    /// Echo of the rule's type, for the ledger row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_type: Option<CommissionType>,
    /// Echo of the rule's percentage, when percentage-based
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Percent>,
    /// Per-salesperson lines when a split agreement exists; they sum
    /// exactly to `amount`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splits: Option<Vec<SplitAmount>>,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Compute the commission owed for one transaction cycle.
///
/// Order of application: resolve the revenue basis, truncate by recurring
/// duration, test the minimum threshold, compute percentage or flat amount,
/// cap, round for persistence, then fan out across any split agreement.
pub fn allocate_commission(
    input: &AllocationInput,
) -> RevenueResult<ComputationOutput<AllocationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // --- Validation ---
    if input.amounts.base_amount < Decimal::ZERO {
        return Err(RevenueError::InvalidInput {
            field: "amounts.base_amount".into(),
            reason: "Base amount cannot be negative".into(),
        });
    }
    if input.amounts.final_charge_amount < Decimal::ZERO {
        return Err(RevenueError::InvalidInput {
            field: "amounts.final_charge_amount".into(),
            reason: "Final charge amount cannot be negative".into(),
        });
    }
    if let Some(custom) = input.amounts.custom_amount {
        if custom < Decimal::ZERO {
            return Err(RevenueError::InvalidInput {
                field: "amounts.custom_amount".into(),
                reason: "Custom basis amount cannot be negative".into(),
            });
        }
    }
    if input.cycle_index == 0 {
        return Err(RevenueError::InvalidInput {
            field: "cycle_index".into(),
            reason: "Cycle index is 1-based; 0 is not a valid cycle".into(),
        });
    }
    if let Some(splits) = &input.splits {
        validate_splits(splits)?;
    }

    let output = match &input.rule {
        None => {
            warnings.push("No applicable commission rule; commission is zero".into());
            zero_output(AllocationOutcome::NoApplicableRule, Decimal::ZERO, None, None)
        }
        Some(selected) => {
            let rule = &selected.rule;
            rule.validate()?;

            let basis = match rule.revenue_basis {
                RevenueBasis::BaseAmount => input.amounts.base_amount,
                RevenueBasis::FinalChargeAmount => input.amounts.final_charge_amount,
                RevenueBasis::Custom => {
                    input
                        .amounts
                        .custom_amount
                        .ok_or_else(|| RevenueError::InvalidInput {
                            field: "amounts.custom_amount".into(),
                            reason:
                                "Rule uses a custom revenue basis but no custom amount was supplied"
                                    .into(),
                        })?
                }
            };
            let percentage = match rule.commission_type {
                CommissionType::Percentage => Some(rule.commission_value),
                CommissionType::FlatAmount => None,
            };

            if rule
                .duration_months
                .is_some_and(|duration| input.cycle_index > duration)
            {
                zero_output(
                    AllocationOutcome::DurationExhausted,
                    basis,
                    Some(rule.commission_type),
                    percentage,
                )
            } else if rule.min_threshold.is_some_and(|min| basis < min) {
                zero_output(
                    AllocationOutcome::BelowMinThreshold,
                    basis,
                    Some(rule.commission_type),
                    percentage,
                )
            } else {
                let computed = match rule.commission_type {
                    CommissionType::Percentage => {
                        basis * rule.commission_value / Decimal::ONE_HUNDRED
                    }
                    CommissionType::FlatAmount => rule.commission_value,
                };
                let (raw_amount, cap_applied) = match rule.max_cap {
                    Some(cap) if computed > cap => (cap, true),
                    _ => (computed, false),
                };
                AllocationOutput {
                    amount: round_money(raw_amount),
                    raw_amount,
                    basis_used: basis,
                    outcome: AllocationOutcome::Earned,
                    cap_applied,
                    commission_type: Some(rule.commission_type),
                    percentage,
                    splits: None,
                }
            }
        }
    };

    // --- Split fan-out ---
    let output = match &input.splits {
        Some(splits) => {
            let lines = distribute(output.amount, splits)?;
            AllocationOutput {
                splits: Some(lines),
                ..output
            }
        }
        None => output,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Commission Allocation",
        &serde_json::json!({
            "rule_id": input.rule.as_ref().map(|r| r.rule.id.clone()),
            "cycle_index": input.cycle_index,
            "base_amount": input.amounts.base_amount.to_string(),
            "final_charge_amount": input.amounts.final_charge_amount.to_string(),
            "split_count": input.splits.as_ref().map_or(0, |s| s.len()),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn zero_output(
    outcome: AllocationOutcome,
    basis_used: Money,
    commission_type: Option<CommissionType>,
    percentage: Option<Percent>,
) -> AllocationOutput {
    AllocationOutput {
        amount: Decimal::ZERO,
        raw_amount: Decimal::ZERO,
        basis_used,
        outcome,
        cap_applied: false,
        commission_type,
        percentage,
        splits: None,
    }
}
