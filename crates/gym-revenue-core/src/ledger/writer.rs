use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::commission::allocator::{AllocationOutcome, AllocationOutput};
use crate::error::RevenueError;
use crate::ledger::record::{CommissionRecord, CommissionStatus};
use crate::pricing::discount::DiscountOutput;
use crate::pricing::plan::MembershipPlan;
use crate::types::{round_money, with_metadata, ComputationOutput, Currency, Money};
use crate::RevenueResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Everything needed to assemble one conversion's auditable records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerInput {
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    pub plan: MembershipPlan,
    pub discount: DiscountOutput,
    pub allocation: AllocationOutput,
    /// Payee when the allocation has no split agreement
    pub salesperson_id: String,
    pub earned_date: NaiveDate,
    #[serde(default)]
    pub currency: Currency,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// The final charge as it will be invoiced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeLineItem {
    pub description: String,
    /// Post-discount charge, rounded for persistence
    pub amount: Money,
    pub base_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_label: Option<String>,
    pub currency: Currency,
}

/// One conversion's charge plus its commission rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    pub charge: ChargeLineItem,
    /// Pending commission records, one per payee. Empty when the allocation
    /// earned nothing.
    pub commissions: Vec<CommissionRecord>,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Assemble the charge line and commission rows for one conversion.
///
/// Records are born `pending`; every later mutation goes through the status
/// state machine on [`CommissionRecord`]. Zero-outcome allocations
/// (no rule, below threshold, duration exhausted) produce no rows at all.
pub fn build_ledger_entry(input: &LedgerInput) -> RevenueResult<ComputationOutput<LedgerEntry>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.transaction_id.trim().is_empty() {
        return Err(RevenueError::InvalidInput {
            field: "transaction_id".into(),
            reason: "Transaction identifier must not be empty".into(),
        });
    }
    if input.salesperson_id.trim().is_empty() {
        return Err(RevenueError::InvalidInput {
            field: "salesperson_id".into(),
            reason: "Salesperson identifier must not be empty".into(),
        });
    }

    let charge = ChargeLineItem {
        description: input.plan.name.clone(),
        amount: round_money(input.discount.final_price),
        base_amount: round_money(input.discount.base_price),
        discount_label: input.discount.discount_label.clone(),
        currency: input.currency.clone(),
    };

    let commissions = build_commission_rows(input, &mut warnings);

    let entry = LedgerEntry {
        transaction_id: input.transaction_id.clone(),
        member_id: input.member_id.clone(),
        charge,
        commissions,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Transaction Ledger Assembly",
        &serde_json::json!({
            "transaction_id": input.transaction_id,
            "plan_id": input.plan.id,
            "allocation_outcome": serde_json::to_value(input.allocation.outcome)
                .unwrap_or_default(),
            "earned_date": input.earned_date.to_string(),
        }),
        warnings,
        elapsed,
        entry,
    ))
}

fn build_commission_rows(input: &LedgerInput, warnings: &mut Vec<String>) -> Vec<CommissionRecord> {
    let allocation = &input.allocation;

    if allocation.outcome != AllocationOutcome::Earned {
        warnings.push(format!(
            "No commission rows written for transaction '{}': allocation outcome was not earned",
            input.transaction_id
        ));
        return Vec::new();
    }
    // An earned allocation always carries its rule's type
    let Some(commission_type) = allocation.commission_type else {
        return Vec::new();
    };

    let base_amount = round_money(allocation.basis_used);
    let new_record = |salesperson_id: &str, amount: Money| CommissionRecord {
        // Deterministic row id: the engine is pure and leaves surrogate
        // keys to the record store
        id: format!("{}:{}", input.transaction_id, salesperson_id),
        salesperson_id: salesperson_id.to_string(),
        commission_type,
        amount,
        base_amount,
        percentage: allocation.percentage,
        status: CommissionStatus::Pending,
        earned_date: input.earned_date,
        paid_date: None,
        dispute_reason: None,
    };

    match &allocation.splits {
        Some(lines) => lines
            .iter()
            .map(|line| new_record(&line.salesperson_id, line.amount))
            .collect(),
        None => vec![new_record(&input.salesperson_id, allocation.amount)],
    }
}
