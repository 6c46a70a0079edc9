use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::RevenueError;
use crate::types::{round_money, Money, Percent};
use crate::RevenueResult;

/// One salesperson's agreed share of a conversion's commission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadSplit {
    pub salesperson_id: String,
    pub share_percent: Percent,
}

/// One allocated line of a split commission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitAmount {
    pub salesperson_id: String,
    pub share_percent: Percent,
    pub amount: Money,
}

/// Validate a split set: shares strictly positive, salespeople unique,
/// and the shares summing to exactly 100. A near-miss sum is a validation
/// failure, never silently renormalized.
pub fn validate_splits(splits: &[LeadSplit]) -> RevenueResult<()> {
    if splits.is_empty() {
        return Err(RevenueError::InvalidInput {
            field: "splits".into(),
            reason: "Split set must contain at least one salesperson".into(),
        });
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for split in splits {
        if split.salesperson_id.trim().is_empty() {
            return Err(RevenueError::InvalidInput {
                field: "splits.salesperson_id".into(),
                reason: "Split salesperson identifier must not be empty".into(),
            });
        }
        if !seen.insert(split.salesperson_id.as_str()) {
            return Err(RevenueError::InvalidInput {
                field: "splits.salesperson_id".into(),
                reason: format!(
                    "Salesperson '{}' appears more than once in the split set",
                    split.salesperson_id
                ),
            });
        }
        if split.share_percent <= Decimal::ZERO {
            return Err(RevenueError::InvalidInput {
                field: "splits.share_percent".into(),
                reason: "Split shares must be greater than zero".into(),
            });
        }
    }
    let total: Decimal = splits.iter().map(|s| s.share_percent).sum();
    if total != Decimal::ONE_HUNDRED {
        return Err(RevenueError::InvalidInput {
            field: "splits.share_percent".into(),
            reason: format!("Split shares must sum to exactly 100, got {total}"),
        });
    }
    Ok(())
}

/// Distribute `amount` across the splits, cent-exact.
///
/// Each line is rounded to the cent individually; the rounding remainder
/// (positive or negative) lands on the largest share so the lines always sum
/// to the rounded single-payee amount. Equal largest shares break the tie
/// toward the lowest salesperson identifier.
pub fn distribute(amount: Money, splits: &[LeadSplit]) -> RevenueResult<Vec<SplitAmount>> {
    validate_splits(splits)?;
    if amount < Decimal::ZERO {
        return Err(RevenueError::InvalidInput {
            field: "amount".into(),
            reason: "Cannot distribute a negative commission amount".into(),
        });
    }

    let total = round_money(amount);
    let mut lines: Vec<SplitAmount> = splits
        .iter()
        .map(|split| SplitAmount {
            salesperson_id: split.salesperson_id.clone(),
            share_percent: split.share_percent,
            amount: round_money(amount * split.share_percent / Decimal::ONE_HUNDRED),
        })
        .collect();

    let allocated: Decimal = lines.iter().map(|l| l.amount).sum();
    let remainder = total - allocated;
    if !remainder.is_zero() {
        // Largest share absorbs the remainder; ties go to the lowest id.
        let target = lines
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                a.share_percent
                    .cmp(&b.share_percent)
                    .then_with(|| b.salesperson_id.cmp(&a.salesperson_id))
            })
            .map(|(i, _)| i);
        if let Some(i) = target {
            lines[i].amount += remainder;
        }
    }

    Ok(lines)
}
