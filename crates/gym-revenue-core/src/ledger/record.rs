use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::commission::rule::CommissionType;
use crate::error::RevenueError;
use crate::types::{round_money, Money, Percent};
use crate::RevenueResult;

/// Lifecycle status of a commission record.
///
/// `pending -> approved -> paid`, with `disputed` and `cancelled` side
/// branches from the two non-terminal states. `paid` and `cancelled` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    Pending,
    Approved,
    Paid,
    Disputed,
    Cancelled,
}

impl CommissionStatus {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, CommissionStatus::Paid | CommissionStatus::Cancelled)
    }

    /// The transition table. Anything not listed here is rejected.
    pub const fn can_transition(from: CommissionStatus, to: CommissionStatus) -> bool {
        use CommissionStatus::*;
        matches!(
            (from, to),
            (Pending, Approved)
                | (Approved, Paid)
                | (Pending, Disputed)
                | (Approved, Disputed)
                | (Pending, Cancelled)
                | (Approved, Cancelled)
                | (Disputed, Pending)
                | (Disputed, Cancelled)
        )
    }
}

impl fmt::Display for CommissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommissionStatus::Pending => "pending",
            CommissionStatus::Approved => "approved",
            CommissionStatus::Paid => "paid",
            CommissionStatus::Disputed => "disputed",
            CommissionStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A persisted commission obligation.
///
/// The serialized field names (`commission_type`, `amount`, `base_amount`,
/// `percentage`, `status`, `earned_date`, `paid_date`) are the stable
/// contract consumed by payroll and reporting; internal changes must keep
/// them intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionRecord {
    pub id: String,
    pub salesperson_id: String,
    pub commission_type: CommissionType,
    pub amount: Money,
    pub base_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Percent>,
    pub status: CommissionStatus,
    pub earned_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispute_reason: Option<String>,
}

impl CommissionRecord {
    /// Optimistic concurrency check: every transition takes the status the
    /// caller last saw and fails if the record has moved since.
    fn check_expected(&self, expected: CommissionStatus) -> RevenueResult<()> {
        if self.status != expected {
            return Err(RevenueError::StaleState {
                expected: expected.to_string(),
                actual: self.status.to_string(),
            });
        }
        Ok(())
    }

    fn transition(&mut self, expected: CommissionStatus, to: CommissionStatus) -> RevenueResult<()> {
        self.check_expected(expected)?;
        if !CommissionStatus::can_transition(self.status, to) {
            return Err(RevenueError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        Ok(())
    }

    /// `pending -> approved`. A lingering dispute reason blocks approval.
    pub fn approve(&mut self, expected: CommissionStatus) -> RevenueResult<()> {
        if self.dispute_reason.is_some() {
            return Err(RevenueError::InvalidTransition {
                from: self.status.to_string(),
                to: CommissionStatus::Approved.to_string(),
            });
        }
        self.transition(expected, CommissionStatus::Approved)
    }

    /// `approved -> paid`. Stamps `paid_date` and freezes the amount; the
    /// engine is pure, so the payment date comes from the caller.
    pub fn mark_paid(
        &mut self,
        expected: CommissionStatus,
        paid_date: NaiveDate,
    ) -> RevenueResult<()> {
        self.transition(expected, CommissionStatus::Paid)?;
        self.paid_date = Some(paid_date);
        Ok(())
    }

    /// `pending|approved -> disputed`. Requires a reason.
    pub fn dispute(&mut self, expected: CommissionStatus, reason: &str) -> RevenueResult<()> {
        if reason.trim().is_empty() {
            return Err(RevenueError::InvalidInput {
                field: "reason".into(),
                reason: "A dispute requires a reason".into(),
            });
        }
        self.transition(expected, CommissionStatus::Disputed)?;
        self.dispute_reason = Some(reason.trim().to_string());
        Ok(())
    }

    /// Resolve a dispute back to `pending` or forward to `cancelled`.
    pub fn resolve_dispute(
        &mut self,
        expected: CommissionStatus,
        resolution: CommissionStatus,
    ) -> RevenueResult<()> {
        if !matches!(
            resolution,
            CommissionStatus::Pending | CommissionStatus::Cancelled
        ) {
            return Err(RevenueError::InvalidTransition {
                from: CommissionStatus::Disputed.to_string(),
                to: resolution.to_string(),
            });
        }
        self.transition(expected, resolution)?;
        self.dispute_reason = None;
        Ok(())
    }

    /// `pending|approved -> cancelled`.
    pub fn cancel(&mut self, expected: CommissionStatus) -> RevenueResult<()> {
        self.transition(expected, CommissionStatus::Cancelled)
    }

    /// Replace the computed figures from a fresh allocation run.
    ///
    /// Paid records are frozen: rule changes never retroactively mutate
    /// them, and a re-run against one is an error, not a no-op.
    pub fn apply_allocation(
        &mut self,
        amount: Money,
        base_amount: Money,
        percentage: Option<Percent>,
    ) -> RevenueResult<()> {
        if self.status == CommissionStatus::Paid {
            return Err(RevenueError::ImmutableRecord {
                record_id: self.id.clone(),
            });
        }
        self.amount = round_money(amount);
        self.base_amount = round_money(base_amount);
        self.percentage = percentage;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record() -> CommissionRecord {
        CommissionRecord {
            id: "rec-1".into(),
            salesperson_id: "sp-1".into(),
            commission_type: CommissionType::Percentage,
            amount: dec!(50.00),
            base_amount: dec!(500.00),
            percentage: Some(dec!(10)),
            status: CommissionStatus::Pending,
            earned_date: day(2026, 6, 1),
            paid_date: None,
            dispute_reason: None,
        }
    }

    #[test]
    fn test_happy_path_to_paid() {
        let mut rec = record();
        rec.approve(CommissionStatus::Pending).unwrap();
        assert_eq!(rec.status, CommissionStatus::Approved);
        rec.mark_paid(CommissionStatus::Approved, day(2026, 7, 1))
            .unwrap();
        assert_eq!(rec.status, CommissionStatus::Paid);
        assert_eq!(rec.paid_date, Some(day(2026, 7, 1)));
    }

    #[test]
    fn test_stale_expected_status() {
        let mut rec = record();
        rec.approve(CommissionStatus::Pending).unwrap();
        // Second approver still sees "pending"
        let err = rec.approve(CommissionStatus::Pending).unwrap_err();
        match err {
            RevenueError::StaleState { expected, actual } => {
                assert_eq!(expected, "pending");
                assert_eq!(actual, "approved");
            }
            other => panic!("Expected StaleState, got: {other:?}"),
        }
    }

    #[test]
    fn test_paid_is_terminal() {
        let mut rec = record();
        rec.approve(CommissionStatus::Pending).unwrap();
        rec.mark_paid(CommissionStatus::Approved, day(2026, 7, 1))
            .unwrap();
        assert!(rec.cancel(CommissionStatus::Paid).is_err());
        assert!(rec.dispute(CommissionStatus::Paid, "late").is_err());
        assert!(rec.approve(CommissionStatus::Paid).is_err());
    }

    #[test]
    fn test_pending_cannot_jump_to_paid() {
        let mut rec = record();
        let err = rec
            .mark_paid(CommissionStatus::Pending, day(2026, 7, 1))
            .unwrap_err();
        assert!(matches!(err, RevenueError::InvalidTransition { .. }));
        assert!(rec.paid_date.is_none());
    }

    #[test]
    fn test_dispute_requires_reason() {
        let mut rec = record();
        assert!(rec.dispute(CommissionStatus::Pending, "  ").is_err());
        assert!(rec
            .dispute(CommissionStatus::Pending, "amount looks wrong")
            .is_ok());
        assert_eq!(rec.status, CommissionStatus::Disputed);
        assert_eq!(rec.dispute_reason.as_deref(), Some("amount looks wrong"));
    }

    #[test]
    fn test_dispute_resolution_roundtrip() {
        let mut rec = record();
        rec.dispute(CommissionStatus::Pending, "check the split")
            .unwrap();
        rec.resolve_dispute(CommissionStatus::Disputed, CommissionStatus::Pending)
            .unwrap();
        assert_eq!(rec.status, CommissionStatus::Pending);
        assert!(rec.dispute_reason.is_none());
        // Approval works again once the dispute is cleared
        rec.approve(CommissionStatus::Pending).unwrap();
    }

    #[test]
    fn test_dispute_resolution_to_cancelled() {
        let mut rec = record();
        rec.dispute(CommissionStatus::Pending, "duplicate entry")
            .unwrap();
        rec.resolve_dispute(CommissionStatus::Disputed, CommissionStatus::Cancelled)
            .unwrap();
        assert_eq!(rec.status, CommissionStatus::Cancelled);
    }

    #[test]
    fn test_dispute_cannot_resolve_to_paid() {
        let mut rec = record();
        rec.dispute(CommissionStatus::Pending, "hold").unwrap();
        let err = rec
            .resolve_dispute(CommissionStatus::Disputed, CommissionStatus::Paid)
            .unwrap_err();
        assert!(matches!(err, RevenueError::InvalidTransition { .. }));
    }

    #[test]
    fn test_paid_record_rejects_reallocation() {
        let mut rec = record();
        rec.approve(CommissionStatus::Pending).unwrap();
        rec.mark_paid(CommissionStatus::Approved, day(2026, 7, 1))
            .unwrap();
        let err = rec
            .apply_allocation(dec!(99), dec!(990), Some(dec!(10)))
            .unwrap_err();
        match err {
            RevenueError::ImmutableRecord { record_id } => assert_eq!(record_id, "rec-1"),
            other => panic!("Expected ImmutableRecord, got: {other:?}"),
        }
        assert_eq!(rec.amount, dec!(50.00));
    }

    #[test]
    fn test_pending_record_accepts_reallocation() {
        let mut rec = record();
        rec.apply_allocation(dec!(75.005), dec!(750), Some(dec!(10)))
            .unwrap();
        assert_eq!(rec.amount, dec!(75.01));
        assert_eq!(rec.base_amount, dec!(750.00));
    }

    #[test]
    fn test_terminal_flags() {
        assert!(CommissionStatus::Paid.is_terminal());
        assert!(CommissionStatus::Cancelled.is_terminal());
        assert!(!CommissionStatus::Pending.is_terminal());
        assert!(!CommissionStatus::Approved.is_terminal());
        assert!(!CommissionStatus::Disputed.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&CommissionStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
    }
}
