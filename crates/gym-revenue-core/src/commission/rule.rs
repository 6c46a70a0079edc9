use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RevenueError;
use crate::types::Money;
use crate::RevenueResult;

/// How a commission amount is computed from its revenue basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommissionType {
    Percentage,
    FlatAmount,
}

impl fmt::Display for CommissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommissionType::Percentage => f.write_str("percentage"),
            CommissionType::FlatAmount => f.write_str("flatAmount"),
        }
    }
}

/// Which amount a commission is computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RevenueBasis {
    /// The plan's pre-discount price
    BaseAmount,
    /// The discount resolver's output
    FinalChargeAmount,
    /// A caller-supplied figure, e.g. a specific line item
    Custom,
}

/// An organization-level commission rule.
///
/// The same shape doubles as the rule payload of a per-salesperson
/// assignment; only the precedence differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionRule {
    pub id: String,
    pub commission_type: CommissionType,
    pub commission_value: Decimal,
    pub revenue_basis: RevenueBasis,
    /// Sales below this basis amount earn no commission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_threshold: Option<Money>,
    /// Hard ceiling on a single commission amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cap: Option<Money>,
    /// Recurring commissions stop after this many billing cycles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_months: Option<u32>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

impl CommissionRule {
    pub fn validate(&self) -> RevenueResult<()> {
        if self.commission_value < Decimal::ZERO {
            return Err(RevenueError::InvalidInput {
                field: "rule.commission_value".into(),
                reason: "Commission value cannot be negative".into(),
            });
        }
        if let Some(min) = self.min_threshold {
            if min < Decimal::ZERO {
                return Err(RevenueError::InvalidInput {
                    field: "rule.min_threshold".into(),
                    reason: "Minimum threshold cannot be negative".into(),
                });
            }
        }
        if let Some(cap) = self.max_cap {
            if cap < Decimal::ZERO {
                return Err(RevenueError::InvalidInput {
                    field: "rule.max_cap".into(),
                    reason: "Maximum cap cannot be negative".into(),
                });
            }
        }
        if self.duration_months == Some(0) {
            return Err(RevenueError::InvalidInput {
                field: "rule.duration_months".into(),
                reason: "Recurring duration must cover at least one billing cycle".into(),
            });
        }
        Ok(())
    }

    /// Whether the rule is live at `as_of`: active flag set and
    /// `[effective_date, expiry_date]` contains the date (both bounds
    /// inclusive, both optional).
    pub fn is_effective(&self, as_of: NaiveDate) -> bool {
        self.is_active
            && self.effective_date.is_none_or(|d| d <= as_of)
            && self.expiry_date.is_none_or(|d| as_of <= d)
    }
}

/// A per-salesperson override of the organization default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalespersonAssignment {
    pub salesperson_id: String,
    pub rule: CommissionRule,
}

/// An organization's commission configuration as loaded from the record
/// store: its default rules plus any per-salesperson assignments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrgCommissionConfig {
    #[serde(default)]
    pub default_rules: Vec<CommissionRule>,
    #[serde(default)]
    pub assignments: Vec<SalespersonAssignment>,
}
