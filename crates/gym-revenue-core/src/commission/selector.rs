use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::commission::rule::{
    CommissionRule, CommissionType, OrgCommissionConfig, SalespersonAssignment,
};
use crate::error::RevenueError;
use crate::RevenueResult;

/// Where a selected rule came from, for audit trails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleSource {
    SalespersonAssignment,
    OrgDefault,
}

/// The winning rule plus its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedRule {
    pub rule: CommissionRule,
    pub source: RuleSource,
}

/// Serializable request form of [`select_rule`], used by the CLI and
/// bindings surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionInput {
    pub config: OrgCommissionConfig,
    pub salesperson_id: String,
    pub commission_type: CommissionType,
    pub as_of: NaiveDate,
}

/// Select the commission rule applicable to one transaction.
///
/// Precedence: an active per-salesperson assignment matching the commission
/// type and containing `as_of` in its effective window wins over the
/// organization default for that type. No applicable rule is a valid
/// business outcome (zero commission), returned as `None`.
///
/// More than one simultaneous match at either level is a configuration
/// error the caller must surface and resolve manually; the selector never
/// guesses between them.
pub fn select_rule(
    config: &OrgCommissionConfig,
    salesperson_id: &str,
    commission_type: CommissionType,
    as_of: NaiveDate,
) -> RevenueResult<Option<SelectedRule>> {
    let assignment_matches: Vec<&SalespersonAssignment> = config
        .assignments
        .iter()
        .filter(|a| {
            a.salesperson_id == salesperson_id
                && a.rule.commission_type == commission_type
                && a.rule.is_effective(as_of)
        })
        .collect();

    match assignment_matches.as_slice() {
        [winner] => {
            return Ok(Some(SelectedRule {
                rule: winner.rule.clone(),
                source: RuleSource::SalespersonAssignment,
            }));
        }
        [] => {}
        many => {
            return Err(RevenueError::AmbiguousRule {
                salesperson_id: salesperson_id.to_string(),
                commission_type: commission_type.to_string(),
                matching: many.len(),
            });
        }
    }

    let default_matches: Vec<&CommissionRule> = config
        .default_rules
        .iter()
        .filter(|r| r.commission_type == commission_type && r.is_effective(as_of))
        .collect();

    match default_matches.as_slice() {
        [winner] => Ok(Some(SelectedRule {
            rule: (*winner).clone(),
            source: RuleSource::OrgDefault,
        })),
        [] => Ok(None),
        many => Err(RevenueError::AmbiguousRule {
            salesperson_id: salesperson_id.to_string(),
            commission_type: commission_type.to_string(),
            matching: many.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commission::rule::RevenueBasis;
    use rust_decimal_macros::dec;

    fn rule(id: &str, commission_type: CommissionType) -> CommissionRule {
        CommissionRule {
            id: id.into(),
            commission_type,
            commission_value: dec!(10),
            revenue_basis: RevenueBasis::FinalChargeAmount,
            min_threshold: None,
            max_cap: None,
            duration_months: None,
            is_active: true,
            effective_date: None,
            expiry_date: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_assignment_beats_default() {
        let config = OrgCommissionConfig {
            default_rules: vec![rule("org-pct", CommissionType::Percentage)],
            assignments: vec![SalespersonAssignment {
                salesperson_id: "sp-1".into(),
                rule: rule("sp1-pct", CommissionType::Percentage),
            }],
        };
        let selected = select_rule(&config, "sp-1", CommissionType::Percentage, day(2026, 6, 1))
            .unwrap()
            .unwrap();
        assert_eq!(selected.rule.id, "sp1-pct");
        assert_eq!(selected.source, RuleSource::SalespersonAssignment);
    }

    #[test]
    fn test_falls_back_to_org_default() {
        let config = OrgCommissionConfig {
            default_rules: vec![rule("org-pct", CommissionType::Percentage)],
            assignments: vec![SalespersonAssignment {
                salesperson_id: "sp-2".into(),
                rule: rule("sp2-pct", CommissionType::Percentage),
            }],
        };
        let selected = select_rule(&config, "sp-1", CommissionType::Percentage, day(2026, 6, 1))
            .unwrap()
            .unwrap();
        assert_eq!(selected.rule.id, "org-pct");
        assert_eq!(selected.source, RuleSource::OrgDefault);
    }

    #[test]
    fn test_no_rule_is_none_not_error() {
        let config = OrgCommissionConfig::default();
        let selected =
            select_rule(&config, "sp-1", CommissionType::Percentage, day(2026, 6, 1)).unwrap();
        assert!(selected.is_none());
    }

    #[test]
    fn test_type_mismatch_is_none() {
        let config = OrgCommissionConfig {
            default_rules: vec![rule("org-flat", CommissionType::FlatAmount)],
            assignments: vec![],
        };
        let selected =
            select_rule(&config, "sp-1", CommissionType::Percentage, day(2026, 6, 1)).unwrap();
        assert!(selected.is_none());
    }

    #[test]
    fn test_expired_assignment_ignored() {
        let mut expired = rule("sp1-old", CommissionType::Percentage);
        expired.expiry_date = Some(day(2025, 12, 31));
        let config = OrgCommissionConfig {
            default_rules: vec![rule("org-pct", CommissionType::Percentage)],
            assignments: vec![SalespersonAssignment {
                salesperson_id: "sp-1".into(),
                rule: expired,
            }],
        };
        let selected = select_rule(&config, "sp-1", CommissionType::Percentage, day(2026, 6, 1))
            .unwrap()
            .unwrap();
        assert_eq!(selected.source, RuleSource::OrgDefault);
    }

    #[test]
    fn test_ambiguous_assignments_error() {
        let config = OrgCommissionConfig {
            default_rules: vec![],
            assignments: vec![
                SalespersonAssignment {
                    salesperson_id: "sp-1".into(),
                    rule: rule("sp1-a", CommissionType::Percentage),
                },
                SalespersonAssignment {
                    salesperson_id: "sp-1".into(),
                    rule: rule("sp1-b", CommissionType::Percentage),
                },
            ],
        };
        let err = select_rule(&config, "sp-1", CommissionType::Percentage, day(2026, 6, 1))
            .unwrap_err();
        match err {
            RevenueError::AmbiguousRule { matching, .. } => assert_eq!(matching, 2),
            other => panic!("Expected AmbiguousRule, got: {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_defaults_error() {
        let config = OrgCommissionConfig {
            default_rules: vec![
                rule("org-a", CommissionType::FlatAmount),
                rule("org-b", CommissionType::FlatAmount),
            ],
            assignments: vec![],
        };
        let err =
            select_rule(&config, "sp-1", CommissionType::FlatAmount, day(2026, 6, 1)).unwrap_err();
        assert!(matches!(err, RevenueError::AmbiguousRule { .. }));
    }

    #[test]
    fn test_disjoint_windows_not_ambiguous() {
        let mut q1 = rule("sp1-q1", CommissionType::Percentage);
        q1.effective_date = Some(day(2026, 1, 1));
        q1.expiry_date = Some(day(2026, 3, 31));
        let mut q2 = rule("sp1-q2", CommissionType::Percentage);
        q2.effective_date = Some(day(2026, 4, 1));
        q2.expiry_date = Some(day(2026, 6, 30));
        let config = OrgCommissionConfig {
            default_rules: vec![],
            assignments: vec![
                SalespersonAssignment {
                    salesperson_id: "sp-1".into(),
                    rule: q1,
                },
                SalespersonAssignment {
                    salesperson_id: "sp-1".into(),
                    rule: q2,
                },
            ],
        };
        let selected = select_rule(&config, "sp-1", CommissionType::Percentage, day(2026, 5, 15))
            .unwrap()
            .unwrap();
        assert_eq!(selected.rule.id, "sp1-q2");
    }
}
