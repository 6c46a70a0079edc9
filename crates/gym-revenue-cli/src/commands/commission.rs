use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use gym_revenue_core::commission::allocator::{
    allocate_commission, AllocationInput, RevenueAmounts,
};
use gym_revenue_core::commission::rule::{CommissionRule, CommissionType, RevenueBasis};
use gym_revenue_core::commission::selector::{select_rule, RuleSource, SelectedRule, SelectionInput};
use gym_revenue_core::commission::split::{distribute, LeadSplit};
use gym_revenue_core::round_money;

use crate::input;

/// Commission shape accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CommissionKind {
    Percentage,
    FlatAmount,
}

impl From<CommissionKind> for CommissionType {
    fn from(kind: CommissionKind) -> Self {
        match kind {
            CommissionKind::Percentage => CommissionType::Percentage,
            CommissionKind::FlatAmount => CommissionType::FlatAmount,
        }
    }
}

/// Revenue basis accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BasisKind {
    BaseAmount,
    FinalChargeAmount,
    Custom,
}

impl From<BasisKind> for RevenueBasis {
    fn from(kind: BasisKind) -> Self {
        match kind {
            BasisKind::BaseAmount => RevenueBasis::BaseAmount,
            BasisKind::FinalChargeAmount => RevenueBasis::FinalChargeAmount,
            BasisKind::Custom => RevenueBasis::Custom,
        }
    }
}

// ---------------------------------------------------------------------------
// select-rule
// ---------------------------------------------------------------------------

/// Arguments for commission rule selection
#[derive(Args)]
pub struct SelectRuleArgs {
    /// Path to a JSON or YAML file with the selection request
    /// (config, salesperson_id, commission_type, as_of)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_select_rule(args: SelectRuleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SelectionInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file> or stdin required for rule selection".into());
    };

    let selected = select_rule(
        &request.config,
        &request.salesperson_id,
        request.commission_type,
        request.as_of,
    )?;
    Ok(serde_json::json!({
        "salesperson_id": request.salesperson_id,
        "selected_rule": selected,
    }))
}

// ---------------------------------------------------------------------------
// allocate
// ---------------------------------------------------------------------------

/// Arguments for commission allocation
#[derive(Args)]
pub struct AllocateArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Commission shape
    #[arg(long, value_enum)]
    pub commission_type: Option<CommissionKind>,

    /// Commission value (percent or flat currency amount)
    #[arg(long)]
    pub commission_value: Option<Decimal>,

    /// Which amount the commission is computed against
    #[arg(long, value_enum, default_value = "final-charge-amount")]
    pub revenue_basis: BasisKind,

    /// The revenue basis amount
    #[arg(long)]
    pub basis_amount: Option<Decimal>,

    /// Sales below this basis amount earn nothing
    #[arg(long)]
    pub min_threshold: Option<Decimal>,

    /// Ceiling on the commission amount
    #[arg(long)]
    pub max_cap: Option<Decimal>,

    /// Recurring commissions stop after this many cycles
    #[arg(long)]
    pub duration_months: Option<u32>,

    /// 1-based billing cycle
    #[arg(long, default_value_t = 1)]
    pub cycle_index: u32,
}

pub fn run_allocate(args: AllocateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let allocation_input: AllocationInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let commission_type = args
            .commission_type
            .ok_or("--commission-type is required (or provide --input)")?;
        let commission_value = args
            .commission_value
            .ok_or("--commission-value is required (or provide --input)")?;
        let basis_amount = args
            .basis_amount
            .ok_or("--basis-amount is required (or provide --input)")?;

        let rule = CommissionRule {
            id: "cli-rule".into(),
            commission_type: commission_type.into(),
            commission_value,
            revenue_basis: args.revenue_basis.into(),
            min_threshold: args.min_threshold,
            max_cap: args.max_cap,
            duration_months: args.duration_months,
            is_active: true,
            effective_date: None,
            expiry_date: None,
        };

        AllocationInput {
            rule: Some(SelectedRule {
                rule,
                source: RuleSource::OrgDefault,
            }),
            // One flag feeds every basis so any --revenue-basis choice works
            amounts: RevenueAmounts {
                base_amount: basis_amount,
                final_charge_amount: basis_amount,
                custom_amount: Some(basis_amount),
            },
            cycle_index: args.cycle_index,
            splits: None,
        }
    };

    let result = allocate_commission(&allocation_input)?;
    Ok(serde_json::to_value(result)?)
}

// ---------------------------------------------------------------------------
// split
// ---------------------------------------------------------------------------

/// File/stdin form of a split request
#[derive(Deserialize)]
struct SplitRequest {
    amount: Decimal,
    splits: Vec<LeadSplit>,
}

/// Arguments for split distribution
#[derive(Args)]
pub struct SplitArgs {
    /// Path to a JSON or YAML file with {"amount", "splits"}
    #[arg(long)]
    pub input: Option<String>,

    /// Commission amount to distribute
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Split shares as id:percent pairs, e.g. "alice:60,bob:40"
    #[arg(long, value_delimiter = ',')]
    pub share: Option<Vec<String>>,
}

pub fn run_split(args: SplitArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: SplitRequest = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let amount = args
            .amount
            .ok_or("--amount is required (or provide --input)")?;
        let shares = args
            .share
            .ok_or("--share is required (or provide --input)")?;
        SplitRequest {
            amount,
            splits: shares
                .iter()
                .map(|pair| parse_share(pair))
                .collect::<Result<Vec<_>, _>>()?,
        }
    };

    let lines = distribute(request.amount, &request.splits)?;
    Ok(serde_json::json!({
        "amount": round_money(request.amount),
        "results": lines,
    }))
}

fn parse_share(pair: &str) -> Result<LeadSplit, Box<dyn std::error::Error>> {
    let (id, percent) = pair
        .split_once(':')
        .ok_or_else(|| format!("Expected id:percent, got '{pair}'"))?;
    Ok(LeadSplit {
        salesperson_id: id.trim().to_string(),
        share_percent: percent.trim().parse()?,
    })
}
