use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;

use gym_revenue_core::pricing::discount::{resolve_discount, DiscountInput};
use gym_revenue_core::pricing::plan::{BillingInterval, MembershipPlan};
use gym_revenue_core::pricing::promotion::{DiscountType, Promotion};

use crate::input;

/// Discount shape accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DiscountKind {
    Percentage,
    FixedAmount,
    FreeMonths,
}

impl From<DiscountKind> for DiscountType {
    fn from(kind: DiscountKind) -> Self {
        match kind {
            DiscountKind::Percentage => DiscountType::Percentage,
            DiscountKind::FixedAmount => DiscountType::FixedAmount,
            DiscountKind::FreeMonths => DiscountType::FreeMonths,
        }
    }
}

/// Arguments for discount resolution
#[derive(Args)]
pub struct DiscountArgs {
    /// Path to a JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Plan base price
    #[arg(long)]
    pub base_price: Option<Decimal>,

    /// Discount shape
    #[arg(long, value_enum)]
    pub discount_type: Option<DiscountKind>,

    /// Discount value (percent, currency amount, or month count)
    #[arg(long, allow_hyphen_values = true)]
    pub discount_value: Option<Decimal>,

    /// Evaluation date, e.g. 2026-06-01 (defaults to today)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_discount(args: DiscountArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let discount_input: DiscountInput = if let Some(ref path) = args.input {
        input::file::read_document(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let base = args
            .base_price
            .ok_or("--base-price is required (or provide --input)")?;

        let promotion = match (args.discount_type, args.discount_value) {
            (Some(kind), Some(value)) => Some(Promotion {
                id: "cli-promo".into(),
                name: "Ad hoc promotion".into(),
                discount_type: kind.into(),
                discount_value: value,
                applicable_plans: vec![],
                valid_from: None,
                valid_until: None,
                is_active: true,
                max_uses: None,
                current_uses: 0,
            }),
            (None, None) => None,
            _ => {
                return Err("--discount-type and --discount-value must be given together".into());
            }
        };

        DiscountInput {
            plan: MembershipPlan {
                id: "cli-plan".into(),
                name: "Ad hoc plan".into(),
                base_price: base,
                signup_fee: Decimal::ZERO,
                billing_interval: BillingInterval::Monthly,
                maintenance_fee: None,
            },
            promotion,
            as_of: args
                .as_of
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
        }
    };

    let result = resolve_discount(&discount_input)?;
    Ok(serde_json::to_value(result)?)
}
