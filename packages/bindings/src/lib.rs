use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[napi]
pub fn resolve_discount(input_json: String) -> NapiResult<String> {
    let input: gym_revenue_core::pricing::discount::DiscountInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        gym_revenue_core::pricing::discount::resolve_discount(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Commission
// ---------------------------------------------------------------------------

#[napi]
pub fn select_commission_rule(input_json: String) -> NapiResult<String> {
    let input: gym_revenue_core::commission::selector::SelectionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let selected = gym_revenue_core::commission::selector::select_rule(
        &input.config,
        &input.salesperson_id,
        input.commission_type,
        input.as_of,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&selected).map_err(to_napi_error)
}

#[napi]
pub fn allocate_commission(input_json: String) -> NapiResult<String> {
    let input: gym_revenue_core::commission::allocator::AllocationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = gym_revenue_core::commission::allocator::allocate_commission(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn split_commission(amount: String, splits_json: String) -> NapiResult<String> {
    let amount: rust_decimal::Decimal = amount.parse().map_err(to_napi_error)?;
    let splits: Vec<gym_revenue_core::commission::split::LeadSplit> =
        serde_json::from_str(&splits_json).map_err(to_napi_error)?;
    let lines =
        gym_revenue_core::commission::split::distribute(amount, &splits).map_err(to_napi_error)?;
    serde_json::to_string(&lines).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Conversion pipeline
// ---------------------------------------------------------------------------

#[napi]
pub fn process_conversion(input_json: String) -> NapiResult<String> {
    let input: gym_revenue_core::conversion::ConversionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        gym_revenue_core::conversion::process_conversion(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
