//! Building insights → financing summary transformation.
//!
//! Takes the provider's raw building-insights document plus the caller's
//! monthly bill and derives a flat, display-ready summary:
//!
//! 1. Format the top-level array/panel metrics into display strings.
//! 2. Select exactly one financial analysis (closest bill, then the first
//!    complete entry, then the first entry with any financing option).
//! 3. Project the selected analysis into financing options, system info and
//!    a recommended panel count.
//!
//! The transformation never fails: every outcome, including a malformed
//! document, is an [`InsightSummary`] value. Mistyped scalars degrade the
//! affected figure only (a `NaN` display string, or a 0 default); a broken
//! container such as a non-list `financialAnalyses` yields the anomaly outcome.

use crate::insights_models::{
    flag, money_units, number_or_zero, numeric, BuildingInsights, CashPurchaseSavings,
    FinancedPurchaseSavings, FinancialAnalysis, FinancialDetails, LeasingSavings, SavingsOverTime,
    SolarPanelConfig, SolarPotential,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INVALID_SOLAR_POTENTIAL: &str = "invalid or missing solar potential data";
pub const NO_FINANCIAL_ANALYSIS: &str = "no financial analysis data available";

const OWNERSHIP_PROPERTY_VALUE_INCREASE: &str = "3% or more";
const LEASE_PROPERTY_VALUE_INCREASE: &str = "0%";
const IMMEDIATE_PAYBACK: &str = "Immediate";

/// Result of [`transform`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightSummary {
    Complete(NormalizedSummary),
    /// Solar potential was usable but no financial analysis could be selected.
    WithoutFinancing(PartialSummary),
    Failed(TransformFailure),
}

impl InsightSummary {
    fn invalid() -> Self {
        InsightSummary::Failed(TransformFailure {
            error: INVALID_SOLAR_POTENTIAL.to_string(),
            raw_data: None,
        })
    }

    /// Error message carried by this outcome, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            InsightSummary::Complete(_) => None,
            InsightSummary::WithoutFinancing(partial) => {
                Some(partial.financing_options.error.as_str())
            }
            InsightSummary::Failed(failure) => Some(failure.error.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformFailure {
    pub error: String,
    /// The offending document, echoed back for diagnosis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSummary {
    pub solar_potential_summary: SolarPotentialSummary,
    pub financing_options: FinancingUnavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancingUnavailable {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSummary {
    pub solar_potential_summary: SolarPotentialSummary,
    pub financing_options: FinancingOptions,
    pub solar_system_info: SolarSystemInfo,
    pub recommended_panels: i64,
    pub electricity_bill_info: ElectricityBillInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarPotentialSummary {
    pub max_panels_count: String,
    pub max_array_area: String,
    pub max_sunshine_hours: String,
    pub carbon_offset_factor: String,
    pub panel_capacity: String,
    pub panel_dimensions: String,
    pub panel_lifetime: String,
}

/// Financing modes keyed `cash`, `loan` and `lease`; absent modes are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash: Option<CashOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan: Option<LoanOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease: Option<LeaseOption>,
}

impl FinancingOptions {
    pub fn len(&self) -> usize {
        [
            self.cash.is_some(),
            self.loan.is_some(),
            self.lease.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Savings figures shared by every financing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsFigures {
    pub first_year_savings: i64,
    pub twenty_year_savings: i64,
    pub lifetime_savings: i64,
    pub financially_viable: bool,
}

impl SavingsFigures {
    fn from_source(savings: Option<&SavingsOverTime>) -> Self {
        let Some(savings) = savings else {
            return Self::default();
        };
        Self {
            first_year_savings: money_units(savings.savings_year1.as_ref()),
            twenty_year_savings: money_units(savings.savings_year20.as_ref()),
            lifetime_savings: money_units(savings.savings_lifetime.as_ref()),
            financially_viable: flag(savings.financially_viable.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashOption {
    pub title: &'static str,
    pub description: &'static str,
    pub upfront_cost: i64,
    pub out_of_pocket_cost: i64,
    pub rebate_value: i64,
    pub payback_years: f64,
    #[serde(flatten)]
    pub savings: SavingsFigures,
    pub property_value_increase: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOption {
    pub title: &'static str,
    pub description: &'static str,
    pub annual_loan_payment: i64,
    pub interest_rate: f64,
    pub rebate_value: i64,
    pub payback_period: &'static str,
    #[serde(flatten)]
    pub savings: SavingsFigures,
    pub property_value_increase: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseOption {
    pub title: &'static str,
    pub description: &'static str,
    pub annual_leasing_cost: i64,
    pub leases_allowed: bool,
    pub payback_period: &'static str,
    #[serde(flatten)]
    pub savings: SavingsFigures,
    pub property_value_increase: &'static str,
}

/// System figures copied verbatim from the selected analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarSystemInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solar_coverage_percentage: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_export_percentage: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_metering_allowed: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_without_solar: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_ac_kwh_per_year: Option<Value>,
}

impl SolarSystemInfo {
    fn from_details(details: &FinancialDetails) -> Self {
        Self {
            solar_coverage_percentage: details.solar_percentage.clone(),
            grid_export_percentage: details.percentage_exported_to_grid.clone(),
            net_metering_allowed: details.net_metering_allowed.clone(),
            cost_without_solar: details.cost_of_electricity_without_solar.clone(),
            initial_ac_kwh_per_year: details.initial_ac_kwh_per_year.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityBillInfo {
    pub requested_bill: f64,
    /// Only set when the closest-bill pass made the selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_bill: Option<f64>,
}

/// The analysis chosen as authoritative for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub index: usize,
    pub matched_bill: Option<f64>,
}

type SelectionStrategy = fn(&[FinancialAnalysis], f64) -> Option<Selection>;

/// Applied in order; the first strategy that matches wins.
const SELECTION_STRATEGIES: [SelectionStrategy; 3] =
    [closest_bill, first_complete, first_with_any_option];

/// Rounds to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Transforms a raw building-insights document for the given monthly bill.
///
/// `None`, a document whose `solarPotential` is not an object, or a document
/// with a broken container all yield [`InsightSummary::Failed`]; only the
/// last carries `rawData`.
pub fn transform(insights: Option<&Value>, target_monthly_bill: f64) -> InsightSummary {
    let Some(raw) = insights.filter(|doc| has_solar_potential(doc)) else {
        return InsightSummary::invalid();
    };

    match BuildingInsights::deserialize(raw) {
        Ok(document) => summarize(&document, target_monthly_bill),
        Err(e) => {
            tracing::warn!("Malformed building insights document: {}", e);
            InsightSummary::Failed(TransformFailure {
                error: e.to_string(),
                raw_data: Some(raw.clone()),
            })
        }
    }
}

fn has_solar_potential(document: &Value) -> bool {
    document
        .get("solarPotential")
        .map_or(false, Value::is_object)
}

/// Transforms an already-typed document.
pub fn summarize(document: &BuildingInsights, target_monthly_bill: f64) -> InsightSummary {
    let Some(potential) = document.solar_potential.as_ref() else {
        return InsightSummary::invalid();
    };

    let solar_potential_summary = summarize_potential(potential);
    let analyses = potential.financial_analyses();

    let Some(selection) = select_financial_analysis(analyses, target_monthly_bill) else {
        return InsightSummary::WithoutFinancing(PartialSummary {
            solar_potential_summary,
            financing_options: FinancingUnavailable {
                error: NO_FINANCIAL_ANALYSIS.to_string(),
            },
        });
    };

    let analysis = &analyses[selection.index];
    tracing::debug!(
        "Selected financial analysis {} of {} (matched bill: {:?})",
        selection.index,
        analyses.len(),
        selection.matched_bill
    );

    InsightSummary::Complete(NormalizedSummary {
        solar_potential_summary,
        financing_options: project_financing_options(analysis),
        solar_system_info: analysis
            .financial_details
            .as_ref()
            .map(SolarSystemInfo::from_details)
            .unwrap_or_default(),
        recommended_panels: recommended_panels(potential, analysis.config_index()),
        electricity_bill_info: ElectricityBillInfo {
            requested_bill: target_monthly_bill,
            matched_bill: selection.matched_bill,
        },
    })
}

pub fn summarize_potential(potential: &SolarPotential) -> SolarPotentialSummary {
    SolarPotentialSummary {
        max_panels_count: format!(
            "{} panels",
            display_as_given(potential.max_array_panels_count.as_ref())
        ),
        max_array_area: format!(
            "{} m²",
            display_rounded(potential.max_array_area_meters2.as_ref())
        ),
        max_sunshine_hours: format!(
            "{} hours/year",
            display_rounded(potential.max_sunshine_hours_per_year.as_ref())
        ),
        carbon_offset_factor: format!(
            "{} kg/MWh",
            display_rounded(potential.carbon_offset_factor_kg_per_mwh.as_ref())
        ),
        panel_capacity: format!(
            "{} W",
            display_rounded(potential.panel_capacity_watts.as_ref())
        ),
        panel_dimensions: format!(
            "{} m x {} m",
            display_rounded(potential.panel_height_meters.as_ref()),
            display_rounded(potential.panel_width_meters.as_ref())
        ),
        panel_lifetime: format!(
            "{} years",
            display_as_given(potential.panel_lifetime_years.as_ref())
        ),
    }
}

/// Float metric rounded to 2 decimals; `0` when absent, `NaN` when not numeric.
fn display_rounded(value: Option<&Value>) -> String {
    match value {
        None => "0".to_string(),
        Some(value) => numeric(value)
            .map(|number| round2(number).to_string())
            .unwrap_or_else(|| "NaN".to_string()),
    }
}

/// Integer metric passed through as supplied; `0` when absent.
fn display_as_given(value: Option<&Value>) -> String {
    match value {
        None => "0".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn select_financial_analysis(
    analyses: &[FinancialAnalysis],
    target_monthly_bill: f64,
) -> Option<Selection> {
    SELECTION_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(analyses, target_monthly_bill))
}

/// Entry whose bill is closest to the target; ties keep the earlier entry.
fn closest_bill(analyses: &[FinancialAnalysis], target: f64) -> Option<Selection> {
    let mut best: Option<(usize, f64, f64)> = None;

    for (index, analysis) in analyses.iter().enumerate() {
        let Some(bill) = analysis.bill_units() else {
            continue;
        };
        let difference = (bill - target).abs();
        if best.map_or(true, |(_, _, best_difference)| difference < best_difference) {
            best = Some((index, bill, difference));
        }
    }

    best.map(|(index, bill, _)| Selection {
        index,
        matched_bill: Some(bill),
    })
}

fn first_complete(analyses: &[FinancialAnalysis], _target: f64) -> Option<Selection> {
    first_matching(analyses, FinancialAnalysis::has_all_financing_options)
}

fn first_with_any_option(analyses: &[FinancialAnalysis], _target: f64) -> Option<Selection> {
    first_matching(analyses, FinancialAnalysis::has_any_financing_option)
}

fn first_matching(
    analyses: &[FinancialAnalysis],
    predicate: fn(&FinancialAnalysis) -> bool,
) -> Option<Selection> {
    analyses
        .iter()
        .position(predicate)
        .map(|index| Selection {
            index,
            matched_bill: None,
        })
}

pub fn project_financing_options(analysis: &FinancialAnalysis) -> FinancingOptions {
    FinancingOptions {
        cash: analysis.cash_purchase_savings.as_ref().map(project_cash),
        loan: analysis.financed_purchase_savings.as_ref().map(project_loan),
        lease: analysis.leasing_savings.as_ref().map(project_lease),
    }
}

fn project_cash(cash: &CashPurchaseSavings) -> CashOption {
    CashOption {
        title: "Cash Purchase",
        description: "Pay for the system upfront and own it outright for the largest long-term savings",
        upfront_cost: money_units(cash.upfront_cost.as_ref()),
        out_of_pocket_cost: money_units(cash.out_of_pocket_cost.as_ref()),
        rebate_value: money_units(cash.rebate_value.as_ref()),
        payback_years: round2(number_or_zero(cash.payback_years.as_ref())),
        savings: SavingsFigures::from_source(cash.savings.as_ref()),
        property_value_increase: OWNERSHIP_PROPERTY_VALUE_INCREASE,
    }
}

fn project_loan(loan: &FinancedPurchaseSavings) -> LoanOption {
    LoanOption {
        title: "Solar Loan",
        description: "Finance the system and own it with little or no money down",
        annual_loan_payment: money_units(loan.annual_loan_payment.as_ref()),
        interest_rate: number_or_zero(loan.loan_interest_rate.as_ref()),
        rebate_value: money_units(loan.rebate_value.as_ref()),
        payback_period: IMMEDIATE_PAYBACK,
        savings: SavingsFigures::from_source(loan.savings.as_ref()),
        property_value_increase: OWNERSHIP_PROPERTY_VALUE_INCREASE,
    }
}

fn project_lease(lease: &LeasingSavings) -> LeaseOption {
    LeaseOption {
        title: "Solar Lease",
        description: "Pay a fixed annual cost with no upfront investment or maintenance",
        annual_leasing_cost: money_units(lease.annual_leasing_cost.as_ref()),
        leases_allowed: flag(lease.leases_allowed.as_ref()),
        payback_period: IMMEDIATE_PAYBACK,
        savings: SavingsFigures::from_source(lease.savings.as_ref()),
        property_value_increase: LEASE_PROPERTY_VALUE_INCREASE,
    }
}

/// Panel count of the referenced configuration, or 0 when the index is unusable.
pub fn recommended_panels(potential: &SolarPotential, panel_config_index: Option<usize>) -> i64 {
    panel_config_index
        .and_then(|index| potential.solar_panel_configs().get(index))
        .map(SolarPanelConfig::panels)
        .unwrap_or(0)
}
