use serde::Deserialize;
use serde_json::Value;

/// Building insights document returned by the solar provider
/// Documentation: https://developers.google.com/maps/documentation/solar/reference/rest/v1/buildingInsights/findClosest
///
/// Only the containers are typed strictly. Scalars the transformation reads
/// are kept as raw JSON and coerced at the point of use, so a stray type in
/// one field never discards the rest of the document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingInsights {
    pub solar_potential: Option<SolarPotential>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarPotential {
    pub max_array_panels_count: Option<Value>,
    pub max_array_area_meters2: Option<Value>,
    pub max_sunshine_hours_per_year: Option<Value>,
    pub carbon_offset_factor_kg_per_mwh: Option<Value>,
    pub panel_capacity_watts: Option<Value>,
    pub panel_height_meters: Option<Value>,
    pub panel_width_meters: Option<Value>,
    pub panel_lifetime_years: Option<Value>,
    pub financial_analyses: Option<Vec<FinancialAnalysis>>,
    pub solar_panel_configs: Option<Vec<SolarPanelConfig>>,
}

impl SolarPotential {
    pub fn financial_analyses(&self) -> &[FinancialAnalysis] {
        self.financial_analyses.as_deref().unwrap_or_default()
    }

    pub fn solar_panel_configs(&self) -> &[SolarPanelConfig] {
        self.solar_panel_configs.as_deref().unwrap_or_default()
    }
}

/// One candidate array layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarPanelConfig {
    pub panels_count: Option<Value>,
}

impl SolarPanelConfig {
    /// Panel count truncated to a whole number; 0 when absent or not numeric.
    pub fn panels(&self) -> i64 {
        self.panels_count
            .as_ref()
            .and_then(numeric)
            .map(|count| count.trunc() as i64)
            .unwrap_or(0)
    }
}

/// One financing scenario, keyed loosely by an assumed monthly bill.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAnalysis {
    pub monthly_bill: Option<Money>,
    pub panel_config_index: Option<Value>,
    pub financial_details: Option<FinancialDetails>,
    pub cash_purchase_savings: Option<CashPurchaseSavings>,
    pub financed_purchase_savings: Option<FinancedPurchaseSavings>,
    pub leasing_savings: Option<LeasingSavings>,
}

impl FinancialAnalysis {
    /// Bill amount used for best-match selection, if usable.
    pub fn bill_units(&self) -> Option<f64> {
        self.monthly_bill.as_ref().and_then(Money::units_f64)
    }

    /// `panelConfigIndex` as a list index. Negative or fractional values are unusable.
    pub fn config_index(&self) -> Option<usize> {
        self.panel_config_index
            .as_ref()
            .and_then(numeric)
            .filter(|index| *index >= 0.0 && index.fract() == 0.0)
            .map(|index| index as usize)
    }

    pub fn has_all_financing_options(&self) -> bool {
        self.cash_purchase_savings.is_some()
            && self.financed_purchase_savings.is_some()
            && self.leasing_savings.is_some()
    }

    pub fn has_any_financing_option(&self) -> bool {
        self.cash_purchase_savings.is_some()
            || self.financed_purchase_savings.is_some()
            || self.leasing_savings.is_some()
    }
}

/// System figures, echoed verbatim into the summary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialDetails {
    pub initial_ac_kwh_per_year: Option<Value>,
    pub cost_of_electricity_without_solar: Option<Value>,
    pub net_metering_allowed: Option<Value>,
    pub solar_percentage: Option<Value>,
    pub percentage_exported_to_grid: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsOverTime {
    pub savings_year1: Option<Money>,
    pub savings_year20: Option<Money>,
    pub savings_lifetime: Option<Money>,
    pub financially_viable: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashPurchaseSavings {
    pub out_of_pocket_cost: Option<Money>,
    pub upfront_cost: Option<Money>,
    pub rebate_value: Option<Money>,
    pub payback_years: Option<Value>,
    pub savings: Option<SavingsOverTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancedPurchaseSavings {
    pub annual_loan_payment: Option<Money>,
    pub rebate_value: Option<Money>,
    pub loan_interest_rate: Option<Value>,
    pub savings: Option<SavingsOverTime>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeasingSavings {
    pub leases_allowed: Option<Value>,
    pub annual_leasing_cost: Option<Money>,
    pub savings: Option<SavingsOverTime>,
}

/// Provider money value `{currencyCode, units, nanos}`.
///
/// Read from any JSON value: only `units` is used, and it arrives as a
/// decimal string or a number. A non-object money value has no units.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Money {
    pub units: Option<Value>,
}

impl From<Value> for Money {
    fn from(value: Value) -> Self {
        Money {
            units: value.get("units").filter(|units| !units.is_null()).cloned(),
        }
    }
}

impl Money {
    /// Numeric value of `units`, or `None` when absent or not numeric.
    pub fn units_f64(&self) -> Option<f64> {
        self.units.as_ref().and_then(numeric)
    }

    /// Whole-unit amount truncated toward zero; 0 when unusable.
    pub fn units_i64(&self) -> i64 {
        self.units_f64().map(|v| v.trunc() as i64).unwrap_or(0)
    }
}

/// Numeric reading of a provider scalar: a JSON number or a numeric string.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Numeric value of an optional scalar, defaulting to 0.
pub fn number_or_zero(value: Option<&Value>) -> f64 {
    value.and_then(numeric).unwrap_or(0.0)
}

/// Boolean value of an optional scalar; anything but `true` is false.
pub fn flag(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true)))
}

/// Whole units of an optional money field, defaulting to 0.
pub fn money_units(money: Option<&Money>) -> i64 {
    money.map(Money::units_i64).unwrap_or(0)
}
