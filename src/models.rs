use crate::errors::AppError;
use crate::transform::InsightSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Lead-capture form submission (`POST /`).
///
/// Every section is optional at the type level so that a missing section is
/// reported as a 400 with a readable message instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSubmission {
    pub user_info: Option<UserInfo>,
    pub location: Option<Location>,
    pub property_info: Option<PropertyInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UserInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Any additional form fields, echoed untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Number or numeric string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_owner: Option<Value>,
    /// Number or numeric string; echoed back as a number after validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_electricity_bill: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A submission that passed presence/type checks.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLead {
    pub user_info: UserInfo,
    pub location: Location,
    pub property_info: PropertyInfo,
    pub latitude: f64,
    pub longitude: f64,
    pub monthly_bill: f64,
}

impl LeadSubmission {
    /// Checks required sections, coordinates and the monthly bill.
    pub fn validate(self) -> Result<ValidatedLead, AppError> {
        let (Some(user_info), Some(location), Some(mut property_info)) =
            (self.user_info, self.location, self.property_info)
        else {
            return Err(AppError::BadRequest(
                "Missing required fields: userInfo, location, and propertyInfo are required"
                    .to_string(),
            ));
        };

        let (Some(latitude), Some(longitude)) = (
            location.latitude.as_ref().and_then(coerce_number),
            location.longitude.as_ref().and_then(coerce_number),
        ) else {
            return Err(AppError::BadRequest(
                "Missing latitude or longitude".to_string(),
            ));
        };

        let monthly_bill = property_info
            .monthly_electricity_bill
            .as_ref()
            .and_then(coerce_number)
            .ok_or_else(|| {
                AppError::BadRequest("monthlyElectricityBill must be a valid number".to_string())
            })?;
        property_info.monthly_electricity_bill = Some(Value::from(monthly_bill));

        Ok(ValidatedLead {
            user_info,
            location,
            property_info,
            latitude,
            longitude,
            monthly_bill,
        })
    }
}

/// Reads a finite number from a JSON number or a numeric string.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Combined document forwarded to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayDocument {
    pub submission_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_info: UserInfo,
    pub location: Location,
    pub property_info: PropertyInfo,
    pub solar_analysis: InsightSummary,
}

impl RelayDocument {
    pub fn new(lead: ValidatedLead, solar_analysis: InsightSummary) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user_info: lead.user_info,
            location: lead.location,
            property_info: lead.property_info,
            solar_analysis,
        }
    }
}

/// Body returned to the caller: the forwarded document plus delivery outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    #[serde(flatten)]
    pub document: RelayDocument,
    pub webhook_result: WebhookResult,
}

/// Outcome of forwarding to the downstream webhook. Never an HTTP-level failure.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WebhookResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl WebhookResult {
    pub fn not_configured() -> Self {
        Self {
            success: false,
            status: None,
            message: "Webhook URL not configured".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(body: Value) -> LeadSubmission {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_valid_submission_coerces_numbers() {
        let lead = submission(json!({
            "userInfo": {"name": "Ana", "phone": "555-0100", "email": "ana@example.com"},
            "location": {"address": "1 Main St", "latitude": "37.42", "longitude": -122.08},
            "propertyInfo": {"isOwner": true, "monthlyElectricityBill": "180"}
        }))
        .validate()
        .unwrap();

        assert_eq!(lead.latitude, 37.42);
        assert_eq!(lead.longitude, -122.08);
        assert_eq!(lead.monthly_bill, 180.0);
        assert_eq!(
            lead.property_info.monthly_electricity_bill,
            Some(json!(180.0))
        );
        // Coordinates are echoed as submitted
        assert_eq!(lead.location.latitude, Some(json!("37.42")));
    }

    #[test]
    fn test_missing_section_rejected() {
        let err = submission(json!({
            "userInfo": {"name": "Ana"},
            "location": {"latitude": 1, "longitude": 2}
        }))
        .validate()
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("propertyInfo")));
    }

    #[test]
    fn test_missing_coordinates_rejected() {
        let err = submission(json!({
            "userInfo": {},
            "location": {"address": "1 Main St", "latitude": 37.0},
            "propertyInfo": {"monthlyElectricityBill": 100}
        }))
        .validate()
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("latitude")));
    }

    #[test]
    fn test_non_numeric_bill_rejected() {
        for bill in [json!("a lot"), json!(""), json!(null), json!(true)] {
            let err = submission(json!({
                "userInfo": {},
                "location": {"latitude": 37.0, "longitude": -122.0},
                "propertyInfo": {"monthlyElectricityBill": bill}
            }))
            .validate()
            .unwrap_err();

            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[test]
    fn test_extra_fields_are_echoed() {
        let info: UserInfo =
            serde_json::from_value(json!({"name": "Ana", "utm_source": "ads"})).unwrap();
        let echoed = serde_json::to_value(&info).unwrap();
        assert_eq!(echoed, json!({"name": "Ana", "utm_source": "ads"}));
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(12)), Some(12.0));
        assert_eq!(coerce_number(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(coerce_number(&json!("NaN")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }

    #[test]
    fn test_webhook_result_serialization() {
        let value = serde_json::to_value(WebhookResult::not_configured()).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "message": "Webhook URL not configured"})
        );
    }
}
