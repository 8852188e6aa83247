use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dates::PlanWindow;

/// Account type as reported by the REST API's `userType` field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum UserType {
    #[default]
    Local,
    Traveler,
    Business,
}

impl UserType {
    /// Parse from the API string. Unknown values are treated as locals.
    pub fn from_api(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "traveler" | "traveller" => Self::Traveler,
            "business" => Self::Business,
            _ => Self::Local,
        }
    }
}

impl From<Option<String>> for UserType {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Self::from_api).unwrap_or_default()
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Traveler => write!(f, "traveler"),
            Self::Business => write!(f, "business"),
        }
    }
}

/// User profile as served by `GET /api/users/:userId`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default)]
    pub hometown_city: Option<String>,
    #[serde(default)]
    pub hometown_state: Option<String>,
    #[serde(default)]
    pub hometown_country: Option<String>,
    /// Free-text current location override. For business accounts this is
    /// the business address.
    #[serde(default)]
    pub location: Option<String>,
}

impl User {
    pub fn hometown_city(&self) -> &str {
        self.hometown_city.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn location_override(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_business(&self) -> bool {
        self.user_type == UserType::Business
    }
}

/// Travel plan record from `GET /api/travel-plans/:userId`.
///
/// Dates are kept as the raw strings the API sent; they are parsed lazily
/// and a plan with unparseable dates simply never becomes active.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelPlan {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Status string stored by the API. Informational only, see `status_on`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl TravelPlan {
    pub fn new(destination: impl Into<String>, start: &str, end: Option<&str>) -> Self {
        Self {
            destination: destination.into(),
            start_date: Some(start.to_string()),
            end_date: end.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Parsed date window, or `None` if the dates are malformed
    pub fn window(&self) -> Option<PlanWindow> {
        PlanWindow::parse(self.start_date.as_deref()?, self.end_date.as_deref())
    }

    /// Status derived from the plan dates relative to `today`
    pub fn status_on(&self, today: NaiveDate) -> PlanStatus {
        match self.window() {
            Some(window) if window.contains(today) => PlanStatus::Active,
            Some(window) if today < window.start => PlanStatus::Upcoming,
            Some(_) => PlanStatus::Past,
            None => PlanStatus::Unknown,
        }
    }
}

/// Lifecycle of a travel plan relative to a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Upcoming,
    Active,
    Past,
    /// Dates could not be parsed
    Unknown,
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upcoming => write!(f, "upcoming"),
            Self::Active => write!(f, "active"),
            Self::Past => write!(f, "past"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Where a user is right now. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub is_traveling: bool,
    pub travel_to: Option<String>,
    /// Formatted hometown ("City", "City, State" or "City, Country")
    pub hometown: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_user_from_api_json() {
        let json = r#"{
            "id": 7,
            "username": "maria",
            "userType": "traveler",
            "hometownCity": "Austin",
            "hometownState": "TX",
            "hometownCountry": "United States",
            "location": null,
            "bio": "ignored"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.user_type, UserType::Traveler);
        assert_eq!(user.hometown_city(), "Austin");
        assert_eq!(user.location_override(), None);
    }

    #[test]
    fn test_unknown_user_type_is_local() {
        let user: User = serde_json::from_str(r#"{"id": 1, "userType": "admin"}"#).unwrap();
        assert_eq!(user.user_type, UserType::Local);

        let user: User = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(user.user_type, UserType::Local);
        assert_eq!(user.hometown_city(), "");

        let user: User =
            serde_json::from_str(r#"{"id": 1, "userType": null, "hometownCity": "Lima"}"#).unwrap();
        assert_eq!(user.user_type, UserType::Local);
        assert_eq!(user.hometown_city(), "Lima");
    }

    #[test]
    fn test_user_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserType::Business).unwrap(),
            "\"business\""
        );
        assert_eq!(UserType::from_api(" Traveller "), UserType::Traveler);
    }

    #[test]
    fn test_plan_status_on() {
        let plan = TravelPlan::new("Paris, France", "2024-01-01", Some("2024-01-10"));
        assert_eq!(plan.status_on(day("2023-12-31")), PlanStatus::Upcoming);
        assert_eq!(plan.status_on(day("2024-01-01")), PlanStatus::Active);
        assert_eq!(plan.status_on(day("2024-01-10")), PlanStatus::Active);
        assert_eq!(plan.status_on(day("2024-01-11")), PlanStatus::Past);
    }

    #[test]
    fn test_open_ended_plan_never_past() {
        let plan = TravelPlan::new("Lisbon", "2024-01-01", None);
        assert_eq!(plan.status_on(day("2030-06-01")), PlanStatus::Active);
    }

    #[test]
    fn test_malformed_plan_status_unknown() {
        let plan = TravelPlan::new("Rome", "next tuesday", None);
        assert_eq!(plan.status_on(day("2024-01-01")), PlanStatus::Unknown);

        let plan = TravelPlan {
            destination: "Rome".into(),
            ..Default::default()
        };
        assert_eq!(plan.status_on(day("2024-01-01")), PlanStatus::Unknown);
    }

    #[test]
    fn test_plan_from_api_json() {
        let json = r#"[{"id": 3, "userId": 7, "destination": "Tokyo, Japan",
            "startDate": "2024-03-01T00:00:00.000Z", "endDate": null, "status": "planned"}]"#;
        let plans: Vec<TravelPlan> = serde_json::from_str(json).unwrap();
        assert_eq!(plans[0].id, Some(3));
        assert_eq!(plans[0].end_date, None);
        assert_eq!(plans[0].status.as_deref(), Some("planned"));
        assert_eq!(plans[0].status_on(day("2024-03-02")), PlanStatus::Active);
    }
}
