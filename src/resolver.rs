//! Current-location resolution.
//!
//! Decides whether a user is at home or away right now, given their
//! hometown and travel plans. Everything that shows "where is this user"
//! goes through [`resolve_travel_status`] so that badges, search buckets and
//! weather lookups always agree.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::place::{format_place, same_city};
use crate::types::{ResolvedLocation, TravelPlan, User};

/// Outcome of resolution for a single user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelStatus {
    pub is_traveling: bool,
    pub destination: Option<String>,
}

impl TravelStatus {
    pub fn at_home() -> Self {
        Self {
            is_traveling: false,
            destination: None,
        }
    }

    fn traveling_to(destination: &str) -> Self {
        Self {
            is_traveling: true,
            destination: Some(destination.trim().to_string()),
        }
    }
}

/// Pick the plan covering `today`.
///
/// When several plans overlap, the earliest start day wins, then the
/// smallest id (plans without an id lose), then input order. Plans with a
/// blank destination or malformed dates are never selected.
pub fn active_plan(plans: &[TravelPlan], today: NaiveDate) -> Option<&TravelPlan> {
    plans
        .iter()
        .enumerate()
        .filter(|(_, plan)| !plan.destination.trim().is_empty())
        .filter_map(|(idx, plan)| {
            let window = plan.window()?;
            window.contains(today).then_some((window.start, plan.id, idx, plan))
        })
        .min_by_key(|(start, id, idx, _)| (*start, id.is_none(), id.unwrap_or_default(), *idx))
        .map(|(_, _, _, plan)| plan)
}

/// Resolve whether a user is traveling at `now`.
///
/// A selected plan whose destination names the hometown city (substring
/// match in either direction, case-insensitive) counts as being at home.
/// An empty hometown always resolves to home.
pub fn resolve_travel_status(
    hometown_city: &str,
    plans: &[TravelPlan],
    now: DateTime<Utc>,
) -> TravelStatus {
    if hometown_city.trim().is_empty() {
        tracing::debug!("No hometown set, treating user as at home");
        return TravelStatus::at_home();
    }

    let today = now.date_naive();
    let Some(plan) = active_plan(plans, today) else {
        return TravelStatus::at_home();
    };

    if same_city(&plan.destination, hometown_city) {
        tracing::debug!(
            "Active plan {:?} to '{}' matches hometown '{}', treating as home",
            plan.id,
            plan.destination,
            hometown_city
        );
        return TravelStatus::at_home();
    }

    TravelStatus::traveling_to(&plan.destination)
}

/// Resolve a user's full location record
pub fn resolve_location(user: &User, plans: &[TravelPlan], now: DateTime<Utc>) -> ResolvedLocation {
    let status = resolve_travel_status(user.hometown_city(), plans, now);
    ResolvedLocation {
        is_traveling: status.is_traveling,
        travel_to: status.destination,
        hometown: format_place(
            user.hometown_city(),
            user.hometown_state.as_deref(),
            user.hometown_country.as_deref(),
        ),
    }
}
