//! Display-side views of a resolved location: badges, search queries and
//! weather lookup keys. All of them come from one [`LocationView`] so a user
//! never shows up as traveling in one widget and at home in another.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bucket::{BucketKind, LocationBuckets, select_buckets};
use crate::clock::Clock;
use crate::current_user::CurrentUserProvider;
use crate::place::{city_of, normalize_place};
use crate::resolver::resolve_location;
use crate::types::{ResolvedLocation, TravelPlan, User, UserType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    Traveling,
    Local,
    Business,
}

/// Status badge shown next to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationBadge {
    pub kind: BadgeKind,
    pub label: String,
}

/// Body for a location-scoped people search against the REST API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub location: String,
    pub bucket: BucketKind,
}

/// Everything the UI needs to show where a user is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationView {
    pub resolved: ResolvedLocation,
    pub buckets: LocationBuckets,
    pub badge: LocationBadge,
    pub weather_location: Option<String>,
}

impl LocationView {
    pub fn build(user: &User, plans: &[TravelPlan], now: DateTime<Utc>) -> Self {
        let resolved = resolve_location(user, plans, now);
        let buckets = select_buckets(user, &resolved);
        let badge = badge_for(user, &resolved, &buckets);
        let weather_location = Some(normalize_place(&buckets.here_now)).filter(|s| !s.is_empty());

        Self {
            resolved,
            buckets,
            badge,
            weather_location,
        }
    }

    /// View for whoever the provider says is signed in
    pub fn for_current_user(
        provider: &impl CurrentUserProvider,
        plans: &[TravelPlan],
        clock: &impl Clock,
    ) -> Option<Self> {
        let user = provider.current_user()?;
        Some(Self::build(user, plans, clock.now()))
    }

    pub fn search_query(&self, bucket: BucketKind) -> SearchQuery {
        SearchQuery {
            location: self.buckets.get(bucket).to_string(),
            bucket,
        }
    }
}

fn badge_for(user: &User, resolved: &ResolvedLocation, buckets: &LocationBuckets) -> LocationBadge {
    match user.user_type {
        UserType::Business => LocationBadge {
            kind: BadgeKind::Business,
            label: with_place("Business", &buckets.here_now),
        },
        UserType::Local | UserType::Traveler => match &resolved.travel_to {
            Some(dest) if resolved.is_traveling => LocationBadge {
                kind: BadgeKind::Traveling,
                label: with_place("Traveling", city_of(dest)),
            },
            _ => LocationBadge {
                kind: BadgeKind::Local,
                label: with_place("Local", &buckets.here_now),
            },
        },
    }
}

fn with_place(prefix: &str, place: &str) -> String {
    if place.is_empty() {
        prefix.to_string()
    } else {
        format!("{} in {}", prefix, place)
    }
}
