use serde::Serialize;
use std::fmt;

use crate::types::{ResolvedLocation, User};

/// Named scope for a location-based user search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    /// Who is physically in this place right now
    HereNow,
    /// People whose permanent home is this place
    Locals,
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HereNow => write!(f, "who is here now"),
            Self::Locals => write!(f, "permanent locals from my area"),
        }
    }
}

/// Location keys for both buckets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationBuckets {
    pub here_now: String,
    pub locals: String,
}

impl LocationBuckets {
    pub fn get(&self, kind: BucketKind) -> &str {
        match kind {
            BucketKind::HereNow => &self.here_now,
            BucketKind::Locals => &self.locals,
        }
    }
}

/// Build both bucket keys for a user.
///
/// Business accounts are pinned to their business location in both buckets,
/// whatever their travel plans say.
pub fn select_buckets(user: &User, resolved: &ResolvedLocation) -> LocationBuckets {
    let home = home_place(user, resolved);

    if user.is_business() {
        let business = user
            .location_override()
            .map(str::to_string)
            .unwrap_or(home);
        return LocationBuckets {
            here_now: business.clone(),
            locals: business,
        };
    }

    let here_now = match (&resolved.travel_to, resolved.is_traveling) {
        (Some(dest), true) => dest.clone(),
        _ => home.clone(),
    };

    LocationBuckets {
        here_now,
        locals: home,
    }
}

/// Formatted hometown, falling back to the free-text location override
fn home_place(user: &User, resolved: &ResolvedLocation) -> String {
    if !resolved.hometown.is_empty() {
        return resolved.hometown.clone();
    }
    user.location_override().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserType;

    fn user(user_type: UserType) -> User {
        User {
            id: 1,
            username: "sam".into(),
            user_type,
            hometown_city: Some("Austin".into()),
            hometown_state: Some("TX".into()),
            hometown_country: Some("USA".into()),
            location: None,
        }
    }

    fn traveling(dest: &str) -> ResolvedLocation {
        ResolvedLocation {
            is_traveling: true,
            travel_to: Some(dest.into()),
            hometown: "Austin, TX".into(),
        }
    }

    fn home() -> ResolvedLocation {
        ResolvedLocation {
            is_traveling: false,
            travel_to: None,
            hometown: "Austin, TX".into(),
        }
    }

    #[test]
    fn test_traveler_here_now_is_destination() {
        let buckets = select_buckets(&user(UserType::Traveler), &traveling("Paris, France"));
        assert_eq!(buckets.here_now, "Paris, France");
        assert_eq!(buckets.locals, "Austin, TX");
    }

    #[test]
    fn test_at_home_both_buckets_hometown() {
        let buckets = select_buckets(&user(UserType::Local), &home());
        assert_eq!(buckets.get(BucketKind::HereNow), "Austin, TX");
        assert_eq!(buckets.get(BucketKind::Locals), "Austin, TX");
    }

    #[test]
    fn test_business_ignores_travel() {
        let mut biz = user(UserType::Business);
        biz.location = Some("123 Congress Ave, Austin, TX".into());
        let buckets = select_buckets(&biz, &traveling("Paris, France"));
        assert_eq!(buckets.here_now, "123 Congress Ave, Austin, TX");
        assert_eq!(buckets.locals, "123 Congress Ave, Austin, TX");
    }

    #[test]
    fn test_business_without_address_uses_hometown() {
        let buckets = select_buckets(&user(UserType::Business), &traveling("Paris, France"));
        assert_eq!(buckets.here_now, "Austin, TX");
        assert_eq!(buckets.locals, "Austin, TX");
    }

    #[test]
    fn test_missing_hometown_falls_back_to_override() {
        let mut u = user(UserType::Local);
        u.hometown_city = None;
        u.location = Some("Boise, ID".into());
        let resolved = ResolvedLocation {
            is_traveling: false,
            travel_to: None,
            hometown: String::new(),
        };
        let buckets = select_buckets(&u, &resolved);
        assert_eq!(buckets.here_now, "Boise, ID");
        assert_eq!(buckets.locals, "Boise, ID");
    }

    #[test]
    fn test_bucket_kind_display() {
        assert_eq!(BucketKind::HereNow.to_string(), "who is here now");
        assert_eq!(
            serde_json::to_string(&BucketKind::Locals).unwrap(),
            "\"locals\""
        );
    }
}
