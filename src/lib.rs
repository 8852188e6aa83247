pub mod api;
pub mod bucket;
pub mod clock;
pub mod config;
pub mod current_user;
pub mod dates;
pub mod place;
pub mod presentation;
pub mod resolver;
pub mod store;
pub mod types;

pub use bucket::{BucketKind, LocationBuckets, select_buckets};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{PollingIntervals, ServerConfig};
pub use current_user::{CurrentUserProvider, StaticUser};
pub use place::{format_place, normalize_place};
pub use presentation::{BadgeKind, LocationBadge, LocationView, SearchQuery};
pub use resolver::{TravelStatus, resolve_location, resolve_travel_status};
pub use store::{ApiStore, MemoryStore, Store, TravelPlanStore};
pub use types::{PlanStatus, ResolvedLocation, TravelPlan, User, UserType};
