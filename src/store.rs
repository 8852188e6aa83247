//! Sources of users and travel plans.
//!
//! The REST API owns this data; [`ApiStore`] reads it over HTTP. For local
//! runs and tests, [`MemoryStore`] keeps the same records in process behind
//! an `Arc<RwLock<>>`, so clones share one view and many readers can resolve
//! locations while plan edits take the write lock.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use anyhow::{Context, Result};
use serde::Deserialize;
use wreq::Client;

use crate::types::{TravelPlan, User};

/// Read access to users and their travel plans
pub trait TravelPlanStore: Send + Sync {
    fn travel_plans(&self, user_id: i64) -> impl Future<Output = Result<Vec<TravelPlan>>> + Send;

    fn user(&self, user_id: i64) -> impl Future<Output = Result<Option<User>>> + Send;
}

/// Fetch a user and their plans concurrently.
///
/// A failed plan fetch degrades to an empty list so the user still resolves
/// as "at home". Returns `Ok(None)` when the user does not exist.
pub async fn load_user_with_plans<S: TravelPlanStore>(
    store: &S,
    user_id: i64,
) -> Result<Option<(User, Vec<TravelPlan>)>> {
    let (user, plans) = futures::join!(store.user(user_id), store.travel_plans(user_id));

    let Some(user) = user.with_context(|| format!("Failed to load user {}", user_id))? else {
        return Ok(None);
    };

    let plans = plans.unwrap_or_else(|e| {
        tracing::warn!("Failed to load travel plans for user {}: {:#}", user_id, e);
        Vec::new()
    });

    Ok(Some((user, plans)))
}

/// In-process store shared across all clones
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    users: HashMap<i64, User>,
    plans: HashMap<i64, Vec<TravelPlan>>,
    next_plan_id: i64,
}

/// Seed file layout: `{"users": [...], "travelPlans": [...]}`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub travel_plans: Vec<TravelPlan>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load users and plans from a JSON seed file.
    ///
    /// Plans without a `userId` cannot be attributed to anyone and are skipped.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let seed: Seed = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

        let store = Self::new();
        store.load_seed(seed).await;
        Ok(store)
    }

    pub async fn load_seed(&self, seed: Seed) {
        let user_count = seed.users.len();
        for user in seed.users {
            self.insert_user(user).await;
        }

        let mut plan_count = 0;
        for plan in seed.travel_plans {
            match plan.user_id {
                Some(owner) => {
                    if self.add_plan(owner, plan).await.is_some() {
                        plan_count += 1;
                    }
                }
                None => tracing::warn!("Skipping seed plan to '{}' with no userId", plan.destination),
            }
        }

        tracing::info!("Seeded memory store: {} users, {} travel plans", user_count, plan_count);
    }

    pub async fn insert_user(&self, user: User) {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.id, user);
    }

    /// Add a plan owned by `owner`, returning its id.
    ///
    /// Keeps the plan's own id when it has one; otherwise assigns the next
    /// free id. Returns `None` if the id is already taken or ids are exhausted.
    pub async fn add_plan(&self, owner: i64, mut plan: TravelPlan) -> Option<i64> {
        let mut inner = self.inner.write().await;
        let id = match plan.id {
            Some(id) => id,
            None => {
                let Some(next) = inner.next_plan_id.checked_add(1) else {
                    tracing::warn!("Travel plan ids exhausted, rejecting plan for user {}", owner);
                    return None;
                };
                next
            }
        };

        if inner.plans.values().flatten().any(|p| p.id == Some(id)) {
            tracing::warn!("Rejecting travel plan with duplicate id {}", id);
            return None;
        }
        inner.next_plan_id = inner.next_plan_id.max(id);

        plan.id = Some(id);
        plan.user_id = Some(owner);
        inner.plans.entry(owner).or_default().push(plan);
        Some(id)
    }

    /// Replace one of `owner`'s plans. Returns false if `owner` has no plan
    /// with that id.
    pub async fn update_plan(&self, owner: i64, plan_id: i64, mut plan: TravelPlan) -> bool {
        let mut inner = self.inner.write().await;
        let Some(slot) = inner
            .plans
            .get_mut(&owner)
            .and_then(|plans| plans.iter_mut().find(|p| p.id == Some(plan_id)))
        else {
            return false;
        };

        plan.id = Some(plan_id);
        plan.user_id = Some(owner);
        *slot = plan;
        true
    }

    /// Delete one of `owner`'s plans. Returns false if nothing was removed.
    pub async fn delete_plan(&self, owner: i64, plan_id: i64) -> bool {
        let mut inner = self.inner.write().await;
        let Some(plans) = inner.plans.get_mut(&owner) else {
            return false;
        };
        let before = plans.len();
        plans.retain(|p| p.id != Some(plan_id));
        plans.len() != before
    }
}

impl TravelPlanStore for MemoryStore {
    async fn travel_plans(&self, user_id: i64) -> Result<Vec<TravelPlan>> {
        let inner = self.inner.read().await;
        Ok(inner.plans.get(&user_id).cloned().unwrap_or_default())
    }

    async fn user(&self, user_id: i64) -> Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&user_id).cloned())
    }
}

/// Store backed by the Nearby Traveler REST API
#[derive(Clone)]
pub struct ApiStore {
    http_client: Client,
    base_url: String,
}

impl ApiStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl TravelPlanStore for ApiStore {
    async fn travel_plans(&self, user_id: i64) -> Result<Vec<TravelPlan>> {
        let url = format!("{}/api/travel-plans/{}", self.base_url, user_id);
        tracing::debug!("GET {}", url);

        let plans = self
            .http_client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()?
            .json::<Vec<TravelPlan>>()
            .await
            .context("Invalid travel plans payload")?;

        Ok(plans)
    }

    async fn user(&self, user_id: i64) -> Result<Option<User>> {
        let url = format!("{}/api/users/{}", self.base_url, user_id);
        tracing::debug!("GET {}", url);

        let resp = self
            .http_client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        if resp.status().as_u16() == 404 {
            return Ok(None);
        }

        let user = resp
            .error_for_status()?
            .json::<User>()
            .await
            .context("Invalid user payload")?;

        Ok(Some(user))
    }
}

/// Store selected at startup
#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Api(ApiStore),
}

impl TravelPlanStore for Store {
    async fn travel_plans(&self, user_id: i64) -> Result<Vec<TravelPlan>> {
        match self {
            Store::Memory(store) => store.travel_plans(user_id).await,
            Store::Api(store) => store.travel_plans(user_id).await,
        }
    }

    async fn user(&self, user_id: i64) -> Result<Option<User>> {
        match self {
            Store::Memory(store) => store.user(user_id).await,
            Store::Api(store) => store.user(user_id).await,
        }
    }
}
