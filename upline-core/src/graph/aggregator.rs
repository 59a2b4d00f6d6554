//! Referral Aggregation
//!
//! Counting and listing over the referral forest. The traversal
//! primitive only understands structure (edges and depth), so attribute
//! filters run as a second phase against the flattened descendant set.

use crate::constants::MAX_REFERRAL_DEPTH;
use crate::error::CoreResult;
use crate::graph::{AncestorRef, DescendantRef, ReferralGraph};
use crate::store::UserStore;
use crate::types::{Page, Paginated, User, UserId};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Attribute filter applied after traversal
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferralFilter {
    pub active_only: bool,
    pub created_after: Option<DateTime<Utc>>,
}

impl ReferralFilter {
    /// Filter to active users only
    pub fn active() -> Self {
        Self {
            active_only: true,
            created_after: None,
        }
    }

    /// Restrict to users created at or after `at`
    pub fn with_created_after(mut self, at: DateTime<Utc>) -> Self {
        self.created_after = Some(at);
        self
    }

    /// Whether a user record passes the filter
    pub fn matches(&self, user: &User) -> bool {
        if self.active_only && !user.is_active {
            return false;
        }
        if let Some(after) = self.created_after {
            if user.created_at < after {
                return false;
            }
        }
        true
    }
}

/// Aggregation over the referral forest
pub struct ReferralAggregator {
    users: Arc<dyn UserStore>,
    graph: ReferralGraph,
}

impl ReferralAggregator {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        let graph = ReferralGraph::new(users.clone());
        Self { users, graph }
    }

    /// Count of immediate children matching the filter
    pub async fn direct_count(&self, user_id: &UserId, filter: &ReferralFilter) -> CoreResult<u64> {
        let children = self.users.children_of(user_id).await?;
        let mut count = 0u64;
        for child in children {
            if let Some(user) = self.users.get(&child).await? {
                if filter.matches(&user) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// Count of all descendants down to `max_depth` matching the filter
    ///
    /// Two phases: structural traversal first, then the attribute filter
    /// over the flattened id set.
    pub async fn indirect_count(
        &self,
        user_id: &UserId,
        filter: &ReferralFilter,
        max_depth: u8,
    ) -> CoreResult<u64> {
        let descendants = self.graph.descendants(user_id, max_depth).await?;
        let mut count = 0u64;
        for descendant in descendants {
            if let Some(user) = self.users.get(&descendant.user_id).await? {
                if filter.matches(&user) {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    /// Flattened list of all descendants up to `depth`, each annotated
    /// with its distance from the root
    pub async fn all_referrals(
        &self,
        user_id: &UserId,
        depth: u8,
    ) -> CoreResult<Vec<DescendantRef>> {
        self.graph.descendants(user_id, depth).await
    }

    /// One page of descendants, optionally restricted to a single depth
    pub async fn referrals_page(
        &self,
        user_id: &UserId,
        depth_filter: Option<u8>,
        page: Page,
    ) -> CoreResult<Paginated<DescendantRef>> {
        let all = self.graph.descendants(user_id, MAX_REFERRAL_DEPTH).await?;
        let filtered: Vec<DescendantRef> = match depth_filter {
            Some(depth) => all.into_iter().filter(|d| d.depth == depth).collect(),
            None => all,
        };
        let total = filtered.len() as u64;
        let items = filtered
            .into_iter()
            .skip(page.offset())
            .take(page.page_size as usize)
            .collect();
        Ok(Paginated::new(items, page, total))
    }

    /// Ancestor chain used by credit propagation, each entry annotated
    /// with its distance from the starting user
    pub async fn parent_referrers(&self, user_id: &UserId) -> CoreResult<Vec<AncestorRef>> {
        self.graph.ancestors(user_id, MAX_REFERRAL_DEPTH).await
    }

    /// The underlying graph, for edge mutations
    pub fn graph(&self) -> &ReferralGraph {
        &self.graph
    }
}
