//! Referral Graph Traversal
//!
//! Breadth-first expansion over the referral forest through the
//! `UserStore` adjacency methods (`children_of`, `parent_of`). Depth is
//! tracked per node and bounded by the caller; the downward walk carries
//! no cycle guard because acyclicity is enforced when edges are written
//! (see [`ReferralGraph::assign_referrer`]).

use crate::constants::MAX_REFERRAL_DEPTH;
use crate::error::{CoreError, CoreResult};
use crate::store::UserStore;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// A descendant with its distance from the traversal root
///
/// Depth is 1-based: 1 is a direct child, 2 a grandchild, and so on. The
/// legacy encoding offset sub-levels by 2 to tell "direct" from "root";
/// this codebase uses the plain distance everywhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescendantRef {
    pub user_id: UserId,
    pub depth: u8,
}

/// An ancestor with its distance from the traversal start
///
/// Distance is 1-based: 1 is the direct referrer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorRef {
    pub user_id: UserId,
    pub distance: u8,
}

/// Traversal operations over the referral forest
pub struct ReferralGraph {
    users: Arc<dyn UserStore>,
}

impl ReferralGraph {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// All descendants of `root` down to `max_depth` hops, breadth-first
    pub async fn descendants(
        &self,
        root: &UserId,
        max_depth: u8,
    ) -> CoreResult<Vec<DescendantRef>> {
        let max_depth = max_depth.min(MAX_REFERRAL_DEPTH);
        let mut result = Vec::new();
        if max_depth == 0 {
            return Ok(result);
        }

        let mut queue: VecDeque<(UserId, u8)> = VecDeque::new();
        queue.push_back((root.clone(), 0));

        while let Some((user_id, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for child in self.users.children_of(&user_id).await? {
                result.push(DescendantRef {
                    user_id: child.clone(),
                    depth: depth + 1,
                });
                queue.push_back((child, depth + 1));
            }
        }

        Ok(result)
    }

    /// Ancestor chain of `start` up to `max_depth` hops
    pub async fn ancestors(&self, start: &UserId, max_depth: u8) -> CoreResult<Vec<AncestorRef>> {
        let max_depth = max_depth.min(MAX_REFERRAL_DEPTH);
        let mut result = Vec::new();
        let mut current = start.clone();

        for distance in 1..=max_depth {
            match self.users.parent_of(&current).await? {
                Some(parent) => {
                    result.push(AncestorRef {
                        user_id: parent.clone(),
                        distance,
                    });
                    current = parent;
                }
                None => break,
            }
        }

        Ok(result)
    }

    /// Write a referral edge, rejecting any edge that would close a cycle
    ///
    /// An edge `user -> referrer` creates a cycle exactly when `user`
    /// appears in the ancestor chain of `referrer` (or the two are the
    /// same user). The upward walk here is unbounded: a descendant
    /// deeper than the traversal cap still forms a cycle.
    pub async fn assign_referrer(&self, user_id: &UserId, referrer_id: &UserId) -> CoreResult<()> {
        if self.users.get(user_id).await?.is_none() {
            return Err(CoreError::not_found("User", user_id.as_str()));
        }
        if self.users.get(referrer_id).await?.is_none() {
            return Err(CoreError::not_found("User", referrer_id.as_str()));
        }

        if user_id == referrer_id {
            return Err(CoreError::ReferralCycle {
                user_id: user_id.as_str().to_string(),
                referrer_id: referrer_id.as_str().to_string(),
            });
        }

        let mut seen: HashSet<UserId> = HashSet::new();
        let mut current = referrer_id.clone();
        loop {
            if current == *user_id {
                return Err(CoreError::ReferralCycle {
                    user_id: user_id.as_str().to_string(),
                    referrer_id: referrer_id.as_str().to_string(),
                });
            }
            if !seen.insert(current.clone()) {
                return Err(CoreError::CorruptReferralChain {
                    user_id: referrer_id.as_str().to_string(),
                    repeated_id: current.as_str().to_string(),
                });
            }
            match self.users.parent_of(&current).await? {
                Some(parent) => current = parent,
                None => break,
            }
        }

        self.users.set_referrer(user_id, referrer_id).await
    }
}
