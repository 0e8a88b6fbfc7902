use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature id -> upvote count. Ordered so `votes.json` is stable on disk.
pub type VoteTally = BTreeMap<String, u64>;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct VoteResponse {
    pub status: String,
    pub upvotes: u64,
}

impl VoteResponse {
    pub fn success(upvotes: u64) -> Self {
        Self {
            status: "success".to_string(),
            upvotes,
        }
    }
}
