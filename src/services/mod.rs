pub mod record_store;
pub mod vote_ledger;

pub use record_store::RecordStore;
pub use vote_ledger::{VoteLedger, VOTES_FILE};
