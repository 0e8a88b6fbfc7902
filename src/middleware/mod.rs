pub mod errors;
pub mod whitelist;

pub use errors::{json_method_not_allowed, panic_response};
pub use whitelist::whitelist_middleware;
