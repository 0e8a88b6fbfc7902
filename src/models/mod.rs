pub mod payment;
pub mod response;
pub mod vote;

pub use payment::*;
pub use response::*;
pub use vote::*;
