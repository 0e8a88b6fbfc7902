pub mod fallback;
pub mod health;
pub mod payload;
pub mod payments;
pub mod state;
pub mod votes;
pub mod webhook;

pub use fallback::*;
pub use health::*;
pub use payments::*;
pub use state::*;
pub use votes::*;
pub use webhook::*;
