// Workflow module - the three token journeys
// Direct transfer, owner grants allowance, spender consumes allowance

mod error;
mod journey;
mod pending;
mod state;

pub use error::*;
pub use journey::*;
pub use pending::*;
pub use state::*;
