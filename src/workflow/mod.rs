pub mod slip_flow;
pub mod state;

pub use slip_flow::SlipFlow;
pub use state::{Confirmation, WorkflowState};
