pub mod controller;
pub mod loop_worker;
pub mod state_machine;

pub use controller::AlarmMonitor;
pub use state_machine::{AlarmStateMachine, AudioAction, TickOutcome};
