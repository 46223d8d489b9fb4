//! Session timer state machine.

mod engine;

pub use engine::{SessionTimer, TimerState};
