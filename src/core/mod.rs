pub mod calculator;
pub mod clock;
pub mod context;
pub mod log;
pub mod monitor;
pub mod report;
pub mod scheduler;
pub mod session;
pub mod state_machine;
pub mod store;
pub mod sync;
