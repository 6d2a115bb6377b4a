pub mod protocol;
pub mod session;
pub mod state;
pub mod timer_task;

pub use session::run;
pub use state::AppState;
