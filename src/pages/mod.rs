mod auth;
mod dashboard;
mod katas;
mod movement;
mod parent;

pub use auth::{Login, Register};
pub use dashboard::Dashboard;
pub use katas::Katas;
pub use movement::MovementTracker;
pub use parent::Parent;
