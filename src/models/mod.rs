pub mod location;
pub mod notification;
pub mod punch;
pub mod punch_type;
pub mod remote;
