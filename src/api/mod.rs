pub mod attendance;
pub mod dashboard;
pub mod notification;
pub mod shift;
