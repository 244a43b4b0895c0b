pub mod attendance;
pub mod notification;
pub mod role;
pub mod shift;
pub mod user;
