pub mod broadcast;
pub mod calendar_event;
pub mod device_token;
pub mod inbox;
pub mod role;
pub mod session;
pub mod user;
