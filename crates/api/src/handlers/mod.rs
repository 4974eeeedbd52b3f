pub mod admin;
pub mod auth;
pub mod device;
pub mod event;
pub mod notification;
pub mod preference;
