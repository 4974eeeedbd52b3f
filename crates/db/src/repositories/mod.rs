pub mod broadcast_repo;
pub mod calendar_event_repo;
pub mod device_token_repo;
pub mod inbox_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;

pub use broadcast_repo::BroadcastRepo;
pub use calendar_event_repo::CalendarEventRepo;
pub use device_token_repo::DeviceTokenRepo;
pub use inbox_repo::InboxRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
