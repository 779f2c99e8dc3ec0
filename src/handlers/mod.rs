pub mod attendance;
pub mod auth;
pub mod qr;
pub mod shared;
pub mod stats;
pub mod users;
pub mod vacation;
