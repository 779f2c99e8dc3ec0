pub mod attendance;
pub mod qr_token;
pub mod stats;
pub mod user;
pub mod vacation;

pub use attendance::AttendanceRepository;
pub use qr_token::QrTokenRepository;
pub use stats::StatsRepository;
pub use user::UserRepository;
pub use vacation::VacationRepository;
