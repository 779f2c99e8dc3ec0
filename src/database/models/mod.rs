pub mod attendance;
pub mod qr;
pub mod user;
pub mod vacation;

pub use attendance::{
    AttendanceHistoryEntry, AttendanceRecord, AttendanceRecordWithBreaks, BreakInterval,
};
pub use qr::{QrToken, ValidateQrRequest};
pub use user::{CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest, User, UserInfo, UserRole};
pub use vacation::{ResolutionRequest, VacationRequest, VacationRequestInput, VacationStatus};
