use std::collections::HashMap;
use std::sync::Arc;

use crate::database::models::{
    AttendanceHistoryEntry, AttendanceRecord, BreakInterval, UserInfo,
};
use crate::database::repositories::{AttendanceRepository, UserRepository};
use crate::error::AppError;
use crate::services::clock::Clock;
use crate::services::qr::QrService;
use crate::services::timesheet;

/// Per-user attendance state machine:
/// `CheckedOut -> CheckedIn -> OnBreak -> CheckedIn -> CheckedOut`.
///
/// Every transition is QR-gated: the submitted code is validated first and
/// nothing is mutated when validation fails. The storage layer serializes
/// the transition itself, so two concurrent check-ins cannot both pass the
/// "no open record" check.
#[derive(Clone)]
pub struct AttendanceService {
    attendance_repo: AttendanceRepository,
    user_repo: UserRepository,
    qr_service: QrService,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(
        attendance_repo: AttendanceRepository,
        user_repo: UserRepository,
        qr_service: QrService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            attendance_repo,
            user_repo,
            qr_service,
            clock,
        }
    }

    pub async fn check_in(&self, user_id: &str, code: &str) -> Result<AttendanceRecord, AppError> {
        self.qr_service.validate(code).await?;

        let record = self
            .attendance_repo
            .check_in(user_id, self.clock.now())
            .await?;
        log::info!("User {} checked in at {}", user_id, record.check_in_time);

        Ok(record)
    }

    pub async fn check_out(&self, user_id: &str, code: &str) -> Result<AttendanceRecord, AppError> {
        self.qr_service.validate(code).await?;

        let record = self
            .attendance_repo
            .check_out(user_id, self.clock.now())
            .await?;
        log::info!(
            "User {} checked out, total hours: {:?}",
            user_id,
            record.total_hours
        );

        Ok(record)
    }

    pub async fn start_break(&self, user_id: &str, code: &str) -> Result<BreakInterval, AppError> {
        self.qr_service.validate(code).await?;

        let interval = self
            .attendance_repo
            .start_break(user_id, self.clock.now())
            .await?;
        log::info!("User {} started a break at {}", user_id, interval.start_time);

        Ok(interval)
    }

    pub async fn end_break(&self, user_id: &str, code: &str) -> Result<BreakInterval, AppError> {
        self.qr_service.validate(code).await?;

        let interval = self
            .attendance_repo
            .end_break(user_id, self.clock.now())
            .await?;
        log::info!("User {} ended a break", user_id);

        Ok(interval)
    }

    /// History (newest first), each record annotated with its breaks, the
    /// owning user, and the derived hour metrics.
    pub async fn history(
        &self,
        user_id: Option<&str>,
    ) -> Result<Vec<AttendanceHistoryEntry>, AppError> {
        let records = self.attendance_repo.list_records(user_id).await?;

        let users: HashMap<String, UserInfo> = self
            .user_repo
            .get_all_users()
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), UserInfo::from(u)))
            .collect();

        Ok(records
            .into_iter()
            .map(|loaded| {
                let user = users.get(&loaded.record.user_id).cloned();
                timesheet::history_entry(loaded, user)
            })
            .collect())
    }
}
