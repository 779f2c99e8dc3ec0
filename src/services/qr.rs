use std::sync::Arc;

use chrono::{DateTime, Days, FixedOffset, Timelike, Utc};
use uuid::Uuid;

use crate::database::models::QrToken;
use crate::database::repositories::QrTokenRepository;
use crate::error::AppError;
use crate::services::clock::Clock;

/// A token generated before this local hour expires the same day at this
/// hour; anything at or after it expires the next morning.
const AFTERNOON_CUTOVER_HOUR: u32 = 15;
const NEXT_MORNING_HOUR: u32 = 8;

const CODE_LEN: usize = 64;

/// Expiry boundary for a token generated at `now`, evaluated in the fixed
/// reference offset. The branch is chosen on hour granularity only; minutes
/// and seconds merely ride along into the day choice. Exactly 15:00 local
/// takes the overnight branch.
pub fn token_expiry(now: DateTime<Utc>, tz: FixedOffset) -> DateTime<Utc> {
    let local = now.with_timezone(&tz);

    let (expiry_date, expiry_hour) = if local.hour() < AFTERNOON_CUTOVER_HOUR {
        (Some(local.date_naive()), AFTERNOON_CUTOVER_HOUR)
    } else {
        (
            local.date_naive().checked_add_days(Days::new(1)),
            NEXT_MORNING_HOUR,
        )
    };

    expiry_date
        .and_then(|date| date.and_hms_opt(expiry_hour, 0, 0))
        .and_then(|naive| naive.and_local_timezone(tz).single())
        .map(|local_expiry| local_expiry.with_timezone(&Utc))
        .expect("expiry anchor is a valid wall-clock time in a fixed offset")
}

/// Generate an unguessable token code from the process CSPRNG.
fn generate_code() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ\
                                abcdefghijklmnopqrstuvwxyz\
                                0123456789";
    let mut rng = rand::rng();

    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Token lifecycle: generation with the two-slot expiry calendar, lazy
/// regeneration when no token is valid, and strict validity checks.
#[derive(Clone)]
pub struct QrService {
    repo: QrTokenRepository,
    clock: Arc<dyn Clock>,
    tz: FixedOffset,
}

impl QrService {
    pub fn new(repo: QrTokenRepository, clock: Arc<dyn Clock>, tz: FixedOffset) -> Self {
        Self { repo, clock, tz }
    }

    /// Mint and persist a fresh token, pruning ones whose window has closed.
    pub async fn generate(&self) -> Result<QrToken, AppError> {
        let now = self.clock.now();

        let pruned = self.repo.cleanup_expired(now).await?;
        if pruned > 0 {
            log::debug!("Pruned {} expired QR tokens", pruned);
        }

        let token = QrToken {
            id: Uuid::new_v4().to_string(),
            code: generate_code(),
            generated_at: now,
            valid_until: token_expiry(now, self.tz),
        };

        let token = self.repo.insert(&token).await?;
        log::info!("Generated QR token valid until {}", token.valid_until);

        Ok(token)
    }

    /// Currently valid token, minting one on demand when none exists. No
    /// background timer; regeneration happens lazily on read.
    pub async fn current(&self) -> Result<QrToken, AppError> {
        let now = self.clock.now();

        match self.repo.find_active(now).await? {
            Some(token) => Ok(token),
            None => {
                log::info!("No active QR token, generating a new one");
                self.generate().await
            }
        }
    }

    /// Accept a scanned code iff it exists and its validity window has not
    /// closed.
    pub async fn validate(&self, code: &str) -> Result<QrToken, AppError> {
        let now = self.clock.now();

        self.repo
            .find_valid(code, now)
            .await?
            .ok_or(AppError::InvalidOrExpiredToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn belgrade() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    fn local(h: u32, m: u32) -> DateTime<Utc> {
        belgrade()
            .with_ymd_and_hms(2025, 6, 3, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn local_next_day(h: u32, m: u32) -> DateTime<Utc> {
        belgrade()
            .with_ymd_and_hms(2025, 6, 4, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn morning_token_expires_same_day_at_fifteen() {
        assert_eq!(token_expiry(local(8, 30), belgrade()), local(15, 0));
        assert_eq!(token_expiry(local(14, 59), belgrade()), local(15, 0));
    }

    #[test]
    fn exactly_fifteen_takes_the_overnight_branch() {
        assert_eq!(token_expiry(local(15, 0), belgrade()), local_next_day(8, 0));
    }

    #[test]
    fn evening_token_expires_next_morning_at_eight() {
        assert_eq!(token_expiry(local(15, 1), belgrade()), local_next_day(8, 0));
        assert_eq!(token_expiry(local(23, 0), belgrade()), local_next_day(8, 0));
    }

    #[test]
    fn branch_ignores_minutes_and_seconds() {
        // 14:59 and 14:00 land on the same boundary.
        assert_eq!(
            token_expiry(local(14, 59), belgrade()),
            token_expiry(local(14, 0), belgrade())
        );
    }

    #[test]
    fn expiry_is_evaluated_in_the_reference_offset() {
        // 13:30 UTC is 15:30 in UTC+2: already past the cutover there.
        let now = Utc.with_ymd_and_hms(2025, 6, 3, 13, 30, 0).unwrap();
        assert_eq!(token_expiry(now, belgrade()), local_next_day(8, 0));
    }

    #[test]
    fn generated_codes_are_long_and_distinct() {
        let a = generate_code();
        let b = generate_code();
        assert_eq!(a.len(), CODE_LEN);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
