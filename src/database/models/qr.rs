use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scannable check-in token. `valid_until` is fully determined by the
/// time of day at generation (see `services::qr::token_expiry`).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QrToken {
    pub id: String,
    pub code: String,
    pub generated_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl QrToken {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.valid_until
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateQrRequest {
    pub code: String,
}
