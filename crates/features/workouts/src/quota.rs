use chrono::{DateTime, Datelike, Utc};
use trai_database::{Database, DatabaseError, DatabaseErrorExt};
use trai_derive::api_model;
use trai_domain::constants::AI_MONTHLY_LIMIT;
use trai_identity::UserRecord;
use trai_kernel::time;

/// AI workout generations left this calendar month.
#[api_model]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AiUsage {
    pub unlimited: bool,
    /// `None` for unlimited roles.
    pub limit: Option<i64>,
    pub used: i64,
    pub remaining: Option<i64>,
}

impl AiUsage {
    /// Usage as of `now`. A counter stamped in another month counts as zero.
    #[must_use]
    pub fn of(user: &UserRecord, now: DateTime<Utc>) -> Self {
        let used = if same_month(user.ai_generations_reset_at.as_deref(), now) {
            user.ai_generations_used.max(0)
        } else {
            0
        };
        if user.role().is_pro() {
            return Self { unlimited: true, limit: None, used, remaining: None };
        }
        Self {
            unlimited: false,
            limit: Some(AI_MONTHLY_LIMIT),
            used,
            remaining: Some((AI_MONTHLY_LIMIT - used).max(0)),
        }
    }

    #[must_use]
    pub const fn exhausted(&self) -> bool {
        matches!(self.remaining, Some(0))
    }
}

/// Atomic bookkeeping of the monthly counter on the `user` row.
#[derive(Debug, Clone, Copy)]
pub struct AiQuota;

impl AiQuota {
    /// Takes one generation for `now`'s month in a single conditional update.
    /// A counter stamped in an earlier month restarts at one. `false` when the
    /// limit is already used up.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn claim(
        db: &Database,
        user_id: &str,
        unlimited: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let claimed: Vec<String> = db
            .query(
                "UPDATE user SET \
                    ai_generations_used = IF string::starts_with(ai_generations_reset_at ?? '', $month) \
                        { (ai_generations_used ?? 0) + 1 } ELSE { 1 }, \
                    ai_generations_reset_at = $now \
                 WHERE key = $user AND ($unlimited \
                    OR !string::starts_with(ai_generations_reset_at ?? '', $month) \
                    OR (ai_generations_used ?? 0) < $limit) \
                 RETURN VALUE key",
            )
            .bind(("user", user_id.to_owned()))
            .bind(("unlimited", unlimited))
            .bind(("month", month_prefix(now)))
            .bind(("now", time::stamp(now)))
            .bind(("limit", AI_MONTHLY_LIMIT))
            .await
            .context("Claiming AI generation")?
            .take(0)
            .context("Decoding AI claim")?;
        Ok(!claimed.is_empty())
    }

    /// Gives back a claimed generation after a failed attempt.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn release(db: &Database, user_id: &str) -> Result<(), DatabaseError> {
        db.query("UPDATE user SET ai_generations_used -= 1 WHERE key = $user AND ai_generations_used > 0 RETURN NONE")
            .bind(("user", user_id.to_owned()))
            .await
            .context("Releasing AI generation")?
            .check()
            .context("Releasing AI generation")?;
        Ok(())
    }
}

/// `YYYY-MM-`, the prefix every stamp taken in `now`'s month starts with.
fn month_prefix(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-").to_string()
}

fn same_month(stamp: Option<&str>, now: DateTime<Utc>) -> bool {
    stamp
        .and_then(time::parse)
        .is_some_and(|at| at.year() == now.year() && at.month() == now.month())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(role: &str, used: i64, reset_at: Option<&str>) -> UserRecord {
        let mut user = UserRecord::new(
            "u1".into(),
            "Anna".into(),
            "anna@example.com".into(),
            "hash".into(),
            "2026-01-01T00:00:00Z".into(),
        );
        user.role = role.to_owned();
        user.ai_generations_used = used;
        user.ai_generations_reset_at = reset_at.map(str::to_owned);
        user
    }

    fn march() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).single().expect("valid date")
    }

    #[test]
    fn user_has_three_per_month() {
        let usage = AiUsage::of(&user("user", 1, Some("2026-03-02T10:00:00Z")), march());
        assert_eq!(usage, AiUsage { unlimited: false, limit: Some(3), used: 1, remaining: Some(2) });
        assert!(!usage.exhausted());
    }

    #[test]
    fn counter_resets_in_a_new_month() {
        let usage = AiUsage::of(&user("user", 3, Some("2026-02-27T10:00:00Z")), march());
        assert_eq!(usage.used, 0);
        assert_eq!(usage.remaining, Some(3));
    }

    #[test]
    fn counter_from_last_year_same_month_resets() {
        let usage = AiUsage::of(&user("user", 3, Some("2025-03-10T10:00:00Z")), march());
        assert_eq!(usage.used, 0);
    }

    #[test]
    fn limit_reached_is_exhausted() {
        let usage = AiUsage::of(&user("user", 3, Some("2026-03-01T00:00:00Z")), march());
        assert!(usage.exhausted());
        assert_eq!(usage.remaining, Some(0));
    }

    #[test]
    fn pro_and_admin_are_unlimited() {
        for role in ["pro", "admin"] {
            let usage = AiUsage::of(&user(role, 42, Some("2026-03-01T00:00:00Z")), march());
            assert!(usage.unlimited);
            assert_eq!(usage.limit, None);
            assert!(!usage.exhausted());
        }
    }

    #[test]
    fn month_prefix_matches_stamps() {
        assert_eq!(month_prefix(march()), "2026-03-");
        assert!(time::stamp(march()).starts_with(&month_prefix(march())));
        let january = Utc.with_ymd_and_hms(2027, 1, 2, 0, 0, 0).single().expect("valid date");
        assert_eq!(month_prefix(january), "2027-01-");
    }
}
