//! Promotion Lifecycle
//!
//! Lifecycle state is never stored. It is derived from the administrator override and the
//! validity window at the instant being asked about.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::promotions::PromotionDefinition;

/// Derived validity status of a promotion at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// Disabled by an administrator.
    Inactive,

    /// Enabled, but the window has not started.
    Scheduled,

    /// Enabled and inside the window.
    Active,

    /// Enabled, but the window has ended.
    Expired,
}

impl LifecycleState {
    /// Whether the promotion can be offered.
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => f.write_str("INACTIVE"),
            Self::Scheduled => f.write_str("SCHEDULED"),
            Self::Active => f.write_str("ACTIVE"),
            Self::Expired => f.write_str("EXPIRED"),
        }
    }
}

/// Derive the lifecycle state of a promotion at `now`.
///
/// Both window bounds are inclusive. Administrator disablement wins over the window.
pub fn lifecycle_state(promotion: &PromotionDefinition<'_>, now: Timestamp) -> LifecycleState {
    if !promotion.enabled_by_admin() {
        return LifecycleState::Inactive;
    }

    if now < promotion.valid_from() {
        return LifecycleState::Scheduled;
    }

    if now > promotion.valid_until() {
        return LifecycleState::Expired;
    }

    LifecycleState::Active
}

impl PromotionDefinition<'_> {
    /// Lifecycle state at `now`. See [`lifecycle_state`].
    pub fn state_at(&self, now: Timestamp) -> LifecycleState {
        lifecycle_state(self, now)
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use testresult::TestResult;

    use crate::{
        ids::ItemId,
        promotions::test_support::{combo, percentage},
    };

    use super::*;

    fn lunch() -> PromotionDefinition<'static> {
        combo("Lunch Combo", percentage(20), &[(ItemId::new(), 2)])
    }

    #[test]
    fn states_follow_validity_window() -> TestResult {
        let promo = lunch();

        assert_eq!(
            lifecycle_state(&promo, "2024-01-15T12:00:00Z".parse()?),
            LifecycleState::Active
        );
        assert_eq!(
            lifecycle_state(&promo, "2024-01-25T00:00:00Z".parse()?),
            LifecycleState::Expired
        );
        assert_eq!(
            lifecycle_state(&promo, "2024-01-05T00:00:00Z".parse()?),
            LifecycleState::Scheduled
        );

        Ok(())
    }

    #[test]
    fn disabled_promotion_is_always_inactive() -> TestResult {
        let promo = lunch().with_enabled(false);

        for now in [
            "2024-01-05T00:00:00Z",
            "2024-01-15T12:00:00Z",
            "2024-01-25T00:00:00Z",
        ] {
            assert_eq!(promo.state_at(now.parse()?), LifecycleState::Inactive);
        }

        Ok(())
    }

    #[test]
    fn window_bounds_are_inclusive() -> TestResult {
        let promo = lunch();
        let second = SignedDuration::from_secs(1);

        assert_eq!(promo.state_at(promo.valid_from()), LifecycleState::Active);
        assert_eq!(promo.state_at(promo.valid_until()), LifecycleState::Active);
        assert_eq!(
            promo.state_at(promo.valid_from().checked_sub(second)?),
            LifecycleState::Scheduled
        );
        assert_eq!(
            promo.state_at(promo.valid_until().checked_add(second)?),
            LifecycleState::Expired
        );

        Ok(())
    }

    #[test]
    fn states_never_regress_as_time_advances() -> TestResult {
        let promo = lunch();
        let start: Timestamp = "2024-01-01T00:00:00Z".parse()?;
        let step = SignedDuration::from_hours(7);

        let rank = |state: LifecycleState| match state {
            LifecycleState::Scheduled => 0,
            LifecycleState::Active => 1,
            LifecycleState::Expired => 2,
            LifecycleState::Inactive => 3,
        };

        let mut now = start;
        let mut last = rank(promo.state_at(now));

        for _ in 0..150 {
            now = now.checked_add(step)?;

            let current = rank(promo.state_at(now));

            assert!(current >= last, "state regressed at {now}");
            assert_ne!(current, 3, "enabled promotion reported inactive");

            last = current;
        }

        assert_eq!(last, 2);

        Ok(())
    }

    #[test]
    fn state_displays_as_tag() {
        assert_eq!(LifecycleState::Scheduled.to_string(), "SCHEDULED");
        assert!(LifecycleState::Active.is_active());
        assert!(!LifecycleState::Expired.is_active());
    }
}
