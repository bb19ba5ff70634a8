//! # Campaign Lifecycle
//!
//! The campaign state machine, expressed over *observed* states.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   draft ──────────► scheduled ──────► active ◄──────► paused            │
//! │     │    (future       │   │            │               │               │
//! │     │     start)       │   └──► paused  │               │               │
//! │     │                  │                ▼               │               │
//! │     ├──────────────────┼──────────► completed           │               │
//! │     │ (draft→active)   │                                │               │
//! │     ▼                  ▼                                ▼               │
//! │  cancelled ◄───────────┴───────── (any non-terminal) ───┘               │
//! │                                                                         │
//! │  "scheduled" is never stored: it is draft + start_date > now.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::CampaignStatus;

/// Status as observed at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Draft,
    Scheduled,
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl LifecycleState {
    pub const ALL: [LifecycleState; 6] = [
        LifecycleState::Draft,
        LifecycleState::Scheduled,
        LifecycleState::Active,
        LifecycleState::Paused,
        LifecycleState::Completed,
        LifecycleState::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Draft => "draft",
            LifecycleState::Scheduled => "scheduled",
            LifecycleState::Active => "active",
            LifecycleState::Paused => "paused",
            LifecycleState::Completed => "completed",
            LifecycleState::Cancelled => "cancelled",
        }
    }

    /// States reachable from this one by a seller request.
    pub const fn allowed_targets(&self) -> &'static [LifecycleState] {
        use LifecycleState::*;
        match self {
            Draft => &[Scheduled, Active, Cancelled],
            Scheduled => &[Active, Paused, Cancelled],
            Active => &[Paused, Completed, Cancelled],
            Paused => &[Active, Cancelled],
            Completed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Completed | LifecycleState::Cancelled)
    }

    /// The status actually written when this state is the target.
    pub const fn persisted(&self) -> CampaignStatus {
        match self {
            LifecycleState::Draft | LifecycleState::Scheduled => CampaignStatus::Draft,
            LifecycleState::Active => CampaignStatus::Active,
            LifecycleState::Paused => CampaignStatus::Paused,
            LifecycleState::Completed => CampaignStatus::Completed,
            LifecycleState::Cancelled => CampaignStatus::Cancelled,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Projects a persisted status onto what callers observe at `now`.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, Utc};
/// use promo_core::lifecycle::{observed_status, LifecycleState};
/// use promo_core::CampaignStatus;
///
/// let now = Utc::now();
/// let tomorrow = now + Duration::days(1);
///
/// assert_eq!(observed_status(CampaignStatus::Draft, tomorrow, now), LifecycleState::Scheduled);
/// assert_eq!(observed_status(CampaignStatus::Draft, now, now), LifecycleState::Draft);
/// ```
pub fn observed_status(
    persisted: CampaignStatus,
    start_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> LifecycleState {
    match persisted {
        CampaignStatus::Draft if start_date > now => LifecycleState::Scheduled,
        CampaignStatus::Draft => LifecycleState::Draft,
        CampaignStatus::Active => LifecycleState::Active,
        CampaignStatus::Paused => LifecycleState::Paused,
        CampaignStatus::Completed => LifecycleState::Completed,
        CampaignStatus::Cancelled => LifecycleState::Cancelled,
    }
}

/// Decides a seller-requested transition.
///
/// Returns the status to persist, or `InvalidTransition` when the table does
/// not allow `target` from the observed state. A `Scheduled` target is only
/// accepted while the start date is still ahead, since a draft whose start has
/// passed would be observed as plain draft again.
pub fn plan_transition(
    persisted: CampaignStatus,
    start_date: DateTime<Utc>,
    target: LifecycleState,
    now: DateTime<Utc>,
) -> Result<CampaignStatus, CoreError> {
    let current = observed_status(persisted, start_date, now);

    let invalid = || CoreError::InvalidTransition {
        from: current,
        to: target,
    };

    if !current.can_transition_to(target) {
        return Err(invalid());
    }

    if target == LifecycleState::Scheduled && start_date <= now {
        return Err(invalid());
    }

    Ok(target.persisted())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// Persisted status + start date that produce each observed state.
    fn setup(state: LifecycleState, now: DateTime<Utc>) -> (CampaignStatus, DateTime<Utc>) {
        let past = now - Duration::days(1);
        let future = now + Duration::days(1);
        match state {
            LifecycleState::Draft => (CampaignStatus::Draft, past),
            LifecycleState::Scheduled => (CampaignStatus::Draft, future),
            LifecycleState::Active => (CampaignStatus::Active, past),
            // Paused with a future start exercises the scheduled→paused path too
            LifecycleState::Paused => (CampaignStatus::Paused, future),
            LifecycleState::Completed => (CampaignStatus::Completed, past),
            LifecycleState::Cancelled => (CampaignStatus::Cancelled, past),
        }
    }

    #[test]
    fn test_observed_status_projection() {
        let now = Utc::now();
        for state in LifecycleState::ALL {
            let (persisted, start) = setup(state, now);
            assert_eq!(observed_status(persisted, start, now), state);
        }
    }

    #[test]
    fn test_draft_at_exact_start_is_not_scheduled() {
        let now = Utc::now();
        assert_eq!(
            observed_status(CampaignStatus::Draft, now, now),
            LifecycleState::Draft
        );
    }

    #[test]
    fn test_transition_table_exhaustive() {
        let now = Utc::now();

        for from in LifecycleState::ALL {
            for to in LifecycleState::ALL {
                let (persisted, start) = setup(from, now);
                let result = plan_transition(persisted, start, to, now);
                let start_passed = to == LifecycleState::Scheduled && start <= now;

                if from.can_transition_to(to) && !start_passed {
                    let stored = result.unwrap_or_else(|e| panic!("{from} -> {to}: {e}"));
                    // The derived status after the write must be the target
                    assert_eq!(observed_status(stored, start, now), to, "{from} -> {to}");
                } else {
                    assert!(
                        matches!(result, Err(CoreError::InvalidTransition { .. })),
                        "{from} -> {to} should be rejected"
                    );
                }
            }
        }
    }

    #[test]
    fn test_draft_to_scheduled_requires_future_start() {
        let now = Utc::now();
        let result = plan_transition(
            CampaignStatus::Draft,
            now - Duration::hours(1),
            LifecycleState::Scheduled,
            now,
        );
        assert!(matches!(result, Err(CoreError::InvalidTransition { .. })));
    }

    #[test]
    fn test_terminal_states_have_no_targets() {
        assert!(LifecycleState::Completed.allowed_targets().is_empty());
        assert!(LifecycleState::Cancelled.allowed_targets().is_empty());
        assert!(LifecycleState::Completed.is_terminal());
    }

    #[test]
    fn test_scheduled_persists_as_draft() {
        assert_eq!(LifecycleState::Scheduled.persisted(), CampaignStatus::Draft);
        assert_eq!(LifecycleState::Paused.persisted(), CampaignStatus::Paused);
    }
}
