//! Decides whether a probe outcome represents an alert-worthy transition.

use chrono::{DateTime, Utc};

use super::types::{Check, CheckState, ProbeOutcome};

/// Fold a probe outcome into the check's persisted state.
///
/// Returns the updated check and whether an alert-worthy transition
/// occurred. The first observation after creation (state still `unknown`)
/// establishes a baseline silently, so freshly registered checks never
/// trigger an alert storm. `state` and `last_checked` are updated on every
/// call regardless of transition.
pub fn evaluate(check: &Check, outcome: &ProbeOutcome, now: DateTime<Utc>) -> (Check, bool) {
    let transitioned =
        outcome.observed_state != check.state && check.state != CheckState::Unknown;

    let mut updated = check.clone();
    updated.state = outcome.observed_state;
    updated.last_checked = Some(now);

    (updated, transitioned)
}

/// Human-readable summary handed to the notifier on a transition
pub fn alert_message(check: &Check) -> String {
    format!("Check for {} {} is now {}", check.method, check.target(), check.state)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::monitoring::types::{HttpMethod, Protocol};

    fn check_in(state: CheckState) -> Check {
        Check {
            id: "abcdefghij0123456789".to_string(),
            phone: "5551234567".to_string(),
            protocol: Protocol::Https,
            url: "example.com".to_string(),
            method: HttpMethod::Get,
            success_codes: BTreeSet::from([200, 201]),
            timeout_seconds: 3,
            state,
            last_checked: None,
        }
    }

    fn up_outcome(check: &Check) -> ProbeOutcome {
        ProbeOutcome::responded(check.id.clone(), 200, true)
    }

    fn down_outcome(check: &Check) -> ProbeOutcome {
        ProbeOutcome::failed(check.id.clone(), "timeout".to_string())
    }

    #[test]
    fn first_observation_is_a_silent_baseline() {
        let check = check_in(CheckState::Unknown);

        let (updated, transitioned) = evaluate(&check, &up_outcome(&check), Utc::now());
        assert!(!transitioned);
        assert_eq!(updated.state, CheckState::Up);

        let (updated, transitioned) = evaluate(&check, &down_outcome(&check), Utc::now());
        assert!(!transitioned);
        assert_eq!(updated.state, CheckState::Down);
    }

    #[test]
    fn up_to_down_transitions() {
        let check = check_in(CheckState::Up);
        let (updated, transitioned) = evaluate(&check, &down_outcome(&check), Utc::now());

        assert!(transitioned);
        assert_eq!(updated.state, CheckState::Down);
    }

    #[test]
    fn down_to_up_transitions() {
        let check = check_in(CheckState::Down);
        let outcome = ProbeOutcome::responded(check.id.clone(), 201, true);
        let (updated, transitioned) = evaluate(&check, &outcome, Utc::now());

        assert!(transitioned);
        assert_eq!(updated.state, CheckState::Up);
    }

    #[test]
    fn same_state_does_not_transition() {
        let check = check_in(CheckState::Up);
        let (_, transitioned) = evaluate(&check, &up_outcome(&check), Utc::now());
        assert!(!transitioned);
    }

    #[test]
    fn re_evaluating_the_same_outcome_is_idempotent() {
        let check = check_in(CheckState::Up);
        let outcome = down_outcome(&check);

        let (updated, transitioned) = evaluate(&check, &outcome, Utc::now());
        assert!(transitioned);

        let (again, transitioned) = evaluate(&updated, &outcome, Utc::now());
        assert!(!transitioned);
        assert_eq!(again.state, CheckState::Down);
    }

    #[test]
    fn last_checked_is_set_on_every_evaluation() {
        let check = check_in(CheckState::Up);
        let now = Utc::now();
        let (updated, _) = evaluate(&check, &up_outcome(&check), now);
        assert_eq!(updated.last_checked, Some(now));
    }

    #[test]
    fn alert_message_names_the_target_and_new_state() {
        let check = check_in(CheckState::Down);
        assert_eq!(
            alert_message(&check),
            "Check for GET https://example.com is now down"
        );
    }
}
