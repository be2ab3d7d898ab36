use crate::models::{CheckOutcome, StateFields, Status};

/// Applies one new outcome to `state`, given the last five outcomes
/// *inclusive* of the one just appended (spec.md §9 resolves the ambiguity
/// this way). Returns the updated fields and whether `current_status`
/// changed. Pure and total — this is the one component the spec requires to
/// never fail.
pub fn apply(state: StateFields, last_five_inclusive: &[CheckOutcome], is_up: bool) -> (StateFields, bool) {
    let is_flapping = if last_five_inclusive.len() >= 5 {
        let ups = last_five_inclusive.iter().filter(|o| o.up).count();
        ups == 2 || ups == 3
    } else {
        false
    };

    let (consecutive_up_count, consecutive_down_count) = if is_up {
        (state.consecutive_up_count + 1, 0)
    } else {
        (0, state.consecutive_down_count + 1)
    };

    let new_status = if is_flapping {
        Status::Flapping
    } else if consecutive_up_count >= 3 {
        Status::Up
    } else if consecutive_down_count >= 3 {
        Status::Down
    } else {
        state.current_status
    };

    let status_changed = new_status != state.current_status;

    let new_state = StateFields {
        current_status: new_status,
        consecutive_up_count,
        consecutive_down_count,
        is_flapping,
    };

    (new_state, status_changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes(ups_downs: &[bool]) -> Vec<CheckOutcome> {
        // caller passes oldest-first; the store returns newest-first, so
        // reverse before windowing, same as `recent()` would hand us.
        ups_downs.iter().rev().map(|&up| CheckOutcome { up }).collect()
    }

    /// Runs a whole stream oldest-first through the state machine, as the
    /// store would: after each append, the "last five" window is whatever
    /// outcomes exist so far (capped at five, newest first).
    fn run(stream: &[bool]) -> (StateFields, bool, bool) {
        let mut state = StateFields::default();
        let mut history: Vec<bool> = Vec::new();
        let mut changed_at_least_once = false;
        let mut changed_twice_or_more = false;
        let mut change_count = 0;
        for &up in stream {
            history.push(up);
            let window_start = history.len().saturating_sub(5);
            let window = outcomes(&history[window_start..]);
            let (next, changed) = apply(state, &window, up);
            state = next;
            if changed {
                change_count += 1;
                changed_at_least_once = true;
            }
        }
        changed_twice_or_more = change_count >= 2;
        (state, changed_at_least_once, changed_twice_or_more)
    }

    #[test]
    fn s1_three_downs() {
        let (state, _, _) = run(&[false, false, false]);
        assert_eq!(state.current_status, Status::Down);
        assert!(!state.is_flapping);
    }

    #[test]
    fn s2_three_ups() {
        let (state, _, _) = run(&[true, true, true]);
        assert_eq!(state.current_status, Status::Up);
        assert!(!state.is_flapping);
    }

    #[test]
    fn s3_two_ups_only() {
        let (state, _, _) = run(&[true, true]);
        assert_eq!(state.current_status, Status::Unknown);
        assert!(!state.is_flapping);
    }

    #[test]
    fn s4_alternating_is_flapping() {
        let (state, _, _) = run(&[true, false, true, false, true]);
        assert_eq!(state.current_status, Status::Flapping);
        assert!(state.is_flapping);
    }

    #[test]
    fn s5_recovers_to_up_after_downs() {
        // Invariant 2 allows a DOWN->UP recovery to pass through an
        // explicit FLAPPING phase while the five-wide window still holds
        // both downs and ups; it only settles once the window clears.
        let (state, changed_once, changed_twice) =
            run(&[false, false, false, true, true, true, true, true]);
        assert_eq!(state.current_status, Status::Up);
        assert!(!state.is_flapping);
        assert!(changed_once);
        assert!(changed_twice);
    }

    #[test]
    fn s6_five_ups_then_downs_settles_down() {
        // The run passes through FLAPPING while the five-wide window still
        // straddles the up/down boundary; once the window is all-down the
        // three-strike rule takes over and status settles at DOWN.
        let (state, _, _) = run(&[
            true, true, true, true, true, false, false, false, false, false,
        ]);
        assert_eq!(state.current_status, Status::Down);
        assert!(!state.is_flapping);
    }

    #[test]
    fn invariant_counters_mutually_exclusive() {
        let (state, _, _) = run(&[true, false, true, true, false, false, false]);
        assert!(state.consecutive_up_count == 0 || state.consecutive_down_count == 0);
    }
}
