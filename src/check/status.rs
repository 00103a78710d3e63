use super::{CheckResult, State};
use crate::config::{IndependentMapping, StateMappings};
use crate::interface::{Attributes, OperStatus};
use crate::render;

/// Operational and admin state results.
///
/// A combined mapping applies if it has an entry for the current state pair; otherwise
/// each state is checked against its targets and then mapped on its own.
pub(super) fn interface_status(
    attributes: &Attributes,
    mappings: Option<&StateMappings>,
    target_oper_states: Option<&[OperStatus]>,
    target_admin_states: Option<&[OperStatus]>,
) -> Vec<CheckResult> {
    let default_mapping = IndependentMapping::default();
    let independent = match mappings {
        Some(StateMappings::Combined(combined)) => {
            if let Some((admin, state)) = attributes.admin_status.as_ref().and_then(|admin| {
                combined
                    .lookup(&attributes.oper_status, admin)
                    .map(|state| (admin, state))
            }) {
                return vec![CheckResult::summary(
                    state,
                    format!(
                        "(op. state: {}, admin state: {})",
                        attributes.oper_status.name(),
                        admin.name()
                    ),
                )];
            }
            &default_mapping
        }
        Some(StateMappings::Independent(independent)) => independent,
        None => &default_mapping,
    };

    let mut results = vec![CheckResult::summary(
        status_state(
            &attributes.oper_status,
            target_oper_states,
            independent.oper_state(&attributes.oper_status),
        ),
        format!("({})", attributes.oper_status.name()),
    )];
    if let Some(admin) = &attributes.admin_status {
        results.push(CheckResult::summary(
            status_state(admin, target_admin_states, independent.admin_state(admin)),
            format!("Admin state: {}", admin.name()),
        ));
    }
    results
}

// An explicit mapping overrides the target check.
fn status_state(
    status: &OperStatus,
    targets: Option<&[OperStatus]>,
    mapped: Option<State>,
) -> State {
    mapped.unwrap_or(match targets {
        Some(targets) if !targets.contains(status) => State::Crit,
        _ => State::Ok,
    })
}

/// Compares the reported speed against the target speed (both in bits per second).
pub(super) fn check_speed(attributes: &Attributes, target_speed: Option<f64>) -> CheckResult {
    if attributes.speed != 0.0 {
        let actual = render::nicspeed(attributes.speed / 8.0);
        return match target_speed.filter(|target| attributes.speed.trunc() != target.trunc()) {
            Some(target) => CheckResult::summary(
                State::Warn,
                format!(
                    "Speed: {actual} (expected: {})",
                    render::nicspeed(target / 8.0)
                ),
            ),
            None => CheckResult::summary(State::Ok, format!("Speed: {actual}")),
        };
    }

    match target_speed.filter(|target| *target != 0.0) {
        Some(target) => CheckResult::summary(
            State::Ok,
            format!("Speed: {} (assumed)", render::nicspeed(target / 8.0)),
        ),
        None if attributes.speed_as_text.is_empty() => {
            CheckResult::summary(State::Ok, "Speed: unknown")
        }
        None => CheckResult::summary(
            State::Ok,
            format!("Speed: {}", attributes.speed_as_text),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attributes(oper_status: OperStatus) -> Attributes {
        Attributes::new("1", "eth0", "eth0", oper_status).unwrap()
    }

    fn mappings(json: &str) -> StateMappings {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_oper_state_against_targets() {
        let results = interface_status(&attributes(OperStatus::Up), None, None, None);
        assert_eq!(results, vec![CheckResult::summary(State::Ok, "(up)")]);

        let results = interface_status(
            &attributes(OperStatus::Down),
            None,
            Some(&[OperStatus::Up]),
            None,
        );
        assert_eq!(results, vec![CheckResult::summary(State::Crit, "(down)")]);
    }

    #[test]
    fn test_independent_mapping_overrides_targets() {
        let mapping = mappings(
            r#"{"independent_mappings": {"map_operstates": [[["2"], 1]], "map_admin_states": [[["2"], 0]]}}"#,
        );
        let iface = attributes(OperStatus::Down).with_admin_status(OperStatus::Down);
        let results = interface_status(
            &iface,
            Some(&mapping),
            Some(&[OperStatus::Up]),
            Some(&[OperStatus::Up]),
        );
        assert_eq!(
            results,
            vec![
                CheckResult::summary(State::Warn, "(down)"),
                CheckResult::summary(State::Ok, "Admin state: down"),
            ]
        );
    }

    #[test]
    fn test_admin_state_against_targets() {
        let iface = attributes(OperStatus::Up).with_admin_status(OperStatus::Down);
        let results = interface_status(&iface, None, None, Some(&[OperStatus::Up]));
        assert_eq!(results[1], CheckResult::summary(State::Crit, "Admin state: down"));
    }

    #[test]
    fn test_combined_mapping() {
        let mapping = mappings(r#"{"combined_mappings": [["2", "2", 0]]}"#);
        let iface = attributes(OperStatus::Down).with_admin_status(OperStatus::Down);
        let results = interface_status(&iface, Some(&mapping), Some(&[OperStatus::Up]), None);
        assert_eq!(
            results,
            vec![CheckResult::summary(
                State::Ok,
                "(op. state: down, admin state: down)"
            )]
        );

        // No entry for this pair: independent check without mapping.
        let iface = attributes(OperStatus::Down).with_admin_status(OperStatus::Up);
        let results = interface_status(&iface, Some(&mapping), Some(&[OperStatus::Up]), None);
        assert_eq!(results[0], CheckResult::summary(State::Crit, "(down)"));
        assert_eq!(results[1], CheckResult::summary(State::Ok, "Admin state: up"));
    }

    #[test]
    fn test_speed() {
        let iface = attributes(OperStatus::Up).with_speed(1_000_000_000.0);
        assert_eq!(
            check_speed(&iface, None),
            CheckResult::summary(State::Ok, "Speed: 1 GBit/s")
        );
        assert_eq!(
            check_speed(&iface, Some(100_000_000.0)),
            CheckResult::summary(State::Warn, "Speed: 1 GBit/s (expected: 100 MBit/s)")
        );
        assert_eq!(
            check_speed(&iface, Some(1_000_000_000.0)),
            CheckResult::summary(State::Ok, "Speed: 1 GBit/s")
        );
    }

    #[test]
    fn test_unknown_speed() {
        let mut iface = attributes(OperStatus::Up);
        assert_eq!(
            check_speed(&iface, Some(10_000_000.0)),
            CheckResult::summary(State::Ok, "Speed: 10 MBit/s (assumed)")
        );
        assert_eq!(
            check_speed(&iface, None),
            CheckResult::summary(State::Ok, "Speed: unknown")
        );
        iface.speed_as_text = "auto".to_owned();
        assert_eq!(
            check_speed(&iface, None),
            CheckResult::summary(State::Ok, "Speed: auto")
        );
    }
}
