use super::State;
use crate::levels::Thresholds;

/// Checks `value` against upper and lower thresholds.
///
/// Returns the state and the text `"{label}: {value}"`, followed by the exceeded levels
/// if the state is not OK. Upper levels are checked first; lower levels only apply while
/// the value is within its upper levels.
pub fn check_levels(
    value: f64,
    upper: Option<Thresholds>,
    lower: Option<Thresholds>,
    render: impl Fn(f64) -> String,
    label: &str,
) -> (State, String) {
    let mut text = format!("{label}: {}", render(value));

    if let Some((warn, crit)) = upper {
        let state = if value >= crit {
            State::Crit
        } else if value >= warn {
            State::Warn
        } else {
            State::Ok
        };
        if state != State::Ok {
            text.push_str(&format!(" (warn/crit at {}/{})", render(warn), render(crit)));
            return (state, text);
        }
    }

    if let Some((warn, crit)) = lower {
        let state = if value < crit {
            State::Crit
        } else if value < warn {
            State::Warn
        } else {
            State::Ok
        };
        if state != State::Ok {
            text.push_str(&format!(
                " (warn/crit below {}/{})",
                render(warn),
                render(crit)
            ));
            return (state, text);
        }
    }

    (State::Ok, text)
}
