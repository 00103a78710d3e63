//! Human readable rendering of rates, speeds and percentages.

const SI_PREFIXES: [&str; 9] = ["", "k", "M", "G", "T", "P", "E", "Z", "Y"];

/// Scales `value` to an SI prefix and formats the mantissa with three significant digits.
fn auto_scale(value: f64) -> (String, &'static str) {
    let mut exponent = 0;
    let mut scaled = value;
    while scaled.abs() >= 1000.0 && exponent < SI_PREFIXES.len() - 1 {
        scaled /= 1000.0;
        exponent += 1;
    }
    let mantissa = if scaled < 10.0 {
        format!("{scaled:.2}")
    } else if scaled < 100.0 {
        format!("{scaled:.1}")
    } else {
        format!("{scaled:.0}")
    };
    (mantissa, SI_PREFIXES[exponent])
}

/// Renders a byte rate, e.g. `3.20 MB/s`.
pub fn iobandwidth(bytes_per_second: f64) -> String {
    let (mantissa, prefix) = auto_scale(bytes_per_second);
    format!("{mantissa} {prefix}B/s")
}

/// Renders a byte rate as bit rate with trailing zeros removed, e.g. `10 MBit/s`.
pub fn nicspeed(bytes_per_second: f64) -> String {
    let (mut mantissa, prefix) = auto_scale(bytes_per_second * 8.0);
    if mantissa.contains('.') {
        mantissa = mantissa.trim_end_matches('0').trim_end_matches('.').to_owned();
    }
    format!("{mantissa} {prefix}Bit/s")
}

/// Renders a percentage with two decimals, or two significant digits for tiny values.
pub fn percent(percentage: f64) -> String {
    if percentage == 0.0 {
        return "0%".to_owned();
    }
    if percentage.abs() >= 0.01 {
        return format!("{percentage:.2}%");
    }
    let decimals = (1 - percentage.abs().log10().floor() as i32).max(0) as usize;
    let rendered = format!("{percentage:.decimals$}");
    let rendered = if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered.as_str()
    };
    format!("{rendered}%")
}

/// Renders `value` with `precision` decimals, dropping trailing zeros.
///
/// Values that would round to zero are shown as `<0.01` (or `>-0.01`).
pub fn floating_point(value: f64, precision: usize, unit: &str) -> String {
    if value.round() == value {
        return format!("{value:.0}{unit}");
    }
    let tolerance = format!("0.{}1", "0".repeat(precision.saturating_sub(1)));
    if value.abs() < 10_f64.powi(-(precision as i32)) {
        let sign = if value > 0.0 { "<" } else { ">-" };
        return format!("{sign}{tolerance}{unit}");
    }
    let rendered = format!("{value:.precision$}");
    format!(
        "{}{unit}",
        rendered.trim_end_matches('0').trim_end_matches('.')
    )
}

pub fn packets_per_second(value: f64) -> String {
    floating_point(value, 2, " packets/s")
}

pub fn packet_percent(value: f64) -> String {
    floating_point(value, 3, "%")
}
