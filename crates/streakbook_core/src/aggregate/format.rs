//! Human-readable measurement values.

use crate::model::activity::MeasurementMethod;

/// Renders `value` the way the activity's method reads it.
///
/// Yes/no: `No`, `Yes`, `3x`. Duration (seconds): `1h 2m 3s`, `2m 3s`, `3s`.
/// Decimal: two decimals plus unit. Count: whole number.
pub fn format_measurement(method: MeasurementMethod, unit: &str, value: f64) -> String {
    match method {
        MeasurementMethod::YesNo => match value as i64 {
            0 => "No".to_string(),
            1 => "Yes".to_string(),
            count => format!("{count}x"),
        },
        MeasurementMethod::Duration => format_duration(value as i64),
        MeasurementMethod::DecimalWithUnit => {
            if unit.is_empty() {
                format!("{value:.2}")
            } else {
                format!("{value:.2} {unit}")
            }
        }
        MeasurementMethod::IntegerCount => format!("{}", value as i64),
    }
}

pub fn format_duration(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::{format_duration, format_measurement};
    use crate::model::activity::MeasurementMethod;

    #[test]
    fn yes_no_values() {
        assert_eq!(format_measurement(MeasurementMethod::YesNo, "", 0.0), "No");
        assert_eq!(format_measurement(MeasurementMethod::YesNo, "", 1.0), "Yes");
        assert_eq!(format_measurement(MeasurementMethod::YesNo, "", 3.0), "3x");
    }

    #[test]
    fn durations_drop_leading_zero_units() {
        assert_eq!(format_duration(3723), "1h 2m 3s");
        assert_eq!(format_duration(123), "2m 3s");
        assert_eq!(format_duration(3), "3s");
        assert_eq!(format_duration(3600), "1h 0m 0s");
    }

    #[test]
    fn decimal_and_count() {
        assert_eq!(
            format_measurement(MeasurementMethod::DecimalWithUnit, "km", 5.256),
            "5.26 km"
        );
        assert_eq!(format_measurement(MeasurementMethod::IntegerCount, "", 12.0), "12");
    }
}
