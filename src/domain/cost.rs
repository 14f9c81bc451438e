/// Money earned for `time_spent` seconds at `hourly_rate` per hour, rounded
/// to cents with ties going away from zero.
///
/// No validation: negative or non-finite rates flow straight through.
pub fn cost(time_spent: u64, hourly_rate: f64) -> f64 {
    let rounded = (hourly_rate / 3600.0 * time_spent as f64 * 100.0).round() / 100.0;
    // Collapse -0.0 so it never renders as "-0.00"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Cost rendered with exactly two decimal places
pub fn format_cost(time_spent: u64, hourly_rate: f64) -> String {
    let value = cost(time_spent, hourly_rate);
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{}Infinity", sign);
    }
    format!("{:.2}", value)
}

/// Format seconds as zero-padded "HH:MM:SS". Hours are not capped at 24.
pub fn format_hms(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_basic() {
        assert_eq!(format_cost(300, 60.0), "5.00");
        assert_eq!(format_cost(3600, 25.5), "25.50");
        assert_eq!(format_cost(0, 100.0), "0.00");
    }

    #[test]
    fn test_cost_rounds_to_two_places() {
        // 50 / 3600 * 100 = 1.3888...
        assert_eq!(format_cost(100, 50.0), "1.39");
    }

    #[test]
    fn test_cost_negative_and_non_finite_rates() {
        assert_eq!(format_cost(3600, -10.0), "-10.00");
        assert_eq!(format_cost(10, f64::NAN), "NaN");
        assert_eq!(format_cost(10, f64::INFINITY), "Infinity");
        assert_eq!(format_cost(10, f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_cost_ties_round_away_from_zero() {
        // 450 / 3600 * 1 = 0.125 exactly
        assert_eq!(cost(1, 450.0), 0.13);
        assert_eq!(format_cost(1, 450.0), "0.13");
        assert_eq!(format_cost(1, -450.0), "-0.13");
    }

    #[test]
    fn test_cost_never_shows_negative_zero() {
        assert_eq!(format_cost(0, -10.0), "0.00");
        // -0.001 rounds to zero cents
        assert_eq!(format_cost(1, -3.6), "0.00");
        assert!(cost(0, -10.0).is_sign_positive());
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(59), "00:00:59");
        assert_eq!(format_hms(600), "00:10:00");
        assert_eq!(format_hms(3661), "01:01:01");
        assert_eq!(format_hms(100 * 3600), "100:00:00");
    }
}
