//! Time formatting helpers.

const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Format a duration in seconds using its two most significant units,
/// e.g. `"2d 3h"`, `"5m 0s"`, `"42s"`.
pub fn format_duration(secs: u64) -> String {
    let Some(first) = UNITS.iter().position(|(size, _)| secs >= *size) else {
        return "0s".to_string();
    };
    UNITS[first..]
        .iter()
        .take(2)
        .map(|(size, suffix)| {
            let value = if *size == UNITS[first].0 {
                secs / size
            } else {
                (secs % UNITS[first].0) / size
            };
            format!("{value}{suffix}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_two_most_significant_units() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(300), "5m 0s");
        assert_eq!(format_duration(3_725), "1h 2m");
        assert_eq!(format_duration(183_600), "2d 3h");
    }
}
