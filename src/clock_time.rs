//! Clock-time labels ("HH:MM") and minute arithmetic.
//!
//! Labels are stored exactly as given. Parsing is lenient: anything that is
//! not `<digits>:<digits>` resolves to midnight instead of failing, and no
//! range check is applied to either component beyond fitting in an `i32`.

/// Parse a label into minutes since midnight, or `None` if malformed.
pub fn parse_minutes(label: &str) -> Option<i32> {
    let (hours, minutes) = label.trim().split_once(':')?;
    let hours = parse_component(hours)?;
    let minutes = parse_component(minutes)?;
    hours.checked_mul(60)?.checked_add(minutes)
}

/// Unsigned decimal digits only; `i32::from_str` would also take a sign.
fn parse_component(component: &str) -> Option<i32> {
    let component = component.trim();
    if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    component.parse().ok()
}

/// Minutes since midnight, with malformed labels treated as `00:00`.
pub fn to_minutes(label: &str) -> i32 {
    parse_minutes(label).unwrap_or(0)
}

/// Format minutes since midnight as a zero-padded `HH:MM` label.
///
/// Hours are not wrapped, so `1440` formats as `24:00`. Negative values
/// get a single leading `-`, so `-30` formats as `-00:30`.
pub fn format_minutes(minutes: i32) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let abs = minutes.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}

/// `end - start` in minutes. Negative when `end` is earlier than `start`.
pub fn minutes_between(start: &str, end: &str) -> i32 {
    to_minutes(end) - to_minutes(start)
}

/// Half-open interval overlap on minutes: `[a_start, a_end)` vs `[b_start, b_end)`.
///
/// Abutting intervals (`a_end == b_start`) do not overlap.
pub fn intervals_overlap(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
    !(a_end <= b_start || a_start >= b_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes_valid() {
        assert_eq!(parse_minutes("00:00"), Some(0));
        assert_eq!(parse_minutes("08:30"), Some(510));
        assert_eq!(parse_minutes("22:00"), Some(1320));
        assert_eq!(parse_minutes("9:05"), Some(545));
    }

    #[test]
    fn test_parse_minutes_malformed() {
        assert_eq!(parse_minutes("bad"), None);
        assert_eq!(parse_minutes(""), None);
        assert_eq!(parse_minutes("12"), None);
        assert_eq!(parse_minutes("ab:cd"), None);
        assert_eq!(parse_minutes("10:xx"), None);
    }

    #[test]
    fn test_parse_minutes_does_not_range_check() {
        assert_eq!(parse_minutes("24:00"), Some(1440));
        assert_eq!(parse_minutes("10:75"), Some(675));
    }

    #[test]
    fn test_parse_minutes_out_of_i32_range_is_malformed() {
        assert_eq!(parse_minutes("99999999:00"), None);
        assert_eq!(parse_minutes("00:99999999999"), None);
        assert_eq!(parse_minutes("35791394:08"), None);
        assert_eq!(parse_minutes("35791394:00"), Some(35_791_394 * 60));
        assert_eq!(to_minutes("99999999:00"), 0);
    }

    #[test]
    fn test_parse_minutes_rejects_signs() {
        assert_eq!(parse_minutes("-0:30"), None);
        assert_eq!(parse_minutes("+1:00"), None);
        assert_eq!(parse_minutes("10:-5"), None);
    }

    #[test]
    fn test_to_minutes_malformed_is_midnight() {
        assert_eq!(to_minutes("garbage"), 0);
        assert_eq!(to_minutes(""), 0);
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0), "00:00");
        assert_eq!(format_minutes(570), "09:30");
        assert_eq!(format_minutes(1440), "24:00");
    }

    #[test]
    fn test_format_negative_minutes() {
        assert_eq!(format_minutes(-30), "-00:30");
        assert_eq!(format_minutes(-1320), "-22:00");
        assert_eq!(format_minutes(i32::MIN), "-35791394:08");
    }

    #[test]
    fn test_minutes_between_crossing_midnight_is_negative() {
        assert_eq!(minutes_between("22:30", "00:30"), -1320);
        assert_eq!(minutes_between("18:00", "20:00"), 120);
    }

    #[test]
    fn test_intervals_overlap_boundaries() {
        // 18:00-20:00 vs 20:00-22:00 abut
        assert!(!intervals_overlap(1080, 1200, 1200, 1320));
        assert!(!intervals_overlap(1200, 1320, 1080, 1200));
        // 18:00-20:30 vs 20:00-22:00 overlap
        assert!(intervals_overlap(1080, 1230, 1200, 1320));
        // containment
        assert!(intervals_overlap(1080, 1320, 1140, 1200));
    }

    mod proptest_tests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn format_then_parse_is_identity(minutes in 0i32..1440) {
                prop_assert_eq!(parse_minutes(&format_minutes(minutes)), Some(minutes));
            }

            #[test]
            fn overlap_is_symmetric(
                a in 0i32..1440, a_len in 1i32..300,
                b in 0i32..1440, b_len in 1i32..300,
            ) {
                prop_assert_eq!(
                    intervals_overlap(a, a + a_len, b, b + b_len),
                    intervals_overlap(b, b + b_len, a, a + a_len)
                );
            }

            #[test]
            fn abutting_never_overlaps(a in 0i32..1440, a_len in 1i32..300, b_len in 1i32..300) {
                let mid = a + a_len;
                prop_assert!(!intervals_overlap(a, mid, mid, mid + b_len));
            }
        }
    }
}
