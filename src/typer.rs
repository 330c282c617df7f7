use chrono::NaiveDateTime;

use crate::value::Value;

/// Transform a raw string into the most specific scalar value. Parses are
/// attempted in strict order and the first success wins: integer, float,
/// boolean, timestamp against `time_format`, then the string unchanged.
///
/// Integer parsing is attempted before boolean, so `"1"` is `Int(1)` and
/// never a boolean; `"1e3"` fails the integer parse and lands as a float.
pub fn infer(raw: &str, time_format: &str) -> Value {
    if let Ok(parsed) = raw.parse::<i64>() {
        return Value::Int(parsed);
    }
    if let Ok(parsed) = raw.parse::<f64>() {
        return Value::Float(parsed);
    }
    if let Some(parsed) = parse_bool(raw) {
        return Value::Bool(parsed);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, time_format) {
        return Value::Time(parsed);
    }
    Value::Str(raw.to_string())
}

// Case-insensitive true/false plus the single-letter spellings. Numeric
// spellings never reach this point.
fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("t") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") || raw.eq_ignore_ascii_case("f") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_TIME_FORMAT;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn typed(raw: &str) -> Value {
        infer(raw, DEFAULT_TIME_FORMAT)
    }

    #[test]
    fn integers_win_over_everything() {
        assert_eq!(typed("1"), Value::Int(1));
        assert_eq!(typed("-42"), Value::Int(-42));
        assert_eq!(typed("0"), Value::Int(0));
    }

    #[test]
    fn exponents_are_floats_not_integers() {
        assert_eq!(typed("1e3"), Value::Float(1e3));
        assert_eq!(typed("18.04"), Value::Float(18.04));
    }

    #[test]
    fn booleans_are_textual_only() {
        assert_eq!(typed("true"), Value::Bool(true));
        assert_eq!(typed("FALSE"), Value::Bool(false));
        assert_eq!(typed("T"), Value::Bool(true));
        // "1" was already an integer above.
    }

    #[test]
    fn timestamps_use_the_configured_format() {
        let expected = NaiveDate::from_ymd_opt(2019, 1, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(typed("20190131T235959"), Value::Time(expected));
        assert_eq!(
            infer("2019-01-31 23:59:59", "%Y-%m-%d %H:%M:%S"),
            Value::Time(expected)
        );
    }

    #[test]
    fn empty_string_falls_all_the_way_through() {
        assert_eq!(typed(""), Value::Str(String::new()));
    }

    #[test]
    fn unparseable_text_stays_a_string() {
        assert_eq!(typed("abc"), Value::Str("abc".to_string()));
        assert_eq!(typed("tRex"), Value::Str("tRex".to_string()));
    }

    proptest! {
        #[test]
        fn any_i64_text_infers_as_integer(n in any::<i64>()) {
            prop_assert_eq!(typed(&n.to_string()), Value::Int(n));
        }
    }
}
