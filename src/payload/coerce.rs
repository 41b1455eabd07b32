use serde_json::Value;

pub const MAX_RATING: f64 = 5.0;

/// Integer coercion with `0` fallback.
///
/// Numbers truncate toward zero. Strings parse their leading integer, so
/// `"12 komentar"` is 12 and `"abc"` is 0.
pub fn count(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => leading_int(s).unwrap_or(0),
        _ => 0,
    }
}

/// Rating coercion: accepted only inside `(0, 5]`, everything else is `0`.
///
/// String ratings are sanitized first by dropping every character that is not
/// a digit, `.` or `-`.
pub fn rating(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            leading_float(&cleaned)
        }
        _ => None,
    };

    match parsed {
        Some(r) if r.is_finite() && r > 0.0 && r <= MAX_RATING => r,
        _ => 0.0,
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = split_sign(s);
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    // Overflowing values saturate instead of failing.
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let (negative, rest) = split_sign(s);

    let int_part: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    let after_int = &rest[int_part.len()..];
    let frac_part: String = after_int
        .strip_prefix('.')
        .map(|tail| tail.chars().take_while(|c| c.is_ascii_digit()).collect())
        .unwrap_or_default();

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let literal = format!(
        "{}.{}",
        if int_part.is_empty() { "0" } else { &int_part },
        if frac_part.is_empty() { "0" } else { &frac_part }
    );
    let value: f64 = literal.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}
