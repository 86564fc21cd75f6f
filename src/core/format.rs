//! pt-BR display formatting for calculator results.

/// `1234.5` -> `"R$ 1.234,50"`, `-10.0` -> `"-R$ 10,00"`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "R$ --".to_string();
    }
    let (negative, digits) = two_decimal_digits(value);
    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {digits}")
}

/// `111.4603` -> `"111,46%"`. The value is already in percent.
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return "--%".to_string();
    }
    let (negative, digits) = two_decimal_digits(value);
    let sign = if negative { "-" } else { "" };
    format!("{sign}{digits}%")
}

fn two_decimal_digits(value: f64) -> (bool, String) {
    // f64::round rounds half away from zero.
    let cents = (value.abs() * 100.0).round() as u64;
    let negative = value < 0.0 && cents > 0;
    let whole = group_thousands(cents / 100);
    (negative, format!("{whole},{:02}", cents % 100))
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        let group = value % 1_000;
        value /= 1_000;
        if value == 0 {
            groups.push(group.to_string());
            break;
        }
        groups.push(format!("{group:03}"));
    }
    groups.reverse();
    groups.join(".")
}
