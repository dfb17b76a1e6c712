//! Currency formatting for suggestion text
//!
//! Renders amounts the way an en-US currency formatter does: symbol
//! prefix, thousands separators, two fraction digits.

/// (ISO code, display prefix, fraction digits)
const CURRENCIES: &[(&str, &str, usize)] = &[
    ("USD", "$", 2),
    ("CAD", "CA$", 2),
    ("EUR", "€", 2),
    ("GBP", "£", 2),
    ("JPY", "¥", 0),
    ("INR", "₹", 2),
    ("AUD", "A$", 2),
    ("NZD", "NZ$", 2),
    ("MXN", "MX$", 2),
    ("CNY", "CN¥", 2),
    ("KRW", "₩", 0),
    ("BRL", "R$", 2),
    ("HKD", "HK$", 2),
    ("ILS", "₪", 2),
    ("VND", "₫", 0),
];

/// Format `amount` in the given ISO currency.
///
/// Unknown codes fall back to `CODE 1,234.50`.
pub fn format_currency(amount: f64, currency: &str) -> String {
    let code = currency.trim().to_uppercase();
    let (prefix, digits) = CURRENCIES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, symbol, digits)| (symbol.to_string(), *digits))
        .unwrap_or_else(|| (format!("{}\u{a0}", code), 2));

    let amount = if amount.is_finite() { amount } else { 0.0 };
    let body = group_thousands(amount.abs(), digits);

    // rounding can turn a tiny negative into zero; don't print "-$0.00"
    if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-{}{}", prefix, body)
    } else {
        format!("{}{}", prefix, body)
    }
}

/// Fixed-point rendering that rounds ties away from zero on the shortest
/// decimal form of `value` (so `1.005` → `1.01`, `2.5` → `3`).
/// `value` must be finite and non-negative.
fn round_half_expand(value: f64, digits: usize) -> String {
    let repr = value.to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if frac_part.len() <= digits {
        return format!("{:.*}", digits, value);
    }

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(digits))
        .map(|b| b - b'0')
        .collect();
    if frac_part.as_bytes()[digits] >= b'5' {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, 1);
                break;
            }
            i -= 1;
            if kept[i] == 9 {
                kept[i] = 0;
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let all: String = kept.iter().map(|d| char::from(b'0' + d)).collect();
    let split = all.len() - digits;
    if digits == 0 {
        all
    } else {
        format!("{}.{}", &all[..split], &all[split..])
    }
}

fn group_thousands(value: f64, digits: usize) -> String {
    let fixed = round_half_expand(value, digits);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}
