//! Value helpers shared by flatten and expand

use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

static NATURAL_CHUNK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+|\D+").expect("valid chunk pattern"));

/// Coerce an API value into an integer.
///
/// FortiOS returns most integers as JSON numbers, but some builds send
/// them as strings. Non-numeric strings become `0`; other values pass
/// through unchanged.
pub fn convintf2i(v: &Value) -> Value {
    match v {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => n.as_f64().map(|f| Value::from(f as i64)).unwrap_or_else(|| v.clone()),
        },
        Value::String(s) => Value::from(s.trim().parse::<i64>().unwrap_or(0)),
        _ => v.clone(),
    }
}

/// `"10.0.0.0 255.255.255.0"` (or `10.0.0.0/255.255.255.0`) to `"10.0.0.0/24"`
pub fn ipmask_to_cidr(value: &str) -> Option<String> {
    let (ip, mask) = split_ipmask(value)?;
    let ip: Ipv4Addr = ip.parse().ok()?;
    let prefix = mask_to_prefix(mask)?;
    Some(format!("{}/{}", ip, prefix))
}

/// `"10.0.0.0/24"` to `"10.0.0.0 255.255.255.0"`
pub fn cidr_to_ipmask(value: &str) -> Option<String> {
    let (ip, prefix) = value.trim().split_once('/')?;
    let ip: Ipv4Addr = ip.parse().ok()?;
    let prefix: u32 = prefix.parse().ok()?;
    if prefix > 32 {
        return None;
    }
    let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
    Some(format!("{} {}", ip, Ipv4Addr::from(mask)))
}

/// Pick the representation of an ipv4-classnet value to store in state.
///
/// The device always answers `a.b.c.d m.m.m.m`. When the current state holds
/// the same network written as CIDR, the state form is kept so a refresh
/// does not report a spurious diff. Otherwise the device value wins.
pub fn validate_conv_ipmask_to_cidr(current: Option<&Value>, api: &Value) -> Value {
    let api_text = match api {
        Value::String(s) => s.clone(),
        // some releases split the pair into an array
        Value::Array(parts) => parts
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" "),
        other => return other.clone(),
    };

    if let Some(current) = current.and_then(Value::as_str) {
        if current != api_text
            && current.contains('/')
            && ipmask_to_cidr(&api_text).as_deref() == Some(current)
        {
            return Value::String(current.to_string());
        }
    }
    Value::String(api_text)
}

fn split_ipmask(value: &str) -> Option<(&str, &str)> {
    let value = value.trim();
    value
        .split_once(' ')
        .or_else(|| value.split_once('/'))
        .map(|(ip, mask)| (ip.trim(), mask.trim()))
}

fn mask_to_prefix(mask: &str) -> Option<u32> {
    let mask: u32 = mask.parse::<Ipv4Addr>().ok()?.into();
    let prefix = mask.leading_ones();
    // reject non-contiguous masks such as 255.0.255.0
    if mask.checked_shl(prefix).unwrap_or(0) != 0 {
        return None;
    }
    Some(prefix)
}

/// Ordering applied to table entries after a refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Keep the order the device returned
    #[default]
    Off,
    /// Lexicographic by the entry key
    Alphabetical,
    /// Digit runs compared as numbers (`port2` < `port10`)
    Natural,
}

impl SortMode {
    /// Parse the `dynamic_sort_subtable` attribute (`false`, `true`, `natural`)
    pub fn parse(value: &str) -> Self {
        match value {
            "true" => SortMode::Alphabetical,
            "natural" => SortMode::Natural,
            _ => SortMode::Off,
        }
    }
}

/// Sort table entries by `key` so diffs do not depend on device ordering
pub fn dynamic_sort_subtable(entries: &mut [Value], key: &str, mode: SortMode) {
    let compare: fn(&Value, &Value) -> Ordering = match mode {
        SortMode::Off => return,
        SortMode::Alphabetical => compare_plain,
        SortMode::Natural => compare_natural,
    };
    entries.sort_by(|a, b| compare(&a[key], &b[key]));
}

fn compare_plain(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => key_text(a).cmp(&key_text(b)),
    }
}

fn compare_natural(a: &Value, b: &Value) -> Ordering {
    natural_cmp(&key_text(a), &key_text(b))
}

fn key_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Natural string comparison
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = NATURAL_CHUNK.find_iter(a).map(|m| m.as_str());
    let mut right = NATURAL_CHUNK.find_iter(b).map(|m| m.as_str());
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = if is_digits(x) && is_digits(y) {
                    compare_digit_runs(x, y)
                } else {
                    x.cmp(y)
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn compare_digit_runs(x: &str, y: &str) -> Ordering {
    let xt = x.trim_start_matches('0');
    let yt = y.trim_start_matches('0');
    xt.len()
        .cmp(&yt.len())
        .then_with(|| xt.cmp(yt))
        .then_with(|| x.len().cmp(&y.len()))
}
