//! Number and label formatting

/// Group an integer's digits by thousands
fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        let group = value % 1000;
        value /= 1000;
        if value == 0 {
            groups.push(group.to_string());
            break;
        }
        groups.push(format!("{:03}", group));
    }
    groups.reverse();
    groups.join(",")
}

/// Locale-style count: `1234567.5` → `"1,234,567.5"`
///
/// At most three fraction digits, trailing zeros dropped.
pub fn format_count(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rounded = (value * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let abs = rounded.abs();

    let mut whole = abs.trunc() as u64;
    let mut millis = ((abs - abs.trunc()) * 1000.0).round() as u64;
    if millis >= 1000 {
        whole += 1;
        millis = 0;
    }

    let mut out = String::new();
    if negative && (whole > 0 || millis > 0) {
        out.push('-');
    }
    out.push_str(&group_thousands(whole));
    if millis > 0 {
        let fraction = format!("{:03}", millis);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out
}

/// Short axis label: `40_000_000` → `"40M"`, `1_500` → `"1.5k"`
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, "B")
    } else if abs >= 1e6 {
        (value / 1e6, "M")
    } else if abs >= 1e3 {
        (value / 1e3, "k")
    } else {
        (value, "")
    };

    let text = format!("{:.1}", scaled);
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{}{}", text, suffix)
}

/// Human label for a metric column: `"total_cases"` → `"Total Cases"`
pub fn metric_label(metric: &str) -> String {
    metric
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Round tick values covering `[0, max]`, about `count` of them
pub fn nice_ticks(max: f64, count: usize) -> Vec<f64> {
    nice_range_ticks(0.0, max, count)
}

/// Round tick values inside `[min, max]`, about `count` of them
///
/// Ticks sit on multiples of a 1/2/5 × 10^k step, so 0 is one of them
/// whenever the range spans it.
pub fn nice_range_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    let step = match nice_step(max - min, count) {
        Some(step) => step,
        None if min.is_finite() => return vec![min],
        None => return vec![0.0],
    };

    let eps = step * 1e-9;
    let mut i = ((min - eps) / step).ceil() as i64;
    let mut ticks = Vec::new();
    loop {
        let tick = step * i as f64;
        if tick > max + eps {
            break;
        }
        // avoid "-0" labels
        ticks.push(if tick == 0.0 { 0.0 } else { tick });
        i += 1;
    }
    ticks
}

fn nice_step(span: f64, count: usize) -> Option<f64> {
    if !span.is_finite() || span <= 0.0 || count == 0 {
        return None;
    }

    let raw_step = span / count as f64;
    let power = 10f64.powf(raw_step.log10().floor());
    let error = raw_step / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    Some(factor * power)
}
