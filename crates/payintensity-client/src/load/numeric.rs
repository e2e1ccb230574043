/// Parses a transaction amount that may carry comma grouping separators.
pub(crate) fn parse_amount(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("value is empty".to_string());
    }

    let plain = strip_grouping(trimmed)?;
    let value = plain
        .parse::<f64>()
        .map_err(|_| format!("`{trimmed}` is not a number"))?;

    if !value.is_finite() {
        return Err(format!("`{trimmed}` is not a finite number"));
    }
    if value < 0.0 {
        return Err(format!("`{trimmed}` is negative"));
    }

    Ok(value)
}

fn strip_grouping(value: &str) -> Result<String, String> {
    if !value.contains(',') {
        return Ok(value.to_string());
    }

    let (integer_part, fraction_part) = match value.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (value, None),
    };

    if fraction_part.is_some_and(|fraction| fraction.contains(',')) {
        return Err(format!("`{value}` has a grouping separator after the decimal point"));
    }

    let groups = integer_part.split(',').collect::<Vec<&str>>();
    let head_ok = groups
        .first()
        .is_some_and(|head| (1..=3).contains(&head.len()) && is_digits(head));
    let tail_ok = groups
        .iter()
        .skip(1)
        .all(|group| group.len() == 3 && is_digits(group));
    if !head_ok || !tail_ok {
        return Err(format!("`{value}` has misplaced grouping separators"));
    }

    let mut plain = groups.concat();
    if let Some(fraction) = fraction_part {
        plain.push('.');
        plain.push_str(fraction);
    }
    Ok(plain)
}

fn is_digits(value: &str) -> bool {
    value.bytes().all(|byte| byte.is_ascii_digit())
}
