//! The basename increment rule used to step around name collisions.
//!
//! `name` -> `name 2` -> `name 3` -> ...

/// Split a basename into `(prefix, digits)` when it ends in whitespace
/// followed by a decimal integer. The prefix keeps that whitespace.
#[must_use]
pub fn split_trailing_number(basename: &str) -> Option<(&str, &str)> {
    let digits_start = basename
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;

    let prefix = &basename[..digits_start];
    if !prefix.chars().next_back()?.is_whitespace() {
        return None;
    }
    Some((prefix, &basename[digits_start..]))
}

/// The next basename to try after `basename` collided.
///
/// A trailing `<whitespace><number>` is incremented with everything before
/// it left byte-for-byte intact. Any other name has trailing whitespace
/// trimmed and ` 2` appended.
#[must_use]
pub fn next_basename(basename: &str) -> String {
    match split_trailing_number(basename) {
        Some((prefix, digits)) => format!("{prefix}{}", increment_decimal(digits)),
        None => format!("{} 2", basename.trim_end()),
    }
}

/// Add one to a string of ASCII digits, dropping leading zeros.
fn increment_decimal(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let mut bytes: Vec<u8> = if trimmed.is_empty() {
        b"0".to_vec()
    } else {
        trimmed.as_bytes().to_vec()
    };

    for byte in bytes.iter_mut().rev() {
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            return String::from_utf8_lossy(&bytes).into_owned();
        }
    }

    // Every digit carried over.
    let mut result = String::with_capacity(bytes.len() + 1);
    result.push('1');
    result.push_str(&String::from_utf8_lossy(&bytes));
    result
}
