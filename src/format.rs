const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable size with two decimals, e.g. `1536` -> `"1.5 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    format_bytes_with(bytes, 2)
}

/// Binary (1024-based) size string rounded to `decimals` places, with
/// trailing zeros stripped. Values past TB stay in TB.
pub fn format_bytes_with(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    // floor(log1024(bytes)) without float log rounding surprises
    let mut index = 0;
    let mut scale = 1u64;
    while index < UNITS.len() - 1 && bytes / scale >= 1024 {
        scale *= 1024;
        index += 1;
    }

    // Half-up rounding; `{:.N}` alone would round exact ties to even
    let factor = 10f64.powi(decimals as i32);
    let value = (bytes as f64 / scale as f64 * factor).round() / factor;
    let rounded = format!("{:.*}", decimals, value);
    let trimmed = if rounded.contains('.') {
        rounded.trim_end_matches('0').trim_end_matches('.')
    } else {
        rounded.as_str()
    };

    format!("{} {}", trimmed, UNITS[index])
}

/// Escape the characters that legacy Telegram Markdown treats as entities.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
