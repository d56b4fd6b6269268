//! Formatting utilities for Telegram HTML screens.

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Truncate to `max` characters, appending an ellipsis when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Star rating ("★★★★☆") for a 0..=5 score.
pub fn stars(rating: f64) -> String {
    let full = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(full), "☆".repeat(5 - full))
}

/// Split screen HTML into chunks of at most `limit` bytes.
///
/// Screens keep every tag on a single line, so cutting on line boundaries
/// never splits an element. A single line longer than `limit` is cut on a
/// char boundary as a last resort.
pub fn split_html_lines(html: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(16);
    if html.len() <= limit {
        return vec![html.to_string()];
    }

    let mut out = Vec::new();
    let mut chunk = String::new();
    for line in html.split('\n') {
        let needed = if chunk.is_empty() {
            line.len()
        } else {
            chunk.len() + 1 + line.len()
        };
        if needed > limit && !chunk.is_empty() {
            out.push(std::mem::take(&mut chunk));
        }

        if line.len() > limit {
            let mut rest = line;
            while rest.len() > limit {
                let mut cut = limit;
                while !rest.is_char_boundary(cut) {
                    cut -= 1;
                }
                out.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
            chunk.push_str(rest);
            continue;
        }

        if !chunk.is_empty() {
            chunk.push('\n');
        }
        chunk.push_str(line);
    }
    if !chunk.trim().is_empty() {
        out.push(chunk);
    }
    out
}
