// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

/// Appended when content is cut at `max_length`
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated. Use start_index to get more content.]";

/// Window of `content` starting at `start_index` chars, at most `max_length`
/// chars long. Indices count Unicode scalar values, never bytes.
pub fn slice(content: &str, start_index: Option<usize>, max_length: Option<usize>) -> String {
    let start = start_index.unwrap_or(0);

    let Some((offset, _)) = content.char_indices().nth(start) else {
        return String::new();
    };
    let rest = &content[offset..];

    let Some(max_length) = max_length else {
        return rest.to_string();
    };

    match rest.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}{}", &rest[..cut], TRUNCATION_MARKER),
        None => rest.to_string(),
    }
}
