use crate::core::types::DocumentResult;

pub const SYSTEM_PROMPT: &str = "You answer questions about a single document. \
Use only the extracted text, key-value pairs and tables supplied by the user. \
If the answer is not in the material, say so plainly. Quote values exactly as extracted.";

const TRUNCATION_MARKER: &str = "\n[... text truncated ...]";

pub fn document_prompt(document: &DocumentResult, question: &str, max_chars: usize) -> String {
    let mut text = String::new();
    text.push_str(&format!(
        "DOCUMENT ({} page{}):\n",
        document.total_pages,
        if document.total_pages == 1 { "" } else { "s" }
    ));
    text.push_str(truncate_chars(&document.text, max_chars));
    if document.text.chars().count() > max_chars {
        text.push_str(TRUNCATION_MARKER);
    }

    if !document.key_value_pairs.is_empty() {
        text.push_str("\n\nKEY-VALUE PAIRS:\n");
        for pair in &document.key_value_pairs {
            text.push_str(&format!(
                "- (page {}) {}: {}\n",
                pair.page_number, pair.key, pair.value
            ));
        }
    }

    for (idx, table) in document.tables.iter().enumerate() {
        text.push_str(&format!(
            "\nTABLE {} (page {}):\n",
            idx + 1,
            table.page_number
        ));
        for row in &table.rows {
            text.push_str("| ");
            text.push_str(&row.join(" | "));
            text.push_str(" |\n");
        }
    }

    text.push_str("\nQUESTION:\n");
    text.push_str(question.trim());
    text.push('\n');
    text
}

fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &value[..byte_idx],
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_chars;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
