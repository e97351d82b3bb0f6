use crate::core::types::{DocumentResult, PageResult};

/// Concatenates page results, in the order given, into one document.
///
/// Each page's text is prefixed with `=== Page n ===` where `n` is its
/// 1-based position in `pages`, not its own page number.
///
/// # Panics
///
/// Panics when `pages` is empty; callers must only merge after at least one
/// page succeeded.
pub fn merge_pages(pages: Vec<PageResult>) -> DocumentResult {
    assert!(!pages.is_empty(), "merge_pages called with no page results");

    let total_pages = pages.len();
    let mut sections = Vec::with_capacity(total_pages);
    let mut key_value_pairs = Vec::new();
    let mut form_fields = Vec::new();
    let mut tables = Vec::new();

    for (position, page) in pages.into_iter().enumerate() {
        sections.push(format!("=== Page {} ===\n{}", position + 1, page.text));
        key_value_pairs.extend(page.key_value_pairs);
        form_fields.extend(page.form_fields);
        tables.extend(page.tables);
    }

    DocumentResult {
        text: sections.join("\n\n"),
        key_value_pairs,
        form_fields,
        tables,
        total_pages,
    }
}
