use docqa_lib::core::types::{KeyValuePair, PageResult, TableData};
use docqa_lib::providers::mistral::{pages_to_results, OcrPage};
use docqa_lib::reducer::merge_pages;

fn page(page_number: usize, text: &str, key: &str) -> PageResult {
    let pair = KeyValuePair {
        key: key.to_string(),
        value: format!("value {page_number}"),
        confidence: 88.0,
        page_number,
    };
    PageResult {
        text: text.to_string(),
        form_fields: vec![(&pair).into()],
        key_value_pairs: vec![pair],
        tables: vec![TableData {
            rows: vec![vec![key.to_string()]],
            confidence: 75.0,
            page_number,
        }],
        page_number,
    }
}

#[test]
fn merged_text_uses_positional_page_headers() {
    let merged = merge_pages(vec![page(1, "first", "a"), page(3, "third", "b")]);

    assert_eq!(merged.total_pages, 2);
    assert_eq!(merged.text, "=== Page 1 ===\nfirst\n\n=== Page 2 ===\nthird");
}

#[test]
fn merged_collections_keep_page_order_and_page_numbers() {
    let merged = merge_pages(vec![page(1, "one", "a"), page(2, "two", "b"), page(3, "three", "c")]);

    let keys: Vec<&str> = merged.key_value_pairs.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    let field_pages: Vec<usize> = merged.form_fields.iter().map(|f| f.page_number).collect();
    assert_eq!(field_pages, vec![1, 2, 3]);
    let table_pages: Vec<usize> = merged.tables.iter().map(|t| t.page_number).collect();
    assert_eq!(table_pages, vec![1, 2, 3]);
}

#[test]
fn single_empty_page_still_gets_a_header() {
    let merged = merge_pages(vec![PageResult {
        page_number: 1,
        ..PageResult::default()
    }]);
    assert_eq!(merged.text, "=== Page 1 ===\n");
    assert_eq!(merged.total_pages, 1);
}

#[test]
fn mistral_pages_merge_in_index_order() {
    let results = pages_to_results(vec![
        OcrPage {
            index: 1,
            markdown: "# Terms".to_string(),
        },
        OcrPage {
            index: 0,
            markdown: "# Cover".to_string(),
        },
    ]);
    let merged = merge_pages(results);

    assert_eq!(merged.text, "=== Page 1 ===\n# Cover\n\n=== Page 2 ===\n# Terms");
    assert!(merged.key_value_pairs.is_empty());
    assert!(merged.tables.is_empty());
}
