use std::collections::BTreeMap;

use crate::core::types::{DocumentResult, FormField, PageResult, TableData};
use crate::reducer::blocks::{Block, BlockIndex, BlockType};
use crate::reducer::key_value::reduce_key_values;
use crate::reducer::merge::merge_pages;
use crate::reducer::table::reduce_table;

/// Reduces one page's blocks into text, key-value pairs, form fields and
/// tables. A page with no content is a valid, empty result.
pub fn reduce_page(blocks: &[Block], page_number: usize) -> PageResult {
    let index = BlockIndex::build(blocks);

    let text = blocks
        .iter()
        .filter(|block| block.kind == BlockType::Line)
        .filter_map(|block| block.text.as_deref())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    let key_value_pairs = reduce_key_values(blocks, &index, page_number);
    let form_fields = key_value_pairs.iter().map(FormField::from).collect();

    let tables = blocks
        .iter()
        .filter(|block| block.kind == BlockType::Table)
        .filter_map(|table| {
            let rows = reduce_table(table, &index);
            (!rows.is_empty()).then(|| TableData {
                rows,
                confidence: table.confidence.unwrap_or(0.0),
                page_number,
            })
        })
        .collect();

    PageResult {
        text,
        key_value_pairs,
        form_fields,
        tables,
        page_number,
    }
}

/// Groups a multi-page block list by each block's `page` attribute, in
/// ascending page order. Blocks without a page belong to page 1.
pub fn split_pages(blocks: Vec<Block>) -> Vec<(usize, Vec<Block>)> {
    let mut pages: BTreeMap<usize, Vec<Block>> = BTreeMap::new();
    for block in blocks {
        let page = block.page.map(|page| page.max(1) as usize).unwrap_or(1);
        pages.entry(page).or_default().push(block);
    }
    pages.into_iter().collect()
}

/// Reduces a block list that may span several pages into one document.
/// Returns `None` for an empty list.
pub fn reduce_document(blocks: Vec<Block>) -> Option<DocumentResult> {
    if blocks.is_empty() {
        return None;
    }
    let pages = split_pages(blocks)
        .into_iter()
        .map(|(page_number, blocks)| reduce_page(&blocks, page_number))
        .collect();
    Some(merge_pages(pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::blocks::RelationshipType;

    #[test]
    fn empty_page_reduces_to_empty_result() {
        let page = reduce_page(&[], 4);
        assert_eq!(page.text, "");
        assert!(page.key_value_pairs.is_empty());
        assert!(page.tables.is_empty());
        assert_eq!(page.page_number, 4);
    }

    #[test]
    fn lines_without_text_are_skipped() {
        let blocks = vec![
            Block::new("l1", BlockType::Line).with_text("first"),
            Block::new("l2", BlockType::Line),
            Block::new("l3", BlockType::Line).with_text(""),
            Block::new("w1", BlockType::Word).with_text("word"),
            Block::new("l4", BlockType::Line).with_text("second"),
        ];
        assert_eq!(reduce_page(&blocks, 1).text, "first\nsecond");
    }

    #[test]
    fn empty_tables_are_not_emitted() {
        let blocks = vec![
            Block::new("t1", BlockType::Table).with_confidence(99.0),
            Block::new("c1", BlockType::Cell)
                .with_cell_position(1, 1)
                .with_text("x"),
            Block::new("t2", BlockType::Table)
                .with_confidence(91.0)
                .with_relationship(RelationshipType::Child, ["c1"]),
        ];
        let page = reduce_page(&blocks, 2);
        assert_eq!(page.tables.len(), 1);
        assert_eq!(page.tables[0].confidence, 91.0);
        assert_eq!(page.tables[0].page_number, 2);
    }

    #[test]
    fn split_pages_orders_by_page_attribute() {
        let blocks = vec![
            Block::new("a", BlockType::Line).with_page(2),
            Block::new("b", BlockType::Line),
            Block::new("c", BlockType::Line).with_page(2),
            Block::new("d", BlockType::Line).with_page(1),
        ];
        let pages = split_pages(blocks);
        let layout: Vec<(usize, Vec<&str>)> = pages
            .iter()
            .map(|(page, blocks)| (*page, blocks.iter().map(|b| b.id.as_str()).collect()))
            .collect();
        assert_eq!(layout, vec![(1, vec!["b", "d"]), (2, vec!["a", "c"])]);
    }

    #[test]
    fn reduce_document_merges_pages_in_page_order() {
        let result = reduce_document(vec![
            Block::new("a", BlockType::Line).with_text("two").with_page(2),
            Block::new("b", BlockType::Line).with_text("one").with_page(1),
        ])
        .expect("non-empty input");
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.text, "=== Page 1 ===\none\n\n=== Page 2 ===\ntwo");
        assert!(reduce_document(Vec::new()).is_none());
    }
}
