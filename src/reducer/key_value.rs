use crate::core::types::KeyValuePair;
use crate::reducer::blocks::{
    resolve_text, Block, BlockIndex, BlockType, EntityType, RelationshipType,
};

/// Pairs every KEY-role KEY_VALUE_SET block with the block named by its
/// VALUE edge.
///
/// Only the first VALUE id is used. Keys that resolve to empty text are
/// dropped; an empty value is kept. Confidence is the lower of the two block
/// confidences, with a missing score counting as 0.
pub fn reduce_key_values(
    blocks: &[Block],
    index: &BlockIndex<'_>,
    page_number: usize,
) -> Vec<KeyValuePair> {
    blocks
        .iter()
        .filter(|block| block.kind == BlockType::KeyValueSet && block.has_entity(EntityType::Key))
        .filter_map(|key_block| {
            let key = resolve_text(key_block, index);
            if key.is_empty() {
                return None;
            }

            let value_block = key_block
                .relationship(RelationshipType::Value)
                .and_then(|edge| edge.ids.first())
                .and_then(|id| index.get(id));
            let value = value_block
                .map(|block| resolve_text(block, index))
                .unwrap_or_default();
            let confidence = key_block
                .confidence
                .unwrap_or(0.0)
                .min(value_block.and_then(|block| block.confidence).unwrap_or(0.0));

            Some(KeyValuePair {
                key,
                value,
                confidence,
                page_number,
            })
        })
        .collect()
}
