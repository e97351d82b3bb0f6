use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    Page,
    Line,
    Word,
    KeyValueSet,
    Table,
    Cell,
    #[serde(other)]
    Other,
}

impl From<&str> for BlockType {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PAGE" => Self::Page,
            "LINE" => Self::Line,
            "WORD" => Self::Word,
            "KEY_VALUE_SET" => Self::KeyValueSet,
            "TABLE" => Self::Table,
            "CELL" => Self::Cell,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    Child,
    Value,
    #[serde(other)]
    Other,
}

impl From<&str> for RelationshipType {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "CHILD" => Self::Child,
            "VALUE" => Self::Value,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Key,
    Value,
    #[serde(other)]
    Other,
}

impl From<&str> for EntityType {
    fn from(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "KEY" => Self::Key,
            "VALUE" => Self::Value,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Relationship {
    #[serde(rename = "Type")]
    pub kind: RelationshipType,
    #[serde(default)]
    pub ids: Vec<String>,
}

/// One unit of provider output. Field names follow Textract's JSON so saved
/// `AnalyzeDocument` responses deserialize directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "BlockType")]
    pub kind: BlockType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_types: Vec<EntityType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockType) -> Self {
        Self {
            id: id.into(),
            kind,
            text: None,
            confidence: None,
            entity_types: Vec::new(),
            relationships: Vec::new(),
            row_index: None,
            column_index: None,
            page: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_entity(mut self, entity: EntityType) -> Self {
        self.entity_types.push(entity);
        self
    }

    pub fn with_relationship<I, S>(mut self, kind: RelationshipType, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relationships.push(Relationship {
            kind,
            ids: ids.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_cell_position(mut self, row: u32, column: u32) -> Self {
        self.row_index = Some(row);
        self.column_index = Some(column);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// First edge of the given type; providers emit at most one per type.
    pub fn relationship(&self, kind: RelationshipType) -> Option<&Relationship> {
        self.relationships.iter().find(|edge| edge.kind == kind)
    }

    pub fn has_entity(&self, entity: EntityType) -> bool {
        self.entity_types.contains(&entity)
    }
}

/// Id-keyed lookup over one page's blocks.
#[derive(Debug, Default)]
pub struct BlockIndex<'a> {
    by_id: HashMap<&'a str, &'a Block>,
}

impl<'a> BlockIndex<'a> {
    pub fn build(blocks: &'a [Block]) -> Self {
        let by_id = blocks
            .iter()
            .map(|block| (block.id.as_str(), block))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a Block> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Blocks referenced by `block`'s edge of type `kind`, skipping ids that
    /// are not in the index.
    pub fn related(&self, block: &Block, kind: RelationshipType) -> Vec<&'a Block> {
        block
            .relationship(kind)
            .map(|edge| edge.ids.iter().filter_map(|id| self.get(id)).collect())
            .unwrap_or_default()
    }
}

/// Literal text when present, otherwise the space-joined literal text of the
/// block's CHILD blocks.
pub fn resolve_text(block: &Block, index: &BlockIndex<'_>) -> String {
    if let Some(text) = &block.text {
        return text.clone();
    }
    index
        .related(block, RelationshipType::Child)
        .into_iter()
        .filter_map(|child| child.text.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
}
