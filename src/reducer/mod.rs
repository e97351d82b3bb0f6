pub mod blocks;
pub mod key_value;
pub mod merge;
pub mod page;
pub mod table;

pub use blocks::{resolve_text, Block, BlockIndex, BlockType, EntityType, RelationshipType};
pub use merge::merge_pages;
pub use page::{reduce_document, reduce_page, split_pages};
pub use table::reduce_table;
