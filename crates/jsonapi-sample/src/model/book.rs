use super::{Cardinality, Relation, Schema};

pub const BOOKS: &str = "books";

/// Books own an ordered list of chapters through `chapters.book`.
pub fn schema() -> Schema {
    Schema {
        type_name: BOOKS,
        attributes: &["title", "date_published"],
        required: &["title"],
        relations: vec![Relation {
            name: "chapters",
            target: super::CHAPTERS,
            cardinality: Cardinality::ToMany { inverse: "book" },
        }],
    }
}
