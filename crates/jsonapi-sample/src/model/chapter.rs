use super::{Cardinality, Relation, Schema};

pub const CHAPTERS: &str = "chapters";

pub fn schema() -> Schema {
    Schema {
        type_name: CHAPTERS,
        attributes: &["title", "ordering"],
        required: &["title", "ordering"],
        relations: vec![Relation {
            name: "book",
            target: super::BOOKS,
            cardinality: Cardinality::ToOne,
        }],
    }
}
