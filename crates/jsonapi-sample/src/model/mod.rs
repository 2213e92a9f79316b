//! Records held by the in-memory store and the schemas that describe them.
//!
//! A schema lists a type's attributes, which of them are required, and its
//! relations. Relations are looked up by name with [`Schema::relation`].

pub mod book;
pub mod chapter;
pub mod record;

pub use book::BOOKS;
pub use chapter::CHAPTERS;
pub use record::*;

/// How many records sit on the far side of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ToOne,
    /// Backed by the named to-one relation on the target type.
    ToMany { inverse: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: &'static str,
    pub target: &'static str,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub type_name: &'static str,
    pub attributes: &'static [&'static str],
    pub required: &'static [&'static str],
    pub relations: Vec<Relation>,
}

impl Schema {
    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub fn is_required(&self, attribute: &str) -> bool {
        self.required.contains(&attribute)
    }
}

/// Every schema the sample store knows about.
pub fn schemas() -> Vec<Schema> {
    vec![book::schema(), chapter::schema()]
}
