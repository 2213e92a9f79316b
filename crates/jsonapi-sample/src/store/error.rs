//! Errors raised by the store itself. Messages mimic what a SQL store reports.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("NOT NULL constraint failed: {type_name}.{attribute}")]
    NotNull { type_name: String, attribute: String },

    #[error("FOREIGN KEY constraint failed: {type_name}.{relation} -> {target}")]
    MissingReference {
        type_name: String,
        relation: String,
        target: String,
    },

    #[error("UNIQUE constraint failed: {type_name}.id = {id}")]
    DuplicateId { type_name: String, id: String },

    #[error("No such table: {0}")]
    UnknownType(String),

    #[error("{type_name} has no relation named {relation}")]
    UnknownRelation { type_name: String, relation: String },

    #[error("{type_name} {id} does not exist")]
    NotFound { type_name: String, id: String },

    #[error("Malformed payload: {0}")]
    Malformed(String),
}
