//! # Query Translation
//!
//! Turns the raw `include`, `filter`, `fields` and `sort` query parameters into
//! a [`Query`]. Missing directives fall back to the resource's
//! [`QueryDefaults`](crate::QueryDefaults).
//!
//! Accepted forms:
//!
//! ```text
//! include=book,book.author       -> include: ["book", "book.author"]
//! sort=-ordering,title           -> sort: ["-ordering", "title"]
//! filter[title]=Foo,Bar          -> filter: { title: ["Foo", "Bar"] }
//! filter=title:Foo,year:2001     -> filter: { title: ["Foo"], year: ["2001"] }
//! fields[chapters]=title         -> fields: { chapters: ["title"] }
//! ```
//!
//! Names are not checked here. Unknown keys pass through to the validators and
//! the adapter.

use crate::config::ResourceConfig;
use crate::request::ApiRequest;
use serde::Serialize;
use std::collections::BTreeMap;

/// Normalized query directives for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Query {
    pub include: Option<Vec<String>>,
    pub filter: BTreeMap<String, Vec<String>>,
    pub fields: BTreeMap<String, Vec<String>>,
    pub sort: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Query {
    /// Builds the query for `request`, reading defaults from `config`.
    pub fn build(request: &ApiRequest, config: &ResourceConfig) -> Self {
        let defaults = &config.defaults;
        Self {
            include: split_list(&request.query, "include").or_else(|| defaults.include.clone()),
            filter: split_map(&request.query, "filter").unwrap_or_else(|| defaults.filter.clone()),
            fields: split_map(&request.query, "fields").unwrap_or_else(|| defaults.fields.clone()),
            sort: split_list(&request.query, "sort").or_else(|| defaults.sort.clone()),
        }
    }

    /// Sort directives as `(field, direction)` pairs; a leading `-` means descending.
    pub fn sort_keys(&self) -> Vec<(&str, Direction)> {
        self.sort
            .iter()
            .flatten()
            .map(|key| match key.strip_prefix('-') {
                Some(field) => (field, Direction::Descending),
                None => (key.as_str(), Direction::Ascending),
            })
            .collect()
    }

    /// The sparse fieldset requested for `type_name`, if any.
    pub fn fields_for(&self, type_name: &str) -> Option<&[String]> {
        self.fields.get(type_name).map(Vec::as_slice)
    }
}

fn split_values(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn split_list(raw: &BTreeMap<String, String>, name: &str) -> Option<Vec<String>> {
    raw.get(name).map(|value| split_values(value).collect())
}

/// Collects `name[key]=v1,v2` and `name=key:v1,key:v2` into one mapping.
/// Returns `None` when neither form appears.
fn split_map(raw: &BTreeMap<String, String>, name: &str) -> Option<BTreeMap<String, Vec<String>>> {
    let mut out: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut seen = false;

    if let Some(flat) = raw.get(name) {
        seen = true;
        for pair in split_values(flat) {
            if let Some((key, value)) = pair.split_once(':') {
                out.entry(key.trim().to_string())
                    .or_default()
                    .push(value.trim().to_string());
            }
        }
    }

    for (param, value) in raw {
        let Some(key) = param
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('['))
            .and_then(|rest| rest.strip_suffix(']'))
        else {
            continue;
        };
        seen = true;
        out.entry(key.to_string()).or_default().extend(split_values(value));
    }

    seen.then_some(out)
}
