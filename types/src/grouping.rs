//! Reassembly of one-to-many relations from flat join rows.
//!
//! A join of a parent table with a child table returns one row per child,
//! each repeating the parent's columns. [`group_rows`] folds such a stream
//! back into parents holding their children. Parents come out in the order
//! their key first appeared and children keep their relative row order, so
//! an `ORDER BY` on the query carries straight through to the result.

use std::{
    collections::{hash_map::Entry, HashMap},
    hash::Hash,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group<P, C> {
    pub parent: P,
    pub children: Vec<C>,
}

/// A flat row broke the shape its query promised. Points at a query bug,
/// not at anything a caller can recover from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupingError {
    #[error("Required column {0} is null")]
    MissingColumn(&'static str),

    #[error("Column {column} holds an invalid value: {value}")]
    InvalidColumn { column: &'static str, value: String },
}

pub fn require<T>(value: Option<T>, column: &'static str) -> Result<T, GroupingError> {
    value.ok_or(GroupingError::MissingColumn(column))
}

/// Groups `rows` by `key_of`.
///
/// `parent_of` runs once per distinct key, on the first row carrying it.
/// `child_of` runs on every row; `None` means the row has no child columns
/// (an outer join miss) and only registers the parent. The first builder
/// error aborts grouping.
pub fn group_rows<R, K, P, C, E>(
    rows: impl IntoIterator<Item = R>,
    key_of: impl Fn(&R) -> Result<K, E>,
    parent_of: impl Fn(&R) -> Result<P, E>,
    child_of: impl Fn(&R) -> Result<Option<C>, E>,
) -> Result<Vec<Group<P, C>>, E>
where
    K: Eq + Hash,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Group<P, C>> = Vec::new();

    for row in rows {
        let index = match positions.entry(key_of(&row)?) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                groups.push(Group {
                    parent: parent_of(&row)?,
                    children: Vec::new(),
                });
                *entry.insert(groups.len() - 1)
            }
        };
        if let Some(child) = child_of(&row)? {
            groups[index].children.push(child);
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[derive(Clone, Debug)]
    struct Row {
        parent: Option<&'static str>,
        child: Option<u32>,
    }

    fn row(parent: &'static str, child: u32) -> Row {
        Row {
            parent: Some(parent),
            child: Some(child),
        }
    }

    fn group(rows: Vec<Row>) -> Result<Vec<Group<String, u32>>, GroupingError> {
        group_rows(
            rows,
            |row| require(row.parent, "parent"),
            |row| require(row.parent, "parent").map(str::to_string),
            |row| Ok(row.child),
        )
    }

    #[test]
    fn test_parent_order_follows_first_appearance() {
        let groups = group(vec![
            row("zeta", 1),
            row("alpha", 2),
            row("zeta", 3),
            row("mid", 4),
            row("alpha", 5),
        ])
        .unwrap();

        assert_eq!(
            groups.iter().map(|g| g.parent.as_str()).collect_vec(),
            vec!["zeta", "alpha", "mid"]
        );
    }

    #[test]
    fn test_child_order_follows_row_order() {
        let groups = group(vec![
            row("a", 30),
            row("b", 1),
            row("a", 10),
            row("a", 20),
        ])
        .unwrap();

        assert_eq!(groups[0].children, vec![30, 10, 20]);
        assert_eq!(groups[1].children, vec![1]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert!(group(vec![]).unwrap().is_empty());
    }

    #[test]
    fn test_row_without_child_registers_parent_only() {
        let groups = group(vec![
            Row {
                parent: Some("lonely"),
                child: None,
            },
            row("busy", 1),
        ])
        .unwrap();

        assert_eq!(groups.len(), 2);
        assert!(groups[0].children.is_empty());
        assert_eq!(groups[1].children, vec![1]);
    }

    #[test]
    fn test_parent_builder_runs_once_per_key() {
        let calls = std::cell::Cell::new(0);
        let groups = group_rows(
            vec![row("a", 1), row("a", 2), row("b", 3)],
            |row| require(row.parent, "parent"),
            |row| {
                calls.set(calls.get() + 1);
                require(row.parent, "parent")
            },
            |row| Ok(row.child),
        )
        .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_missing_key_is_a_data_integrity_error() {
        let result = group(vec![
            row("a", 1),
            Row {
                parent: None,
                child: Some(2),
            },
        ]);

        assert_eq!(result, Err(GroupingError::MissingColumn("parent")));
    }
}
