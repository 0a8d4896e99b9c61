//! Table binding of an order
//!
//! On the wire a binding is a string: empty for takeout, a table number, or
//! the hyphen-joined, naturally sorted numbers of merged tables (`"3-4-5"`).
//! Everywhere else it is this enum; parsing and formatting stay here.

use crate::util::natural_cmp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between member numbers of a composite binding
pub const COMPOSITE_SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum TableBinding {
    /// No table (takeout / counter order)
    #[default]
    Takeout,
    Single(String),
    /// Two or more merged tables, naturally sorted, no duplicates
    Composite(Vec<String>),
}

impl TableBinding {
    pub fn single(number: impl Into<String>) -> Self {
        Self::Single(number.into())
    }

    /// Build the binding for a set of tables pushed together.
    ///
    /// Members are sorted by natural numeric order (`"4"` before `"10"`) and
    /// deduplicated; a single member collapses to [`TableBinding::Single`].
    pub fn merged<I, S>(numbers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut members: Vec<String> = numbers
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        members.sort_by(|a, b| natural_cmp(a, b));
        members.dedup();

        match members.len() {
            0 => Self::Takeout,
            1 => Self::Single(members.remove(0)),
            _ => Self::Composite(members),
        }
    }

    /// Parse the wire form
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            Self::Takeout
        } else if raw.contains(COMPOSITE_SEPARATOR) {
            Self::merged(raw.split(COMPOSITE_SEPARATOR))
        } else {
            Self::Single(raw.to_string())
        }
    }

    pub fn is_takeout(&self) -> bool {
        matches!(self, Self::Takeout)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Composite(_))
    }

    /// Physical table numbers covered by this binding
    pub fn members(&self) -> Vec<&str> {
        match self {
            Self::Takeout => Vec::new(),
            Self::Single(n) => vec![n.as_str()],
            Self::Composite(ns) => ns.iter().map(String::as_str).collect(),
        }
    }

    pub fn contains(&self, number: &str) -> bool {
        self.members().contains(&number)
    }

    /// Wire form, also used as occupancy key
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TableBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Takeout => Ok(()),
            Self::Single(n) => f.write_str(n),
            Self::Composite(ns) => {
                for (i, n) in ns.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", COMPOSITE_SEPARATOR)?;
                    }
                    f.write_str(n)?;
                }
                Ok(())
            }
        }
    }
}

impl From<String> for TableBinding {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for TableBinding {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<TableBinding> for String {
    fn from(binding: TableBinding) -> Self {
        binding.to_string()
    }
}
