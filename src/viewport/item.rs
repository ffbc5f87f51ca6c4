// chat_viewport - List virtualization engine for chat transcripts
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a list item, unique within one list.
///
/// Chat transcripts key rows by message id strings; synthetic lists and
/// tests usually use plain integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(u64),
    Str(String),
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<usize> for ItemId {
    fn from(value: usize) -> Self {
        Self::Int(value as u64)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => f.write_str(id),
        }
    }
}

/// One row of a virtualized list. The engine never mutates items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Height supplied by the caller. Takes precedence over the height
    /// function and the cache's default height.
    #[serde(default, rename = "height", skip_serializing_if = "Option::is_none")]
    pub explicit_height: Option<f64>,
}

impl Item {
    #[must_use]
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self { id: id.into(), explicit_height: None }
    }

    #[must_use]
    pub fn with_height(id: impl Into<ItemId>, height: f64) -> Self {
        Self { id: id.into(), explicit_height: Some(height) }
    }
}

/// Caller-supplied height measurement, consulted for items without an
/// explicit height.
pub type HeightFn = Box<dyn Fn(&Item, usize) -> f64>;
