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

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewportError {
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },
    #[error("failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },
    #[error("item index {index} out of range for list of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl ViewportError {
    pub const INVALID_CONFIG_EXIT_CODE: i32 = 30;
    pub const READ_EXIT_CODE: i32 = 31;
    pub const PARSE_EXIT_CODE: i32 = 32;
    pub const INDEX_OUT_OF_RANGE_EXIT_CODE: i32 = 33;

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidConfig(_) => Self::INVALID_CONFIG_EXIT_CODE,
            Self::Read { .. } => Self::READ_EXIT_CODE,
            Self::Parse { .. } => Self::PARSE_EXIT_CODE,
            Self::IndexOutOfRange { .. } => Self::INDEX_OUT_OF_RANGE_EXIT_CODE,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidConfig(reason) => format!("Configuration rejected: {reason}."),
            Self::Read { path, .. } => format!("Could not read `{path}`. Check the path exists."),
            Self::Parse { path, reason } => {
                format!("`{path}` is not a valid JSON document: {reason}")
            }
            Self::IndexOutOfRange { index, len } => {
                format!("Scenario scrolls to item {index}, but the list only has {len} items.")
            }
        }
    }
}
