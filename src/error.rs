// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("import is missing required field '{0}'")]
    MissingField(&'static str),
    #[error("saved bill '{0}' not found")]
    BillNotFound(String),
}

/// Failures talking to the chat proxy, split the way they are shown to the
/// user.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("cannot connect to {endpoint}: {source}")]
    Connection {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error! status: {0}")]
    Status(reqwest::StatusCode),
    #[error("{0}")]
    Backend(String),
    #[error("unexpected response format")]
    UnexpectedFormat,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ChatError {
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Connection { endpoint, .. } => format!(
                "⚠️ Cannot connect to server. Make sure the backend is running at {}",
                endpoint
            ),
            ChatError::Status(_) => format!("⚠️ Server error: {}", self),
            ChatError::Backend(msg) => format!("⚠️ Error: {}", msg),
            ChatError::UnexpectedFormat => {
                "⚠️ Received an unexpected response from the assistant.".to_string()
            }
            ChatError::Transport(err) => format!("⚠️ Error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_carry_code() {
        let err = ChatError::Status(reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(
            err.user_message(),
            "⚠️ Server error: HTTP error! status: 502 Bad Gateway"
        );
        assert_eq!(
            ChatError::Backend("quota".into()).user_message(),
            "⚠️ Error: quota"
        );
    }
}
