use crate::{ExecutionResult, OperationStatus};
use serde_json::Value;

/// Query whose first data set lists every documented token of the language.
pub const REFERENCE_CATALOG_QUERY: &str = "input docs";

const SEARCH_FIELDS: [&str; 4] = ["key", "name", "altName", "description"];

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TokenType {
    Input,
    Literal,
    Operator,
    Statement,
    Symbol,
    Function,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Literal => "literal",
            Self::Operator => "operator",
            Self::Statement => "statement",
            Self::Symbol => "symbol",
            Self::Function => "function",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReferenceState {
    pub(crate) search: String,
    pub(crate) token_type: Option<TokenType>,
    pub(crate) catalog_status: Option<OperationStatus>,
    pub(crate) tokens: Option<Vec<Value>>,
    pub(crate) catalog_error: Option<String>,
}

impl ReferenceState {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn token_type(&self) -> Option<TokenType> {
        self.token_type
    }

    pub fn is_loading(&self) -> bool {
        self.catalog_status == Some(OperationStatus::Running)
    }

    pub fn tokens(&self) -> Option<&[Value]> {
        self.tokens.as_deref()
    }

    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    pub(crate) fn needs_catalog(&self) -> bool {
        self.tokens.is_none() && !self.is_loading()
    }

    pub(crate) fn set_search(&mut self, search: String) {
        self.search = search;
    }

    pub(crate) fn clear_search(&mut self) {
        self.search.clear();
        self.token_type = None;
    }

    /// Selecting the active filter again clears it.
    pub(crate) fn toggle_token_type(&mut self, token_type: TokenType) {
        self.token_type = if self.token_type == Some(token_type) {
            None
        } else {
            Some(token_type)
        };
    }

    pub(crate) fn clear_token_type(&mut self) {
        self.token_type = None;
    }

    pub(crate) fn begin_catalog_load(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        self.catalog_status = Some(OperationStatus::Running);
        self.catalog_error = None;
        true
    }

    pub(crate) fn finish_catalog_load(&mut self, outcome: Result<ExecutionResult, String>) {
        self.catalog_status = Some(OperationStatus::Idle);
        match outcome {
            Ok(result) if result.has_errors() => {
                self.catalog_error = Some(result.summary.error_messages().join("\n"));
            }
            Ok(result) => {
                let tokens = result
                    .data_sets
                    .into_iter()
                    .next()
                    .map(|data_set| data_set.data)
                    .unwrap_or_default();
                self.tokens = Some(tokens);
            }
            Err(message) => self.catalog_error = Some(message),
        }
    }

    pub fn filtered_tokens(&self) -> Vec<&Value> {
        let Some(tokens) = self.tokens.as_ref() else {
            return Vec::new();
        };
        let needle = self.search.trim().to_lowercase();
        tokens
            .iter()
            .filter(|token| match self.token_type {
                Some(kind) => token
                    .get("type")
                    .and_then(Value::as_str)
                    .is_some_and(|t| t.eq_ignore_ascii_case(kind.as_str())),
                None => true,
            })
            .filter(|token| {
                needle.is_empty()
                    || SEARCH_FIELDS.iter().any(|field| {
                        token
                            .get(*field)
                            .and_then(Value::as_str)
                            .is_some_and(|v| v.to_lowercase().contains(&needle))
                    })
            })
            .collect()
    }
}
