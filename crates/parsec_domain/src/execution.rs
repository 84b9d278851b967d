use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MemoryStats {
    #[serde(default)]
    pub free: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub max: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PerformanceStats {
    #[serde(default)]
    pub parse: f64,
    #[serde(default)]
    pub compile: f64,
    #[serde(default)]
    pub execute: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DataSet {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub temporary: bool,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Value>,
}

/// Execution metadata returned by the query endpoint, without the bulk data sets.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    #[serde(default)]
    pub parsed_tree: Value,
    #[serde(default)]
    pub pretty_parsed_tree: String,
    #[serde(default)]
    pub memory: MemoryStats,
    #[serde(default)]
    pub performance: PerformanceStats,
    #[serde(default)]
    pub errors: Vec<Value>,
}

impl ExecutionSummary {
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            errors: vec![Value::String(message.into())],
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|err| match err {
                Value::String(text) => text.clone(),
                Value::Object(map) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned)
                    .unwrap_or_else(|| err.to_string()),
                other => other.to_string(),
            })
            .collect()
    }
}

/// Response body of both `/api/execute` and `/api/validate`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    #[serde(flatten)]
    pub summary: ExecutionSummary,
    #[serde(default)]
    pub data_sets: Vec<DataSet>,
}

impl ExecutionResult {
    pub fn has_errors(&self) -> bool {
        self.summary.has_errors()
    }

    pub fn into_parts(self) -> (ExecutionSummary, Vec<DataSet>) {
        (self.summary, self.data_sets)
    }
}
