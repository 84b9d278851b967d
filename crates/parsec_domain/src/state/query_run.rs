use crate::ExecutionResult;

/// Per-tab bookkeeping for the execute and validate calls against the query endpoint.
///
/// Both kinds of call may be outstanding at once. Loading is the OR of the two. A validation
/// result is provisional: starting an execution or editing the query invalidates it, and
/// validation calls still in flight at that point are discarded when they resolve.
#[derive(Clone, Debug, Default)]
pub struct QueryRun {
    executions_in_flight: u32,
    validations_in_flight: u32,
    validation_epoch: u64,
    execution_result: Option<ExecutionResult>,
    validation_result: Option<ExecutionResult>,
    last_failure: Option<String>,
}

/// Which stored result a consumer should render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DisplayedResult<'a> {
    Execution(&'a ExecutionResult),
    Validation(&'a ExecutionResult),
}

impl<'a> DisplayedResult<'a> {
    pub fn result(self) -> &'a ExecutionResult {
        match self {
            Self::Execution(result) | Self::Validation(result) => result,
        }
    }
}

impl QueryRun {
    pub fn is_loading(&self) -> bool {
        self.is_executing() || self.is_validating()
    }

    pub fn is_executing(&self) -> bool {
        self.executions_in_flight > 0
    }

    pub fn is_validating(&self) -> bool {
        self.validations_in_flight > 0
    }

    pub fn validation_epoch(&self) -> u64 {
        self.validation_epoch
    }

    pub fn execution_result(&self) -> Option<&ExecutionResult> {
        self.execution_result.as_ref()
    }

    pub fn validation_result(&self) -> Option<&ExecutionResult> {
        self.validation_result.as_ref()
    }

    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// `None` until a validation result is stored.
    pub fn is_valid(&self) -> Option<bool> {
        self.validation_result
            .as_ref()
            .map(|result| !result.has_errors())
    }

    pub fn displayed_result(&self) -> Option<DisplayedResult<'_>> {
        if let Some(validation) = self.validation_result.as_ref()
            && validation.has_errors()
        {
            return Some(DisplayedResult::Validation(validation));
        }
        self.execution_result.as_ref().map(DisplayedResult::Execution)
    }

    pub(crate) fn invalidate_validation(&mut self) {
        self.validation_epoch = self.validation_epoch.wrapping_add(1);
        self.validations_in_flight = 0;
        self.validation_result = None;
    }

    pub(crate) fn begin_execute(&mut self) {
        self.invalidate_validation();
        self.executions_in_flight = self.executions_in_flight.saturating_add(1);
        self.last_failure = None;
    }

    pub(crate) fn finish_execute(&mut self, outcome: Result<ExecutionResult, String>) {
        self.executions_in_flight = self.executions_in_flight.saturating_sub(1);
        match outcome {
            Ok(result) => self.execution_result = Some(result),
            Err(message) => self.last_failure = Some(message),
        }
    }

    pub(crate) fn begin_validate(&mut self) -> u64 {
        self.validations_in_flight = self.validations_in_flight.saturating_add(1);
        self.last_failure = None;
        self.validation_epoch
    }

    /// Returns false when the resolution belongs to an invalidated epoch and was dropped.
    pub(crate) fn finish_validate(
        &mut self,
        epoch: u64,
        outcome: Result<ExecutionResult, String>,
    ) -> bool {
        if epoch != self.validation_epoch {
            return false;
        }
        self.validations_in_flight = self.validations_in_flight.saturating_sub(1);
        match outcome {
            Ok(result) => self.validation_result = Some(result),
            Err(message) => self.last_failure = Some(message),
        }
        true
    }
}
