use super::{Cpu, Execution, Progress};
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Undo history
///
/// Executions are appended once they complete and reverted as they are
/// popped. An execution blocked on input is parked outside the history until
/// `resume` completes it.

#[derive(Default)]
pub struct ExecutionStack {
    vec: Vec<Execution>,
    pending: Option<Execution>,
}

impl std::fmt::Debug for ExecutionStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries: Vec<String> = self.vec.iter().map(|e| e.to_string()).collect();
        write!(f, "{:?}", entries)
    }
}

impl ExecutionStack {
    pub fn new() -> ExecutionStack {
        ExecutionStack::default()
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Execution> {
        self.vec.iter()
    }

    pub fn push(&mut self, mut execution: Execution, cpu: &mut Cpu) -> Result<Progress> {
        debug_assert!(self.pending.is_none());
        log::debug!("do {}", execution);
        match execution.apply(cpu)? {
            Progress::Complete => self.vec.push(execution),
            Progress::Waiting => self.pending = Some(execution),
        }
        Ok(self.progress())
    }

    /// Retries the execution waiting on input, if any.
    pub fn resume(&mut self, cpu: &mut Cpu) -> Result<Progress> {
        if let Some(mut execution) = self.pending.take() {
            match execution.apply(cpu)? {
                Progress::Complete => self.vec.push(execution),
                Progress::Waiting => self.pending = Some(execution),
            }
        }
        Ok(self.progress())
    }

    pub fn pop(&mut self, cpu: &mut Cpu) -> Result<Execution> {
        if self.pending.is_some() {
            return Err(error!(InputPending; "CANNOT UNDO WHILE AN INSTRUCTION WAITS"));
        }
        match self.vec.pop() {
            Some(execution) => {
                log::debug!("undo {}", execution);
                execution.revert(cpu);
                Ok(execution)
            }
            None => Err(error!(EmptyHistory)),
        }
    }

    fn progress(&self) -> Progress {
        if self.pending.is_some() {
            Progress::Waiting
        } else {
            Progress::Complete
        }
    }
}
