//! Default port implementations.

use crate::ports::ConfirmPort;
use recordfix_types::ConflictReport;
use tracing::debug;

/// Answers every confirmation the same way without asking anyone.
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirm {
    answer: bool,
}

impl FixedConfirm {
    pub fn accept() -> Self {
        Self { answer: true }
    }

    pub fn decline() -> Self {
        Self { answer: false }
    }
}

impl ConfirmPort for FixedConfirm {
    fn confirm_conflicts(
        &self,
        conflicts: &ConflictReport,
        _rendered: &str,
    ) -> anyhow::Result<bool> {
        debug!(
            elements = conflicts.len(),
            answer = self.answer,
            "answering conflict confirmation"
        );
        Ok(self.answer)
    }
}
