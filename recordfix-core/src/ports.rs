//! Port traits abstracting user interaction away from the pipeline.

use recordfix_types::ConflictReport;

/// Asks whether to continue a conversion that has conflicts.
pub trait ConfirmPort {
    /// `rendered` is the markdown listing of `conflicts`. Returning `false` cancels the conversion.
    fn confirm_conflicts(&self, conflicts: &ConflictReport, rendered: &str)
    -> anyhow::Result<bool>;
}
