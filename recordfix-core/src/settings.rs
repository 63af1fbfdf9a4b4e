//! Clap-free settings for the conversion pipeline.

use recordfix_domain::ExecutionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSettings {
    /// Report members whose visibility the record forces upward.
    pub search_weakened_visibility: bool,

    pub mode: ExecutionMode,

    /// Proceed despite conflicts when running unattended.
    pub ignore_conflicts: bool,

    /// Verify declaration digests captured at prepare time before committing.
    pub check_preconditions: bool,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            search_weakened_visibility: true,
            mode: ExecutionMode::default(),
            ignore_conflicts: false,
            check_preconditions: true,
        }
    }
}

impl ConvertSettings {
    pub fn unattended() -> Self {
        Self {
            mode: ExecutionMode::Unattended,
            ..Self::default()
        }
    }
}
