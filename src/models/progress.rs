use serde::Serialize;
use strum::Display;

/// Pipeline phase reported to progress listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DistributionPhase {
    Normalizing,
    ResolvingAsset,
    CheckingAccounts,
    Building,
    Submitting,
    Confirming,
    Completed,
}

/// A progress snapshot: `current` of `total` work items in `phase`.
///
/// For `Submitting` and `Confirming` the items are batches; for
/// `CheckingAccounts` they are recipients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    pub phase: DistributionPhase,
    pub current: usize,
    pub total: usize,
}

impl ProgressUpdate {
    pub fn new(phase: DistributionPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
        }
    }
}
