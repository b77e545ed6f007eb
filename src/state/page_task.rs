/// Page task state definitions
///
/// One `PageTask` exists per listing page in the configured range. Status
/// transitions only ever move forward; a started page never re-enters
/// `Pending`.
use std::fmt;

/// Status of a listing page within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    /// Created by the dispatcher, not yet assigned
    Pending,

    /// A worker is processing the page
    InProgress,

    /// All discovered cards were attempted
    Done,

    /// The listing never became navigable
    Failed,
}

impl PageStatus {
    /// Returns true if no further work will happen on the page
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the forward-only state machine allows this move
    pub fn can_transition_to(&self, to: PageStatus) -> bool {
        matches!(
            (self, to),
            (Self::Pending, PageStatus::InProgress)
                | (Self::InProgress, PageStatus::Done)
                | (Self::InProgress, PageStatus::Failed)
        )
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A page number with its run status
#[derive(Debug, Clone)]
pub struct PageTask {
    pub page: u32,
    status: PageStatus,
}

impl PageTask {
    pub fn new(page: u32) -> Self {
        Self {
            page,
            status: PageStatus::Pending,
        }
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    /// Moves the task forward; illegal moves are rejected
    pub fn advance(&mut self, to: PageStatus) -> bool {
        if self.status.can_transition_to(to) {
            self.status = to;
            true
        } else {
            tracing::warn!(
                "Rejected page {} status move {} -> {}",
                self.page,
                self.status,
                to
            );
            false
        }
    }
}
