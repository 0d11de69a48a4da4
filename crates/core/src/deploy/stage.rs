//! Deployment stages (pure state machine).

use std::fmt;

/// A point a deploy has reached. Stages are strictly ordered and each
/// transition is gated on the previous one succeeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Start,
    DependenciesInstalled,
    FrontendBuilt,
    AccountBootstrapped,
    StackApplied,
    AssetsPublished,
    OutputsReported,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Start,
        Stage::DependenciesInstalled,
        Stage::FrontendBuilt,
        Stage::AccountBootstrapped,
        Stage::StackApplied,
        Stage::AssetsPublished,
        Stage::OutputsReported,
    ];

    /// The stage reached after this one succeeds, `None` once terminal.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Start => Some(Stage::DependenciesInstalled),
            Stage::DependenciesInstalled => Some(Stage::FrontendBuilt),
            Stage::FrontendBuilt => Some(Stage::AccountBootstrapped),
            Stage::AccountBootstrapped => Some(Stage::StackApplied),
            Stage::StackApplied => Some(Stage::AssetsPublished),
            Stage::AssetsPublished => Some(Stage::OutputsReported),
            Stage::OutputsReported => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::DependenciesInstalled => "dependencies-installed",
            Stage::FrontendBuilt => "frontend-built",
            Stage::AccountBootstrapped => "account-bootstrapped",
            Stage::StackApplied => "stack-applied",
            Stage::AssetsPublished => "assets-published",
            Stage::OutputsReported => "outputs-reported",
        }
    }

    /// Progress line shown while working towards this stage.
    pub fn activity(self) -> &'static str {
        match self {
            Stage::Start => "Starting deployment",
            Stage::DependenciesInstalled => "Installing frontend dependencies",
            Stage::FrontendBuilt => "Building frontend bundle",
            Stage::AccountBootstrapped => "Checking account bootstrap",
            Stage::StackApplied => "Applying stack",
            Stage::AssetsPublished => "Publishing assets",
            Stage::OutputsReported => "Reading stack outputs",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_walks_all_stages_in_order() {
        let mut walked = vec![Stage::Start];
        let mut current = Stage::Start;
        while let Some(next) = current.next() {
            walked.push(next);
            current = next;
        }
        assert_eq!(walked, Stage::ALL.to_vec());
        assert!(current.is_terminal());
    }

    #[test]
    fn test_ordering_matches_progression() {
        for pair in Stage::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Stage::FrontendBuilt.to_string(), "frontend-built");
        assert_eq!(Stage::OutputsReported.as_str(), "outputs-reported");
    }
}
