use std::fmt;

/// Lifecycle of a crawl run
///
/// `Running` while workers may dequeue, `Draining` once dequeuing has stopped
/// (frontier exhausted, budget reached, deadline or stop signal) but in-flight
/// pages may still finish, and `Terminated` after every worker has exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EngineState {
    Running,
    Draining,
    Terminated,
}

impl EngineState {
    /// Returns true while new targets may still be dispatched
    pub fn accepts_work(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Advances to `next`, never moving backwards
    pub fn advance(&mut self, next: EngineState) {
        if next > *self {
            *self = next;
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
        };
        write!(f, "{}", label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let mut state = EngineState::Running;
        state.advance(EngineState::Draining);
        assert_eq!(state, EngineState::Draining);

        state.advance(EngineState::Running);
        assert_eq!(state, EngineState::Draining);

        state.advance(EngineState::Terminated);
        assert_eq!(state, EngineState::Terminated);
    }

    #[test]
    fn test_accepts_work() {
        assert!(EngineState::Running.accepts_work());
        assert!(!EngineState::Draining.accepts_work());
        assert!(!EngineState::Terminated.accepts_work());
    }
}
