//! Per-invocation state machine
//!
//! ```text
//! Idle → Extracting → Composing → AwaitingCompletion → Parsing
//!      → Serialized → Persisting → Done
//! ```
//!
//! `Failed(kind)` is reachable from every non-terminal state. There is no
//! resumption: a new invocation starts again from `Idle`.

use crate::error::ErrorKind;
use breakdown_domain::DocumentId;
use std::fmt;
use tracing::debug;

/// State of a single invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Not started
    Idle,
    /// Fetching and sanitizing the source document
    Extracting,
    /// Building the prompt
    Composing,
    /// Waiting on the completion service
    AwaitingCompletion,
    /// Parsing the reply
    Parsing,
    /// Table document built
    Serialized,
    /// Creating the breakdown document
    Persisting,
    /// Finished successfully
    Done,
    /// Finished with an error
    Failed(ErrorKind),
}

impl PipelineState {
    /// The state that follows this one on success, `None` when terminal
    pub fn successor(self) -> Option<PipelineState> {
        use PipelineState::*;
        match self {
            Idle => Some(Extracting),
            Extracting => Some(Composing),
            Composing => Some(AwaitingCompletion),
            AwaitingCompletion => Some(Parsing),
            Parsing => Some(Serialized),
            Serialized => Some(Persisting),
            Persisting => Some(Done),
            Done | Failed(_) => None,
        }
    }

    /// True for `Done` and `Failed`
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed(_))
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Failed(kind) => write!(f, "Failed({})", kind),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Tracks one invocation through its states and logs every transition
#[derive(Debug)]
pub struct StateMachine {
    document_id: DocumentId,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl StateMachine {
    /// Start in `Idle`
    pub fn new(document_id: DocumentId) -> Self {
        Self {
            document_id,
            state: PipelineState::Idle,
            history: vec![PipelineState::Idle],
        }
    }

    /// Current state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state visited, in order, including the current one
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Move to the successor state. A terminal state stays put.
    pub fn advance(&mut self) -> PipelineState {
        if let Some(next) = self.state.successor() {
            self.transition(next);
        }
        self.state
    }

    /// Move to `Failed(kind)`. A terminal state stays put.
    pub fn fail(&mut self, kind: ErrorKind) -> PipelineState {
        if !self.state.is_terminal() {
            self.transition(PipelineState::Failed(kind));
        }
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(
            document_id = %self.document_id,
            from = %self.state,
            to = %next,
            "Pipeline transition"
        );
        self.state = next;
        self.history.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn test_happy_path_sequence() {
        let mut machine = StateMachine::new(DocumentId::from("1"));
        while !machine.state().is_terminal() {
            machine.advance();
        }
        assert_eq!(
            machine.history(),
            &[
                Idle,
                Extracting,
                Composing,
                AwaitingCompletion,
                Parsing,
                Serialized,
                Persisting,
                Done
            ]
        );
    }

    #[test]
    fn test_fail_from_any_non_terminal_state() {
        for steps in 0..7 {
            let mut machine = StateMachine::new(DocumentId::from("1"));
            for _ in 0..steps {
                machine.advance();
            }
            assert_eq!(machine.fail(ErrorKind::Upstream), Failed(ErrorKind::Upstream));
        }
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let mut machine = StateMachine::new(DocumentId::from("1"));
        machine.advance();
        machine.fail(ErrorKind::NotFound);

        assert_eq!(machine.advance(), Failed(ErrorKind::NotFound));
        assert_eq!(machine.fail(ErrorKind::Upstream), Failed(ErrorKind::NotFound));
        assert_eq!(machine.history().len(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(AwaitingCompletion.to_string(), "AwaitingCompletion");
        assert_eq!(
            Failed(ErrorKind::EmptyContent).to_string(),
            "Failed(EmptyContentError)"
        );
    }
}
