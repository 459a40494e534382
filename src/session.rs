//! Terminal session - transcript, history, and the Idle/Executing machine
//!
//! A submission runs in two halves. `submit` echoes the line, records it in
//! history and dispatches it; synchronous results land immediately. An
//! assistant-backed result comes back as a [`Submission::Pending`] task the
//! caller drives, handing the finished record to `resolve`. Until then the
//! session is `Executing` and refuses further input, so records are always
//! appended in submission order.

use serde::Serialize;

use crate::commands::{Action, Command, PendingTask};
use crate::history::{HistoryCursor, HistoryStore, Recall};
use crate::interpreter::Interpreter;
use crate::pages;
use crate::record::OutputRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Executing,
}

/// Result of handing one line to the session
pub enum Submission {
    /// Blank input; nothing changed
    Ignored,
    /// A previous command is still executing; nothing changed
    Rejected,
    /// Result already applied
    Completed,
    /// Transcript was emptied, even if it already was
    Reset,
    /// Drive the task, then pass its record to [`Session::resolve`]
    Pending(PendingTask),
}

impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Submission::Ignored => "Ignored",
            Submission::Rejected => "Rejected",
            Submission::Completed => "Completed",
            Submission::Reset => "Reset",
            Submission::Pending(_) => "Pending(..)",
        })
    }
}

/// What `run` did, for callers that want a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Rejected,
    Done,
}

pub struct Session {
    interpreter: Interpreter,
    history: HistoryStore,
    cursor: HistoryCursor,
    transcript: Vec<OutputRecord>,
    state: SessionState,
}

impl Session {
    /// New session whose transcript opens with the welcome banner
    pub fn new(interpreter: Interpreter, history: HistoryStore) -> Self {
        let transcript = pages::banner(interpreter.profile())
            .into_iter()
            .map(OutputRecord::output)
            .collect();

        tracing::info!(
            history = history.len(),
            storage = %history.storage_description(),
            assistant = interpreter.delegate().is_configured(),
            "session started"
        );

        Self {
            interpreter,
            history,
            cursor: HistoryCursor::default(),
            transcript,
            state: SessionState::Idle,
        }
    }

    pub fn submit(&mut self, raw: &str) -> Submission {
        let line = raw.trim();
        if line.is_empty() {
            return Submission::Ignored;
        }
        if self.state == SessionState::Executing {
            tracing::debug!("submission refused while executing");
            return Submission::Rejected;
        }

        self.state = SessionState::Executing;
        self.transcript.push(OutputRecord::command(line));
        self.history.push(line);
        self.cursor.reset();

        let Some(cmd) = Command::parse(line) else {
            // Unreachable for non-blank input
            self.state = SessionState::Idle;
            return Submission::Completed;
        };

        match self.interpreter.dispatch(&cmd) {
            Action::Reply(record) => {
                self.transcript.push(record);
                self.state = SessionState::Idle;
                Submission::Completed
            }
            Action::Reset => {
                self.transcript.clear();
                self.state = SessionState::Idle;
                Submission::Reset
            }
            Action::Deferred(task) => Submission::Pending(task),
        }
    }

    /// Append the record a pending task produced and return to Idle
    pub fn resolve(&mut self, record: OutputRecord) {
        if self.state != SessionState::Executing {
            tracing::warn!(kind = record.kind.name(), "dropping result with nothing pending");
            return;
        }
        self.transcript.push(record);
        self.state = SessionState::Idle;
    }

    /// Submit and, if needed, await the pending task in place
    pub async fn run(&mut self, raw: &str) -> Outcome {
        match self.submit(raw) {
            Submission::Ignored => Outcome::Ignored,
            Submission::Rejected => Outcome::Rejected,
            Submission::Completed | Submission::Reset => Outcome::Done,
            Submission::Pending(task) => {
                let record = task.await;
                self.resolve(record);
                Outcome::Done
            }
        }
    }

    pub fn transcript(&self) -> &[OutputRecord] {
        &self.transcript
    }

    /// Records appended after the first `mark`; empty if a reset intervened
    pub fn records_after(&self, mark: usize) -> &[OutputRecord] {
        self.transcript.get(mark..).unwrap_or(&[])
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_executing(&self) -> bool {
        self.state == SessionState::Executing
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// ArrowUp: older entry for the input draft
    pub fn history_prev(&mut self, draft: &str) -> String {
        self.cursor.step(self.history.entries(), draft, Recall::Up)
    }

    /// ArrowDown: newer entry, or an empty draft past the newest
    pub fn history_next(&mut self, draft: &str) -> String {
        self.cursor.step(self.history.entries(), draft, Recall::Down)
    }

    pub fn cursor(&self) -> HistoryCursor {
        self.cursor
    }

    /// Tab: completed draft, or `None` to leave the input unchanged
    pub fn complete(&self, prefix: &str) -> Option<String> {
        self.interpreter.complete(prefix)
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Registry;
    use crate::delegate::AiDelegate;
    use crate::profile::Profile;
    use crate::record::RecordKind;
    use std::sync::Arc;

    fn session() -> Session {
        let profile = Arc::new(Profile::builtin());
        let interpreter =
            Interpreter::new(Registry::builtin(), profile.clone(), AiDelegate::new(profile));
        Session::new(interpreter, HistoryStore::in_memory())
    }

    #[test]
    fn test_starts_idle_with_banner() {
        let s = session();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(!s.transcript().is_empty());
        assert!(s.transcript().iter().all(|r| r.kind == RecordKind::Output));
    }

    #[test]
    fn test_sync_command_appends_echo_then_result() {
        let mut s = session();
        let mark = s.transcript().len();
        assert!(matches!(s.submit("  whoami "), Submission::Completed));

        let new = s.records_after(mark);
        assert_eq!(new.len(), 2);
        assert_eq!(new[0].kind, RecordKind::Command);
        assert_eq!(new[0].content, "whoami");
        assert_eq!(new[1].content, "jvega");
        assert_eq!(s.history().entries(), ["whoami".to_string()]);
    }

    #[tokio::test]
    async fn test_pending_rejects_new_input_until_resolved() {
        let mut s = session();
        let Submission::Pending(task) = s.submit("ask hello") else {
            panic!("ask should be pending");
        };
        assert!(s.is_executing());

        let before = s.transcript().len();
        assert!(matches!(s.submit("help"), Submission::Rejected));
        assert_eq!(s.transcript().len(), before);
        assert_eq!(s.history().len(), 1);

        s.resolve(task.await);
        assert!(!s.is_executing());
        assert_eq!(s.transcript().last().unwrap().kind, RecordKind::Ai);
        assert!(matches!(s.submit("help"), Submission::Completed));
    }

    #[test]
    fn test_clear_reports_reset_even_when_empty() {
        let mut s = session();
        assert!(matches!(s.submit("clear"), Submission::Reset));
        assert!(s.transcript().is_empty());
        assert!(matches!(s.submit("CLS"), Submission::Reset));
        assert!(s.transcript().is_empty());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn test_resolve_without_pending_is_ignored() {
        let mut s = session();
        let before = s.transcript().len();
        s.resolve(OutputRecord::ai("stray"));
        assert_eq!(s.transcript().len(), before);
    }

    #[test]
    fn test_clear_empties_transcript_but_keeps_history() {
        let mut s = session();
        s.submit("about");
        s.submit("clear");
        assert!(s.transcript().is_empty());
        assert_eq!(s.history().entries(), ["about".to_string(), "clear".to_string()]);
        assert!(s.records_after(5).is_empty());
    }

    #[test]
    fn test_submit_resets_recall_cursor() {
        let mut s = session();
        s.submit("help");
        s.submit("about");
        assert_eq!(s.history_prev(""), "about");
        assert!(s.cursor().is_browsing());
        s.submit("skills");
        assert!(!s.cursor().is_browsing());
        assert_eq!(s.history_prev(""), "skills");
    }

    #[tokio::test]
    async fn test_run_awaits_in_place() {
        let mut s = session();
        assert_eq!(s.run("ask who?").await, Outcome::Done);
        assert_eq!(s.run("   ").await, Outcome::Ignored);
        assert_eq!(s.state(), SessionState::Idle);
    }
}
