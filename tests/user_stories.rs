//! User Story Integration Tests
//!
//! These tests trace complete visitor workflows with logging to verify
//! the terminal behaves correctly from the visitor's perspective.
//!
//! Each test represents a real user story:
//! - "As a visitor, I want to..."
//! - Tests drive a real `Session` end to end
//! - Logs are captured for debugging

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use termfolio::client::{BackendError, CompletionBackend};
use termfolio::commands::Registry;
use termfolio::delegate::{AiDelegate, APOLOGY};
use termfolio::history::{HistoryStore, JsonFileStorage, HISTORY_LIMIT};
use termfolio::interpreter::Interpreter;
use termfolio::profile::Profile;
use termfolio::record::{OutputRecord, RecordKind};
use termfolio::session::{Session, SessionState, Submission};

/// Test helper to capture and display trace logs
struct TestTracer {
    name: String,
    logs: Vec<String>,
}

impl TestTracer {
    fn new(name: &str) -> Self {
        eprintln!("\n╔═══════════════════════════════════════════════════════════════");
        eprintln!("║ USER STORY: {}", name);
        eprintln!("╚═══════════════════════════════════════════════════════════════\n");
        Self {
            name: name.to_string(),
            logs: vec![],
        }
    }

    fn step(&mut self, description: &str) {
        let msg = format!("  → {}", description);
        eprintln!("{}", msg);
        self.logs.push(msg);
    }

    fn expect(&mut self, condition: bool, description: &str) {
        let status = if condition { "✓" } else { "✗" };
        let msg = format!("    {} {}", status, description);
        eprintln!("{}", msg);
        self.logs.push(msg);
        assert!(condition, "FAILED: {}", description);
    }

    fn done(&self) {
        eprintln!("\n  ══════════════════════════════════════════════════════");
        eprintln!("  ✓ Story completed: {} ({} checks)", self.name, self.logs.len());
        eprintln!();
    }
}

/// Backend that counts calls and answers from a script
struct CountingBackend {
    calls: AtomicUsize,
    reply: Result<String, u16>,
}

impl CountingBackend {
    fn answering(text: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Ok(text.to_string()),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: Err(status),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for CountingBackend {
    async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(BackendError::Status {
                status: *status,
                body: "upstream failure".into(),
            }),
        }
    }

    fn describe(&self) -> String {
        "counting".into()
    }
}

fn build(delegate: impl FnOnce(AiDelegate) -> AiDelegate, history: HistoryStore) -> Session {
    let profile = Arc::new(Profile::builtin());
    let delegate = delegate(AiDelegate::new(profile.clone()));
    Session::new(Interpreter::new(Registry::builtin(), profile, delegate), history)
}

fn session() -> Session {
    build(|d| d, HistoryStore::in_memory())
}

fn appended(session: &Session, mark: usize) -> Vec<OutputRecord> {
    session.records_after(mark).to_vec()
}

// ═══════════════════════════════════════════════════════════════
// STORY: Visitor runs a portfolio command
// ═══════════════════════════════════════════════════════════════

#[test]
fn story_command_echo_then_single_result() {
    let mut t = TestTracer::new("Command is echoed followed by exactly one result");

    t.step("Given a fresh session");
    let mut s = session();
    let mark = s.transcript().len();
    t.expect(mark > 0, "Transcript opens with the welcome banner");

    t.step("When the visitor types 'about'");
    let result = s.submit("about");
    t.expect(matches!(result, Submission::Completed), "Command completes synchronously");

    let new = appended(&s, mark);
    t.expect(new.len() == 2, "Exactly two records appended");
    t.expect(new[0].kind == RecordKind::Command, "First is the command echo");
    t.expect(new[0].content == "about", "Echo holds the typed line");
    t.expect(new[1].kind == RecordKind::Output, "Second is the output");
    t.expect(new[1].content.contains("Jordan Vega"), "About page names the owner");
    t.expect(s.state() == SessionState::Idle, "Session is idle again");

    t.done();
}

#[test]
fn story_unknown_command_reports_error() {
    let mut t = TestTracer::new("Unknown command produces an error record");

    let mut s = session();
    let mark = s.transcript().len();

    t.step("When the visitor types 'frobnicate'");
    s.submit("frobnicate");

    let new = appended(&s, mark);
    t.expect(new.len() == 2, "Echo plus one error");
    t.expect(new[1].kind == RecordKind::Error, "Result is an error");
    t.expect(
        new[1].content.starts_with("Command not found: frobnicate."),
        "Message names the unknown command",
    );
    t.expect(s.history().entries() == ["frobnicate".to_string()], "Unknown commands still enter history");

    t.step("When the visitor mistypes a known command");
    let mark = s.transcript().len();
    s.submit("skils");
    let new = appended(&s, mark);
    t.expect(new[1].content.contains("Did you mean 'skills'?"), "A close name is suggested");

    t.done();
}

#[test]
fn story_command_names_are_case_insensitive() {
    let mut t = TestTracer::new("Command names match regardless of case");

    let mut s = session();
    let mark = s.transcript().len();
    t.step("When the visitor types 'WHOAMI'");
    s.submit("WHOAMI");

    let new = appended(&s, mark);
    t.expect(new[1].kind == RecordKind::Output, "Resolved to whoami");
    t.expect(new[1].content == "jvega", "Prints the handle");
    t.expect(new[0].content == "WHOAMI", "Echo keeps the original casing");

    t.done();
}

// ═══════════════════════════════════════════════════════════════
// STORY: Clearing and blank input
// ═══════════════════════════════════════════════════════════════

#[test]
fn story_clear_empties_transcript_and_is_idempotent() {
    let mut t = TestTracer::new("clear empties the transcript");

    let mut s = session();
    s.submit("skills");

    t.step("When the visitor types 'clear'");
    t.expect(matches!(s.submit("clear"), Submission::Reset), "Reported as a reset");
    t.expect(s.transcript().is_empty(), "Transcript is empty, not even an echo");

    t.step("When the visitor clears again");
    t.expect(matches!(s.submit("cls"), Submission::Reset), "Still reported as a reset");
    t.expect(s.transcript().is_empty(), "Still empty");

    t.step("When the visitor runs pwd afterwards");
    s.submit("pwd");
    t.expect(s.transcript().len() == 2, "Only the new command and its output");
    t.expect(
        s.history().entries() == ["skills", "clear", "cls", "pwd"].map(String::from),
        "History keeps every command including clear",
    );

    t.done();
}

#[test]
fn story_blank_input_has_no_effect() {
    let mut t = TestTracer::new("Blank input is ignored");

    let mut s = session();
    let before = s.transcript().len();

    for raw in ["", "   ", "\t \t"] {
        t.step(&format!("When the visitor submits {:?}", raw));
        t.expect(matches!(s.submit(raw), Submission::Ignored), "Submission ignored");
    }
    t.expect(s.transcript().len() == before, "Transcript unchanged");
    t.expect(s.history().is_empty(), "History unchanged");
    t.expect(s.state() == SessionState::Idle, "State unchanged");

    t.done();
}

// ═══════════════════════════════════════════════════════════════
// STORY: History persistence and recall
// ═══════════════════════════════════════════════════════════════

#[test]
fn story_history_is_capped_and_persisted() {
    let mut t = TestTracer::new("History keeps the newest 50 entries across sessions");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("terminal-history.json");

    t.step("Given a session backed by a history file");
    let mut s = build(|d| d, HistoryStore::hydrate(Box::new(JsonFileStorage::new(&path))));

    t.step("When 51 distinct commands are submitted");
    for i in 0..51 {
        s.submit(&format!("cmd{}", i));
    }

    let entries = s.history().entries();
    t.expect(entries.len() == HISTORY_LIMIT, "History holds exactly 50");
    t.expect(entries.first().map(String::as_str) == Some("cmd1"), "Oldest entry evicted");
    t.expect(entries.last().map(String::as_str) == Some("cmd50"), "Newest entry last");

    t.step("When a new session loads the same file");
    let reloaded = HistoryStore::hydrate(Box::new(JsonFileStorage::new(&path)));
    t.expect(reloaded.entries() == entries, "Entries survive a restart");

    t.done();
}

#[test]
fn story_history_recall_walks_back_and_forth() {
    let mut t = TestTracer::new("ArrowUp/ArrowDown recall previous commands");

    let mut s = session();
    for cmd in ["a", "b", "c"] {
        s.submit(cmd);
    }

    t.step("When the visitor presses Up four times");
    let ups: Vec<String> = (0..4).map(|_| s.history_prev("")).collect();
    t.expect(ups == ["c", "b", "a", "a"], "Recall c, b, a and stays at the oldest");

    t.step("When the visitor presses Down once");
    t.expect(s.history_next("") == "b", "Moves one newer");

    t.step("When the visitor presses Down past the newest");
    s.history_next("");
    t.expect(s.history_next("") == "", "Input empties");
    t.expect(!s.cursor().is_browsing(), "Browsing ends");

    t.step("When Down is pressed without browsing");
    t.expect(s.history_next("draft") == "draft", "Draft is left alone");

    t.done();
}

// ═══════════════════════════════════════════════════════════════
// STORY: Tab completion
// ═══════════════════════════════════════════════════════════════

#[test]
fn story_tab_completion() {
    let mut t = TestTracer::new("Tab completes a unique command prefix");

    let s = session();

    t.step("When the visitor types 'pro' and presses Tab");
    t.expect(s.complete("pro").as_deref() == Some("projects "), "Completes to 'projects '");

    t.step("When the prefix is ambiguous");
    t.expect(s.complete("s").is_none(), "skills/socials/sudo: input unchanged");

    t.step("When nothing matches");
    t.expect(s.complete("zzz").is_none(), "Input unchanged");

    t.done();
}

// ═══════════════════════════════════════════════════════════════
// STORY: Asking the assistant
// ═══════════════════════════════════════════════════════════════

#[tokio::test]
async fn story_blank_ask_never_reaches_backend() {
    let mut t = TestTracer::new("ask without a question shows usage");

    let backend = CountingBackend::answering("unused");
    let mut s = build(|d| d.with_backend(backend.clone()), HistoryStore::in_memory());
    let mark = s.transcript().len();

    t.step("When the visitor types 'ask' with nothing after it");
    let result = s.submit("ask   ");
    t.expect(matches!(result, Submission::Completed), "Answered synchronously");

    let new = appended(&s, mark);
    t.expect(new[1].kind == RecordKind::Error, "Usage error shown");
    t.expect(
        new[1].content == "Please provide a question. Usage: ask <your question>",
        "Exact usage message",
    );
    t.expect(backend.calls() == 0, "Backend never invoked");

    t.done();
}

#[tokio::test]
async fn story_unconfigured_ask_answers_in_demo_mode() {
    let mut t = TestTracer::new("ask without an API key answers with demo text");

    let mut s = session();
    let mark = s.transcript().len();

    t.step("When the visitor asks 'hello'");
    s.run("ask hello").await;

    let new = appended(&s, mark);
    t.expect(new.len() == 2, "Echo plus answer");
    t.expect(new[1].kind == RecordKind::Ai, "Answer is AI kind");
    t.expect(new[1].content.starts_with("🤖 AI Assistant: "), "Carries the assistant prefix");
    t.expect(new[1].content.contains("Jordan Vega"), "Demo text names the owner");
    t.expect(new[1].content.contains("OPENROUTER_API_KEY"), "Explains how to configure");

    t.done();
}

#[tokio::test]
async fn story_configured_ask_uses_backend_and_survives_failure() {
    let mut t = TestTracer::new("ask goes through the backend and degrades to an apology");

    t.step("Given a working backend");
    let ok = CountingBackend::answering("Rust and distributed systems.");
    let mut s = build(|d| d.with_backend(ok.clone()), HistoryStore::in_memory());
    s.run("ask what do you do?").await;
    let last = s.transcript().last().cloned().unwrap();
    t.expect(ok.calls() == 1, "Backend called once");
    t.expect(
        last.content == "🤖 AI Assistant: Rust and distributed systems.",
        "Answer shown with prefix",
    );

    t.step("Given a backend returning HTTP 500");
    let broken = CountingBackend::failing(500);
    let mut s = build(|d| d.with_backend(broken.clone()), HistoryStore::in_memory());
    s.run("ask anything").await;
    let last = s.transcript().last().cloned().unwrap();
    t.expect(last.kind == RecordKind::Ai, "Still an AI record");
    t.expect(last.content.ends_with(APOLOGY), "Apology instead of an error");
    t.expect(s.state() == SessionState::Idle, "Session recovers to idle");

    t.done();
}

#[tokio::test]
async fn story_input_rejected_while_executing() {
    let mut t = TestTracer::new("A second command waits for the assistant");

    let mut s = session();

    t.step("When the visitor asks a question");
    let Submission::Pending(task) = s.submit("ask slow question") else {
        panic!("ask should be pending");
    };
    t.expect(s.state() == SessionState::Executing, "Session is executing");

    t.step("When the visitor submits another command meanwhile");
    let before = s.transcript().len();
    t.expect(matches!(s.submit("help"), Submission::Rejected), "Submission rejected");
    t.expect(s.transcript().len() == before, "Transcript unchanged");
    t.expect(s.history().len() == 1, "History unchanged");

    t.step("When the answer arrives");
    s.resolve(task.await);
    t.expect(s.state() == SessionState::Idle, "Back to idle");
    t.expect(s.transcript().last().map(|r| r.kind) == Some(RecordKind::Ai), "Answer appended last");
    t.expect(matches!(s.submit("help"), Submission::Completed), "Next command accepted");

    t.done();
}

// ═══════════════════════════════════════════════════════════════
// STORY: Easter eggs
// ═══════════════════════════════════════════════════════════════

#[test]
fn story_sudo_easter_egg() {
    let mut t = TestTracer::new("sudo rm -rf /* is a joke, other sudo fails");

    let mut s = session();
    let mark = s.transcript().len();
    s.submit("sudo rm -rf /*");
    let new = appended(&s, mark);
    t.expect(new[1].kind == RecordKind::Ai, "Narrative shown as AI text");

    let mark = s.transcript().len();
    s.submit("sudo make me a sandwich");
    let new = appended(&s, mark);
    t.expect(new[1].kind == RecordKind::Error, "Other sudo is an error");
    t.expect(
        new[1].content == "sudo: make me a sandwich: command not found",
        "Names the attempted command",
    );

    t.done();
}

// ═══════════════════════════════════════════════════════════════
// RUN SUMMARY
// ═══════════════════════════════════════════════════════════════

#[test]
fn all_user_stories_documented() {
    eprintln!("\n");
    eprintln!("╔═══════════════════════════════════════════════════════════════");
    eprintln!("║ USER STORY TEST COVERAGE");
    eprintln!("╠═══════════════════════════════════════════════════════════════");
    eprintln!("║ ");
    eprintln!("║ Commands:");
    eprintln!("║   • story_command_echo_then_single_result");
    eprintln!("║   • story_unknown_command_reports_error");
    eprintln!("║   • story_command_names_are_case_insensitive");
    eprintln!("║   • story_sudo_easter_egg");
    eprintln!("║ ");
    eprintln!("║ Transcript:");
    eprintln!("║   • story_clear_empties_transcript_and_is_idempotent");
    eprintln!("║   • story_blank_input_has_no_effect");
    eprintln!("║ ");
    eprintln!("║ History:");
    eprintln!("║   • story_history_is_capped_and_persisted");
    eprintln!("║   • story_history_recall_walks_back_and_forth");
    eprintln!("║ ");
    eprintln!("║ Completion:");
    eprintln!("║   • story_tab_completion");
    eprintln!("║ ");
    eprintln!("║ Assistant:");
    eprintln!("║   • story_blank_ask_never_reaches_backend");
    eprintln!("║   • story_unconfigured_ask_answers_in_demo_mode");
    eprintln!("║   • story_configured_ask_uses_backend_and_survives_failure");
    eprintln!("║   • story_input_rejected_while_executing");
    eprintln!("║ ");
    eprintln!("╚═══════════════════════════════════════════════════════════════");
}
