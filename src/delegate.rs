//! Assistant delegate - the interpreter's only path to the completion service
//!
//! `ask` always produces text. Without a configured backend it answers with a
//! canned description of the portfolio owner (demo mode); backend failures
//! and timeouts are logged and replaced by a fixed apology. `joke` and
//! `inspire` pick from fixed lists and never touch the network.

use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::client::{BackendError, CompletionBackend};
use crate::config::API_KEY_ENV;
use crate::profile::Profile;
use crate::prompt::ContextPrompt;

pub const APOLOGY: &str =
    "Sorry, I encountered an error processing your request. Please try again later.";

pub const EMPTY_ANSWER: &str = "No response from AI.";

pub const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs! 🐛",
    "How many programmers does it take to change a light bulb? None, that's a hardware problem! 💡",
    "Why don't programmers like nature? It has too many bugs! 🌿",
    "What's a programmer's favorite hangout place? Foo Bar! 🍺",
    "Why did the programmer quit their job? They didn't get arrays! 📊",
];

pub const QUOTES: &[&str] = &[
    "\"The best way to predict the future is to invent it.\" - Alan Kay",
    "\"Code is like humor. When you have to explain it, it's bad.\" - Cory House",
    "\"First, solve the problem. Then, write the code.\" - John Johnson",
    "\"Experience is the name everyone gives to their mistakes.\" - Oscar Wilde",
    "\"The only way to learn a new programming language is by writing programs in it.\" - Dennis Ritchie",
];

/// Uniform index source for canned selections
pub trait RandomSource: Send + Sync {
    /// Index in `0..len`; `len` is never zero
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local RNG
#[derive(Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Deterministic source cycling through a fixed sequence
#[derive(Debug)]
pub struct SequenceRandom {
    sequence: Vec<usize>,
    next: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(sequence: Vec<usize>) -> Self {
        Self {
            sequence,
            next: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn pick(&self, len: usize) -> usize {
        if self.sequence.is_empty() {
            return 0;
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed) % self.sequence.len();
        self.sequence[i] % len
    }
}

#[derive(Clone)]
pub struct AiDelegate {
    backend: Option<Arc<dyn CompletionBackend>>,
    profile: Arc<Profile>,
    random: Arc<dyn RandomSource>,
    timeout: Duration,
}

impl AiDelegate {
    pub fn new(profile: Arc<Profile>) -> Self {
        Self {
            backend: None,
            profile,
            random: Arc::new(ThreadRandom),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    /// Answer a visitor question. Never fails from the caller's view.
    pub async fn ask(&self, question: &str) -> String {
        let Some(backend) = &self.backend else {
            tracing::debug!("assistant unconfigured, answering in demo mode");
            return self.demo_answer(question);
        };

        let prompt = ContextPrompt::new(&self.profile).build(question);
        let outcome = match tokio::time::timeout(self.timeout, backend.generate(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(text) if text.trim().is_empty() => EMPTY_ANSWER.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::error!(backend = %backend.describe(), "assistant call failed: {}", e);
                APOLOGY.to_string()
            }
        }
    }

    pub fn joke(&self) -> &'static str {
        JOKES[self.random.pick(JOKES.len())]
    }

    pub fn inspire(&self) -> &'static str {
        QUOTES[self.random.pick(QUOTES.len())]
    }

    fn demo_answer(&self, question: &str) -> String {
        let p = &self.profile;
        let skills = p.skills.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
        let projects = p
            .projects
            .first()
            .map(|proj| format!(" and have worked on projects like {}", proj.name))
            .unwrap_or_default();

        format!(
            "AI service not configured. Please set the {env} environment variable.\n\n\
             For demo purposes, here's what I would tell you about \"{question}\":\n\
             This portfolio belongs to {name}, {title}.\n\
             They specialize in {skills}{projects}.",
            env = API_KEY_ENV,
            name = p.name,
            title = p.title,
        )
    }
}
