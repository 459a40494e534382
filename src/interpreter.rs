//! Command interpreter
//!
//! Looks a parsed command up in the registry and runs its handler. This is
//! the last line of defense: unknown names become Error records, and a
//! handler that panics (synchronously or inside its deferred task) is turned
//! into a generic Error record instead of unwinding into the session.

use chrono::Local;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::commands::{Action, Command, HandlerContext, Registry};
use crate::delegate::AiDelegate;
use crate::profile::Profile;
use crate::record::OutputRecord;

fn internal_fault(name: &str) -> OutputRecord {
    OutputRecord::error(format!(
        "Error: an internal error occurred while running '{}'. Please try again.",
        name
    ))
}

pub struct Interpreter {
    registry: Registry,
    profile: Arc<Profile>,
    delegate: AiDelegate,
}

impl Interpreter {
    pub fn new(registry: Registry, profile: Arc<Profile>, delegate: AiDelegate) -> Self {
        Self {
            registry,
            profile,
            delegate,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn delegate(&self) -> &AiDelegate {
        &self.delegate
    }

    /// Run the handler bound to `cmd.name`
    pub fn dispatch(&self, cmd: &Command) -> Action {
        let Some(spec) = self.registry.lookup(&cmd.name) else {
            tracing::debug!(command = %cmd.name, "unknown command");
            return Action::Reply(self.registry.unknown(&cmd.name));
        };

        tracing::debug!(command = %cmd.name, args = cmd.args.len(), "dispatching");
        let ctx = HandlerContext {
            registry: &self.registry,
            profile: &self.profile,
            delegate: &self.delegate,
            now: Local::now(),
        };

        let action = match std::panic::catch_unwind(AssertUnwindSafe(|| (spec.handler)(&ctx, cmd))) {
            Ok(action) => action,
            Err(_) => {
                tracing::error!(command = %cmd.name, "handler panicked");
                return Action::Reply(internal_fault(&cmd.name));
            }
        };

        match action {
            Action::Deferred(task) => {
                let name = cmd.name.clone();
                Action::Deferred(Box::pin(AssertUnwindSafe(task).catch_unwind().map(
                    move |outcome| {
                        outcome.unwrap_or_else(|_| {
                            tracing::error!(command = %name, "deferred handler panicked");
                            internal_fault(&name)
                        })
                    },
                )))
            }
            other => other,
        }
    }

    pub fn complete(&self, prefix: &str) -> Option<String> {
        self.registry.complete(prefix)
    }
}
