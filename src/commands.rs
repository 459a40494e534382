//! Command grammar - parsing, the fixed registry, and built-in handlers
//!
//! The grammar is known at build time and not user-extensible. Every handler
//! returns an [`Action`]: a finished record, a deferred assistant task, or a
//! transcript reset.

use chrono::{DateTime, Local};
use futures::future::BoxFuture;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::delegate::AiDelegate;
use crate::pages;
use crate::profile::Profile;
use crate::record::OutputRecord;

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Lower-cased command word
    pub name: String,
    /// Remaining whitespace-separated tokens, verbatim
    pub args: Vec<String>,
}

impl Command {
    /// Split on whitespace; blank input yields no command
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace();
        let name = parts.next()?.to_lowercase();
        Some(Self {
            name,
            args: parts.map(str::to_string).collect(),
        })
    }

    /// Arguments re-joined with single spaces
    pub fn rest(&self) -> String {
        self.args.join(" ")
    }
}

/// An assistant-backed result still in flight
pub type PendingTask = BoxFuture<'static, OutputRecord>;

/// What a handler asks the interpreter to do
pub enum Action {
    Reply(OutputRecord),
    Deferred(PendingTask),
    Reset,
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Reply(rec) => f.debug_tuple("Reply").field(rec).finish(),
            Action::Deferred(_) => f.write_str("Deferred(..)"),
            Action::Reset => f.write_str("Reset"),
        }
    }
}

/// Collaborators a handler may read
pub struct HandlerContext<'a> {
    pub registry: &'a Registry,
    pub profile: &'a Profile,
    pub delegate: &'a AiDelegate,
    pub now: DateTime<Local>,
}

pub type HandlerFn = fn(&HandlerContext<'_>, &Command) -> Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Portfolio,
    Assistant,
    System,
    Dont,
}

impl Group {
    fn title(&self) -> &'static str {
        match self {
            Group::Portfolio => "Portfolio Commands:",
            Group::Assistant => "AI-Powered Commands:",
            Group::System => "System Commands:",
            Group::Dont => "Don't Commands:",
        }
    }
}

pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    pub group: Group,
    /// Aliases stay out of the help listing
    pub listed: bool,
    pub handler: HandlerFn,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("group", &self.group)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════

pub struct Registry {
    commands: Vec<CommandSpec>,
}

fn spec(
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
    group: Group,
    handler: HandlerFn,
) -> CommandSpec {
    CommandSpec {
        name,
        usage,
        summary,
        group,
        listed: true,
        handler,
    }
}

fn alias(mut spec: CommandSpec) -> CommandSpec {
    spec.listed = false;
    spec
}

impl Registry {
    pub fn builtin() -> Self {
        use Group::*;
        let commands = vec![
            spec("about", "about", "Display bio and role information", Portfolio, cmd_about),
            spec("skills", "skills", "Show technical skills and expertise", Portfolio, cmd_skills),
            spec("projects", "projects", "List recent projects with links", Portfolio, cmd_projects),
            spec("experience", "experience", "Show work and education timeline", Portfolio, cmd_experience),
            spec("resume", "resume", "View and download resume", Portfolio, cmd_resume),
            spec("socials", "socials", "Display social media links", Portfolio, cmd_socials),
            spec("ask", "ask <question>", "Ask the AI assistant anything", Assistant, cmd_ask),
            spec("joke", "joke", "Get a programming joke", Assistant, cmd_joke),
            spec("inspire", "inspire", "Get an inspirational quote", Assistant, cmd_inspire),
            spec("help", "help", "Show this help message", System, cmd_help),
            spec("clear", "clear", "Clear the terminal screen", System, cmd_clear),
            alias(spec("cls", "cls", "Clear the terminal screen", System, cmd_clear)),
            spec("ls", "ls", "List directory contents", System, cmd_ls),
            spec("pwd", "pwd", "Show current directory", System, cmd_pwd),
            spec("whoami", "whoami", "Display current user", System, cmd_whoami),
            spec("date", "date", "Show current date and time", System, cmd_date),
            spec("uname", "uname", "Show system information", System, cmd_uname),
            spec("sudo", "sudo rm -rf /*", "Don't try this at home!", Dont, cmd_sudo),
        ];

        Self { commands }
    }

    #[cfg(test)]
    pub(crate) fn from_specs(commands: Vec<CommandSpec>) -> Self {
        Self { commands }
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|c| c.name)
    }

    /// Tab completion: exactly one name starting with `prefix` yields that
    /// name plus a trailing space; zero or several matches yield `None`.
    pub fn complete(&self, prefix: &str) -> Option<String> {
        let prefix = prefix.to_lowercase();
        let mut matches = self.names().filter(|n| n.starts_with(&prefix));
        let only = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(format!("{} ", only))
    }

    /// Closest registered name for a mistyped command
    pub fn suggest(&self, name: &str) -> Option<&'static str> {
        let matcher = SkimMatcherV2::default();
        self.commands
            .iter()
            .filter(|c| c.listed)
            .filter_map(|c| matcher.fuzzy_match(c.name, name).map(|score| (c.name, score)))
            .max_by_key(|(_, score)| *score)
            .map(|(name, _)| name)
    }

    pub fn unknown(&self, name: &str) -> OutputRecord {
        let mut message = format!(
            "Command not found: {}. Type 'help' for available commands.",
            name
        );
        if let Some(suggestion) = self.suggest(name) {
            message.push_str(&format!("\nDid you mean '{}'?", suggestion));
        }
        OutputRecord::error(message)
    }

    pub fn help_page(&self) -> String {
        let mut text = String::from("\nAvailable Commands:\n═══════════════════\n");
        for group in [Group::Portfolio, Group::Assistant, Group::System, Group::Dont] {
            text.push('\n');
            text.push_str(group.title());
            text.push('\n');
            for c in self.commands.iter().filter(|c| c.group == group && c.listed) {
                text.push_str(&format!("  {:<15}- {}\n", c.usage, c.summary));
            }
        }
        text.push_str(
            "\nNavigation:\n  ↑/↓ arrows     - Navigate command history\n  \
             Tab            - Auto-complete commands\n\n\
             Try typing 'about' to learn more about me!\n",
        );
        text
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ═══════════════════════════════════════════════════════════════
// HANDLERS
// ═══════════════════════════════════════════════════════════════

fn output(text: String) -> Action {
    Action::Reply(OutputRecord::output(text))
}

fn cmd_help(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(ctx.registry.help_page())
}

fn cmd_about(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(pages::about(ctx.profile))
}

fn cmd_skills(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(pages::skills(ctx.profile))
}

fn cmd_projects(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(pages::projects(ctx.profile))
}

fn cmd_experience(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(pages::experience(ctx.profile))
}

fn cmd_resume(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(pages::resume(ctx.profile))
}

fn cmd_socials(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(pages::socials(ctx.profile))
}

fn cmd_ask(ctx: &HandlerContext<'_>, cmd: &Command) -> Action {
    let question = cmd.rest();
    if question.trim().is_empty() {
        return Action::Reply(OutputRecord::error(
            "Please provide a question. Usage: ask <your question>",
        ));
    }
    let delegate = ctx.delegate.clone();
    Action::Deferred(Box::pin(async move {
        let answer = delegate.ask(&question).await;
        OutputRecord::ai(format!("🤖 AI Assistant: {}", answer))
    }))
}

fn cmd_joke(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    Action::Reply(OutputRecord::ai(format!("😄 {}", ctx.delegate.joke())))
}

fn cmd_inspire(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    Action::Reply(OutputRecord::ai(format!("✨ {}", ctx.delegate.inspire())))
}

fn cmd_clear(_: &HandlerContext<'_>, _: &Command) -> Action {
    Action::Reset
}

fn cmd_sudo(_: &HandlerContext<'_>, cmd: &Command) -> Action {
    let rest = cmd.rest();
    if rest == "rm -rf /*" {
        return Action::Reply(OutputRecord::ai(pages::sudo_rm_rf()));
    }
    let message = if rest.is_empty() {
        "sudo: command not found".to_string()
    } else {
        format!("sudo: {}: command not found", rest)
    };
    Action::Reply(OutputRecord::error(message))
}

fn cmd_ls(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(pages::ls(ctx.profile))
}

fn cmd_pwd(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(pages::pwd(ctx.profile))
}

fn cmd_whoami(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(ctx.profile.handle.clone())
}

fn cmd_date(ctx: &HandlerContext<'_>, _: &Command) -> Action {
    output(pages::date(&ctx.now))
}

fn cmd_uname(_: &HandlerContext<'_>, _: &Command) -> Action {
    output(pages::OS_NAME.to_string())
}
