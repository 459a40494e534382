//! Static profile data
//!
//! Read-only reference data injected into the interpreter and the assistant
//! prompt. A built-in profile ships with the binary; `profile.json` in the
//! config directory replaces it wholesale.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub description: String,
    pub tech: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub period: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub bio: String,
    /// Login shown by `whoami`, `ls`, `pwd`
    pub handle: String,
    pub location: String,
    pub skills: Vec<String>,
    pub projects: Vec<ProjectEntry>,
    pub experience: Vec<ExperienceEntry>,
    /// Platform name and link, in display order
    pub socials: Vec<(String, String)>,
    pub resume_link: String,
}

impl Profile {
    /// Load `path` if it exists, otherwise the built-in profile
    pub fn load_or_builtin(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::builtin());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn builtin() -> Self {
        Self {
            name: "Jordan Vega".into(),
            title: "Systems Engineer & AI/ML Developer".into(),
            bio: "Passionate about building intelligent systems and reliable infrastructure.\n\
                  Currently focused on language tooling, distributed storage, and applied ML.\n\
                  I love exploring where low-level engineering meets machine learning."
                .into(),
            handle: "jvega".into(),
            location: "Lisbon, Portugal".into(),
            skills: [
                "Rust", "Python", "TypeScript", "Go", "PyTorch", "Machine Learning",
                "Distributed Systems", "PostgreSQL", "Redis", "Docker", "Kubernetes",
                "AWS", "Linux", "Git", "gRPC", "NLP",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            projects: vec![
                ProjectEntry {
                    name: "Tidewater KV".into(),
                    description: "Log-structured key-value store with raft replication".into(),
                    tech: vec!["Rust".into(), "tokio".into(), "Raft".into()],
                    github: Some("https://github.com/jvega/tidewater".into()),
                    live: None,
                },
                ProjectEntry {
                    name: "Model Relay".into(),
                    description: "Gateway that routes inference requests across model providers".into(),
                    tech: vec!["Go".into(), "gRPC".into(), "Redis".into(), "Kubernetes".into()],
                    github: Some("https://github.com/jvega/model-relay".into()),
                    live: Some("https://relay.jvega.dev".into()),
                },
                ProjectEntry {
                    name: "Lintwise".into(),
                    description: "Code review assistant that ranks findings by learned severity".into(),
                    tech: vec!["Python".into(), "PyTorch".into(), "TypeScript".into()],
                    github: Some("https://github.com/jvega/lintwise".into()),
                    live: None,
                },
            ],
            experience: vec![
                ExperienceEntry {
                    title: "Senior Systems Engineer".into(),
                    company: "Northwind Data".into(),
                    period: "2022 - Present".into(),
                    description: "Storage engine and replication work for a managed database service".into(),
                },
                ExperienceEntry {
                    title: "ML Engineer".into(),
                    company: "Quarry Labs".into(),
                    period: "2019 - 2022".into(),
                    description: "Built training pipelines and model serving infrastructure".into(),
                },
            ],
            socials: vec![
                ("GitHub".into(), "https://github.com/jvega".into()),
                ("LinkedIn".into(), "https://www.linkedin.com/in/jvega".into()),
                ("Email".into(), "hello@jvega.dev".into()),
            ],
            resume_link: "https://jvega.dev/resume.pdf".into(),
        }
    }

    /// First name-like token, used in the banner
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}
