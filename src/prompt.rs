//! Prompt generation for the assistant
//!
//! The context preamble introduces the portfolio owner to the model; the
//! visitor's question is appended as one user prompt.

use crate::profile::Profile;

// ═══════════════════════════════════════════════════════════════
// CONTEXT PROMPT BUILDER
// ═══════════════════════════════════════════════════════════════

pub struct ContextPrompt<'a> {
    profile: &'a Profile,
}

impl<'a> ContextPrompt<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self { profile }
    }

    /// Preamble only
    pub fn preamble(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&self.identity_section());
        prompt.push_str(&self.skills_section());
        prompt.push_str(&self.projects_section());
        prompt.push_str(&self.experience_section());
        prompt.push_str(&self.guidelines_section());

        prompt
    }

    /// Preamble followed by the visitor's question
    pub fn build(&self, question: &str) -> String {
        format!("{}\n\nUser Query: {}", self.preamble(), question)
    }

    fn identity_section(&self) -> String {
        let p = self.profile;
        format!(
            "You are an AI assistant integrated into {name}'s terminal portfolio.\n\
             {name} is {title}.\n\nBio: {bio}\n\n",
            name = p.name,
            title = p.title,
            bio = p.bio
        )
    }

    fn skills_section(&self) -> String {
        format!("Skills: {}\n\n", self.profile.skills.join(", "))
    }

    fn projects_section(&self) -> String {
        let mut section = String::from("Projects:\n");
        for project in &self.profile.projects {
            section.push_str(&format!(
                "- {}: {} ({})\n",
                project.name,
                project.description,
                project.tech.join(", ")
            ));
        }
        section.push('\n');
        section
    }

    fn experience_section(&self) -> String {
        let mut section = String::from("Experience:\n");
        for exp in &self.profile.experience {
            section.push_str(&format!(
                "- {} at {} ({}): {}\n",
                exp.title, exp.company, exp.period, exp.description
            ));
        }
        section.push('\n');
        section
    }

    fn guidelines_section(&self) -> String {
        let name = &self.profile.name;
        format!(
            "When visitors ask about {name}, answer as their personal AI assistant with deep \
             knowledge of their background. Keep responses concise and terminal-friendly \
             (avoid excessive formatting). For technical topics you may give general \
             programming help as well."
        )
    }
}
