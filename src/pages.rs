//! Static text pages formatted from profile data
//!
//! Everything here is deterministic except `date`, which takes the clock
//! reading as an argument.

use chrono::{DateTime, TimeZone};
use unicode_width::UnicodeWidthStr;

use crate::profile::Profile;

pub const OS_NAME: &str = "Portfolio-OS 2.1.0 Terminal x86_64";
pub const VERSION: &str = "v2.1.0";

const BOX_WIDTH: usize = 62;

/// Boxed, centered section heading
fn heading(title: &str) -> String {
    let width = title.width();
    let left = BOX_WIDTH.saturating_sub(width) / 2;
    let right = BOX_WIDTH.saturating_sub(width + left);
    format!(
        "╔{bar}╗\n║{}{title}{}║\n╚{bar}╝\n",
        " ".repeat(left),
        " ".repeat(right),
        bar = "═".repeat(BOX_WIDTH)
    )
}

/// Pad to a display width (emoji and box glyphs count correctly)
fn pad(text: &str, width: usize) -> String {
    let mut padded = text.to_string();
    padded.push_str(&" ".repeat(width.saturating_sub(text.width())));
    padded
}

/// Welcome lines shown when a transcript starts
pub fn banner(profile: &Profile) -> Vec<String> {
    vec![
        "████████╗███████╗██████╗ ███╗   ███╗██╗███╗   ██╗ █████╗ ██╗".into(),
        "╚══██╔══╝██╔════╝██╔══██╗████╗ ████║██║████╗  ██║██╔══██╗██║".into(),
        "   ██║   █████╗  ██████╔╝██╔████╔██║██║██╔██╗ ██║███████║██║".into(),
        "   ██║   ██╔══╝  ██╔══██╗██║╚██╔╝██║██║██║╚██╗██║██╔══██║██║".into(),
        "   ██║   ███████╗██║  ██║██║ ╚═╝ ██║██║██║ ╚████║██║  ██║███████╗".into(),
        "   ╚═╝   ╚══════╝╚═╝  ╚═╝╚═╝     ╚═╝╚═╝╚═╝  ╚═══╝╚═╝  ╚═╝╚══════╝".into(),
        String::new(),
        format!("Welcome to {}'s Terminal Portfolio {}", profile.first_name(), VERSION),
        "Type \"help\" to see available commands or \"about\" to learn more about me.".into(),
        "Try \"ask <question>\" to chat with my AI assistant!".into(),
        String::new(),
    ]
}

pub fn about(profile: &Profile) -> String {
    format!(
        "{}\nName:     {}\nRole:     {}\n\n{}\n\nLocation: {}\nStatus:   Open to opportunities\n\
         Focus:    Building intelligent systems that solve real problems\n\n\
         Fun fact: I love combining traditional terminal aesthetics\n\
         \x20        with modern AI capabilities - just like this portfolio!\n\n\
         Type 'skills' to see my technical expertise or 'projects' to view my work.\n",
        heading("ABOUT ME"),
        profile.name,
        profile.title,
        profile.bio,
        profile.location,
    )
}

pub fn skills(profile: &Profile) -> String {
    const PER_ROW: usize = 4;
    let cell = profile
        .skills
        .iter()
        .map(|s| s.width() + 2)
        .max()
        .unwrap_or(0)
        + 2;

    let mut text = heading("TECHNICAL SKILLS");
    text.push('\n');
    for row in profile.skills.chunks(PER_ROW) {
        let line: String = row.iter().map(|s| pad(&format!("▪ {}", s), cell)).collect();
        text.push_str(line.trim_end());
        text.push('\n');
    }
    text.push_str(&format!(
        "\n{} skills mastered and counting...\n",
        profile.skills.len()
    ));
    text
}

pub fn projects(profile: &Profile) -> String {
    let mut text = heading("MY PROJECTS");

    for (index, project) in profile.projects.iter().enumerate() {
        text.push_str(&format!(
            "\n[{}] {}\n{}\nDescription: {}\nTech Stack:  {}",
            index + 1,
            project.name,
            "-".repeat(project.name.width() + 4),
            project.description,
            project.tech.join(" • ")
        ));
        if let Some(github) = &project.github {
            text.push_str(&format!("\nGitHub:      {}", github));
        }
        if let Some(live) = &project.live {
            text.push_str(&format!("\nLive Demo:   {}", live));
        }
        text.push('\n');
    }

    text.push_str(&format!(
        "\nTotal Projects: {}\nAll projects are available on my GitHub profile.\n\n\
         Want to know more about any project? Ask my AI: 'ask tell me about [project name]'\n",
        profile.projects.len()
    ));
    text
}

pub fn experience(profile: &Profile) -> String {
    let mut text = heading("EXPERIENCE & EDUCATION");

    for (index, exp) in profile.experience.iter().enumerate() {
        text.push_str(&format!(
            "\n{}. {}\n   {} | {}\n   {}\n",
            index + 1,
            exp.title,
            exp.company,
            exp.period,
            exp.description
        ));
    }

    text.push_str(&format!(
        "\nCareer Timeline: {} key positions\nCurrent Focus: AI/ML Research & Development\n\n\
         Looking for new opportunities in AI/ML and full-stack development!\n",
        profile.experience.len()
    ));
    text
}

pub fn resume(profile: &Profile) -> String {
    format!(
        "{}\n📄 My complete resume is available for download:\n\n🔗 Download Link: {}\n\n\
         The resume includes:\n• Detailed work experience and projects\n\
         • Complete list of technical skills\n• Education and certifications\n\
         • Contact information\n\nFormat: PDF\n\n\
         You can also view my experience here by typing 'experience'\n\
         or check out my projects with 'projects'.\n",
        heading("RESUME"),
        profile.resume_link
    )
}

fn social_icon(platform: &str) -> &'static str {
    match platform {
        "GitHub" => "🐙",
        "LinkedIn" => "💼",
        "Twitter" => "🐦",
        "Email" => "📧",
        "Portfolio" => "🌐",
        "Instagram" => "📷",
        _ => "🔗",
    }
}

pub fn socials(profile: &Profile) -> String {
    let mut text = heading("SOCIAL MEDIA & CONTACT");
    text.push_str("\nConnect with me on:\n\n");

    for (platform, url) in &profile.socials {
        text.push_str(&format!("{} {} {}\n", social_icon(platform), pad(platform, 12), url));
    }

    text.push_str(
        "\n📫 Feel free to reach out for:\n   • Collaboration opportunities\n   \
         • Technical discussions\n   • Project partnerships\n   • Career opportunities\n\n\
         🤝 Always open to connecting with fellow developers and AI enthusiasts!\n",
    );
    text
}

pub fn ls(profile: &Profile) -> String {
    let user = &profile.handle;
    let files: [(&str, u32, &str); 7] = [
        ("-rw-r--r--", 420, "about.txt"),
        ("-rw-r--r--", 1337, "skills.txt"),
        ("-rw-r--r--", 2048, "projects.txt"),
        ("-rw-r--r--", 654, "experience.txt"),
        ("-rw-r--r--", 321, "resume.pdf"),
        ("-rw-r--r--", 128, "socials.txt"),
        ("-rwxr-xr-x", 4096, "ai_assistant*"),
    ];

    let mut text = String::from("total 7\n");
    text.push_str(&format!("drwxr-xr-x  2 {u:<8} {u:<8} 4096 Jan  1 00:00 ./\n", u = user));
    text.push_str(&format!("drwxr-xr-x  3 {u:<8} {u:<8} 4096 Jan  1 00:00 ../\n", u = "root"));
    for (mode, size, name) in files {
        text.push_str(&format!(
            "{}  1 {u:<8} {u:<8} {:>4} Jan  1 00:00 {}\n",
            mode,
            size,
            name,
            u = user
        ));
    }
    text.push_str("\nUse commands like 'about', 'skills', 'projects' etc. to read these files.\n");
    text
}

pub fn pwd(profile: &Profile) -> String {
    format!("/home/{}/portfolio", profile.handle)
}

pub fn date<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%a %b %d %Y %H:%M:%S GMT%z").to_string()
}

pub fn sudo_rm_rf() -> String {
    [
        "Removing /usr... ",
        "Removing /var... ",
        "Removing /etc... ",
        "Removing /home... ",
        "System destroyed successfully! 💥",
        "",
        "Just kidding! 😄",
        "This is a portfolio terminal, not an actual Linux system.",
        "No files were harmed in the making of this joke.",
        "",
        "Pro tip: Never run \"sudo rm -rf /*\" on a real system!",
        "It would delete everything irreversibly.",
        "",
        "Stay safe and keep coding! 👨‍💻",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_heading_lines_share_width() {
        let h = heading("MY PROJECTS");
        let widths: Vec<usize> = h.lines().map(|l| l.width()).collect();
        assert_eq!(widths, vec![BOX_WIDTH + 2; 3]);
    }

    #[test]
    fn test_projects_lists_optional_links() {
        let text = projects(&Profile::builtin());
        assert!(text.contains("[1] Tidewater KV"));
        assert!(text.contains("Tech Stack:  Rust • tokio • Raft"));
        assert!(text.contains("Live Demo:   https://relay.jvega.dev"));
        assert_eq!(text.matches("Live Demo:").count(), 1);
        assert!(text.contains("Total Projects: 3"));
    }

    #[test]
    fn test_socials_pads_platform_column() {
        let text = socials(&Profile::builtin());
        assert!(text.contains("🐙 GitHub       https://github.com/jvega"));
        assert!(text.contains("📧 Email        hello@jvega.dev"));
    }

    #[test]
    fn test_page_footers() {
        let profile = Profile::builtin();
        let about = about(&profile);
        assert!(about.contains(
            "Fun fact: I love combining traditional terminal aesthetics\n         with modern AI capabilities"
        ));
        assert!(about.ends_with("'projects' to view my work.\n"));

        let experience = experience(&profile);
        assert!(experience.contains("Career Timeline: 2 key positions\nCurrent Focus: AI/ML Research & Development"));
        assert!(experience.ends_with("Looking for new opportunities in AI/ML and full-stack development!\n"));

        assert!(socials(&profile)
            .ends_with("• Career opportunities\n\n🤝 Always open to connecting with fellow developers and AI enthusiasts!\n"));
    }

    #[test]
    fn test_skills_counts_entries() {
        let profile = Profile::builtin();
        let text = skills(&profile);
        assert!(text.contains("▪ Rust"));
        assert!(text.contains(&format!("{} skills mastered", profile.skills.len())));
    }

    #[test]
    fn test_pages_are_deterministic() {
        let profile = Profile::builtin();
        assert_eq!(ls(&profile), ls(&profile));
        assert_eq!(resume(&profile), resume(&profile));
        assert!(ls(&profile).contains("ai_assistant*"));
        assert_eq!(pwd(&profile), "/home/jvega/portfolio");
    }

    #[test]
    fn test_date_formats_given_instant() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(date(&now), "Sat Mar 09 2024 14:05:00 GMT+0000");
    }

    #[test]
    fn test_banner_names_owner() {
        let lines = banner(&Profile::builtin());
        assert!(lines.iter().any(|l| l.contains("Welcome to Jordan's Terminal Portfolio")));
    }
}
