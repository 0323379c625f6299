//! Terminal rendering for projects, chat and landing inputs

use colored::Colorize;

use crate::domain::{ChatMessage, DesignProject, Role};
use crate::session::StudioInputs;

/// Length of the id prefix shown in listings
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

/// First `max` characters of `text`, with an ellipsis when cut
pub fn preview(text: &str, max: usize) -> String {
    let cut: String = text.chars().take(max).collect();
    if text.chars().count() > max { format!("{}...", cut) } else { cut }
}

/// One-line summary per project, newest first
pub fn print_gallery(projects: &[DesignProject]) {
    if projects.is_empty() {
        println!("{}", "No saved designs yet.".dimmed());
        return;
    }

    println!("{}", "Saved Designs:".bright_cyan());
    for project in projects {
        let style = project.style.map(|s| s.label()).unwrap_or("Reference-based");
        println!(
            "  {}  {}  {}  {}  {} renders",
            short_id(&project.id).yellow(),
            project.name.bold(),
            style.dimmed(),
            project.created_display().dimmed(),
            project.render_count()
        );
        if let Some(last) = project.last_message() {
            println!("      {}", preview(&last.content, 60).dimmed());
        }
    }
}

pub fn print_message(message: &ChatMessage) {
    let speaker = match message.role {
        Role::User => "You".bright_green(),
        Role::Assistant => "Architect".bright_blue(),
    };
    println!("{}: {}", speaker.bold(), message.content);
    if message.image_url.is_some() {
        println!("  {}", "[new render attached]".dimmed());
    }
}

/// Project header followed by its conversation
pub fn print_project(project: &DesignProject) {
    println!();
    println!("{} {}", project.name.bright_cyan().bold(), format!("({})", project.id).dimmed());
    println!(
        "Style: {}  Complexity: {}  Created: {}",
        project.style.map(|s| s.label()).unwrap_or("Reference-based"),
        project.complexity,
        project.created_display()
    );
    if !project.kept_features.is_empty() {
        println!("Preserved: {}", project.kept_features.join(", "));
    }
    println!();
    for message in &project.history {
        print_message(message);
    }
    println!();
}

/// Current landing inputs and detected features
pub fn print_inputs(inputs: &StudioInputs) {
    let set = |present: bool| if present { "set".green() } else { "none".dimmed() };

    println!("{}", "Design Brief:".bright_cyan());
    println!("  {:12} {}", "Yard photo", set(inputs.yard_photo.is_some()));
    println!("  {:12} {}", "Reference", set(inputs.reference_image.is_some()));
    match inputs.style {
        Some(style) => println!("  {:12} {}", "Style", style.label()),
        None if inputs.reference_image.is_some() => println!("  {:12} {}", "Style", "from reference".dimmed()),
        None => println!("  {:12} {}", "Style", "none (Modern Minimalist)".dimmed()),
    }
    println!("  {:12} {} ({})", "Complexity", inputs.complexity, inputs.complexity.tagline());
    if !inputs.requirements.trim().is_empty() {
        println!("  {:12} {}", "Notes", inputs.requirements.trim());
    }
    print_features(inputs);
}

pub fn print_features(inputs: &StudioInputs) {
    let detected = inputs.selection.detected();
    if detected.is_empty() {
        println!("  {:12} {}", "Features", "none detected".dimmed());
        return;
    }

    println!("  {}", "Features:".bold());
    for (i, label) in detected.iter().enumerate() {
        let mark = if inputs.selection.is_selected(label) {
            "[keep]".green()
        } else {
            "[    ]".dimmed()
        };
        println!("    {:>2}. {} {}", i + 1, mark, label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0192f3a4-5b6c-7d8e"), "0192f3a4");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("a longer message", 8), "a longer...");
        assert_eq!(preview("ééééé", 3), "ééé...");
    }
}
