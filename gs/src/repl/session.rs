//! Studio REPL session

use std::path::{Path, PathBuf};

use colored::Colorize;
use eyre::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::domain::{DesignComplexity, DesignProject, EncodedImage, GardenStyle};
use crate::session::{ChatOutcome, Detection, SessionController, SessionError};
use crate::view;

/// Result of a slash command
enum SlashResult {
    Continue,
    Quit,
}

/// Interactive design studio on top of a [`SessionController`]
pub struct StudioRepl {
    controller: SessionController,
    output_dir: PathBuf,
}

impl StudioRepl {
    pub fn new(controller: SessionController, output_dir: PathBuf) -> Self {
        Self { controller, output_dir }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome().await;

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.chat(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    async fn print_welcome(&self) {
        println!();
        println!("{}", "Garden Studio".bright_cyan().bold());
        println!("Upload a photo of your yard, pick a style and let the architect redesign it.");
        println!("Renders are saved to {}", self.output_dir.display());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();

        let projects = self.controller.projects().await;
        if !projects.is_empty() {
            println!("{} saved designs, {} to browse them", projects.len(), "/gallery".yellow());
            println!();
        }
    }

    /// Handle slash commands
    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let (cmd, arg) = match input.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (input, ""),
        };
        debug!(%cmd, %arg, "handle_slash_command: called");

        match cmd {
            "/help" | "/h" => self.print_help(),
            "/quit" | "/q" | "/exit" => return SlashResult::Quit,
            "/upload" | "/u" => self.upload(arg).await,
            "/reference" | "/ref" => self.reference(arg).await,
            "/features" | "/f" => view::print_features(&self.controller.inputs().await),
            "/toggle" | "/t" => self.toggle(arg).await,
            "/style" | "/s" => self.style(arg).await,
            "/complexity" | "/c" => self.complexity(arg).await,
            "/notes" | "/n" => {
                self.controller.set_requirements(arg).await;
                if arg.is_empty() {
                    println!("{}", "Notes cleared.".dimmed());
                } else {
                    println!("Notes: {}", arg);
                }
            }
            "/generate" | "/g" => self.generate().await,
            "/gallery" => {
                self.controller.show_gallery().await;
                view::print_gallery(&self.controller.projects().await);
            }
            "/open" | "/o" => self.open(arg).await,
            "/new" => {
                self.controller.new_project().await;
                println!("{}", "Back to the landing page. Your photo and settings are kept.".dimmed());
                view::print_inputs(&self.controller.inputs().await);
            }
            "/export" | "/e" => self.export(arg).await,
            "/status" => self.status().await,
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        SlashResult::Continue
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Design Brief:".bright_cyan());
        println!("  {:22} Upload a yard photo and detect its features", "/upload <path>".yellow());
        println!("  {:22} Use a design to imitate instead of a style", "/reference <path|clear>".yellow());
        println!("  {:22} Show detected features", "/features".yellow());
        println!("  {:22} Keep or drop a feature by number or name", "/toggle <n|name>".yellow());
        println!("  {:22} Choose a style (no argument lists them)", "/style [name]".yellow());
        println!("  {:22} Simple, Balanced or Premium", "/complexity [level]".yellow());
        println!("  {:22} Special requests (empty clears)", "/notes [text]".yellow());
        println!("  {:22} Generate the first design", "/generate".yellow());
        println!();
        println!("{}", "Projects:".bright_cyan());
        println!("  {:22} List saved designs", "/gallery".yellow());
        println!("  {:22} Open a saved design", "/open <id>".yellow());
        println!("  {:22} Start over from the landing page", "/new".yellow());
        println!("  {:22} Save the current render", "/export [path]".yellow());
        println!("  {:22} Show the brief and open project", "/status".yellow());
        println!();
        println!("  {:22} Show this help", "/help".yellow());
        println!("  {:22} Exit", "/quit".yellow());
        println!();
        println!("Anything else is sent to the architect about the open design.");
        println!();
    }

    async fn upload(&self, arg: &str) {
        if arg.is_empty() {
            println!("{} /upload <path>", "Usage:".yellow());
            return;
        }
        let image = match EncodedImage::from_path(arg) {
            Ok(image) => image,
            Err(e) => {
                println!("{} Failed to read {}: {}", "Error:".red(), arg, e);
                return;
            }
        };

        println!("{}", "Analyzing your yard...".dimmed());
        match self.controller.upload_yard_photo(image).await {
            Detection::Ignored => println!("{}", "Still analyzing the previous photo.".dimmed()),
            Detection::Found(labels) if labels.is_empty() => {
                println!("Photo uploaded. {}", "No distinct features detected.".dimmed())
            }
            Detection::Found(_) => {
                println!("Photo uploaded. All detected features will be kept:");
                view::print_features(&self.controller.inputs().await);
            }
            Detection::Failed(e) => {
                println!("Photo uploaded. {} {}", "Feature detection failed:".yellow(), e);
            }
        }
    }

    async fn reference(&self, arg: &str) {
        match arg {
            "" => println!("{} /reference <path|clear>", "Usage:".yellow()),
            "clear" | "none" => {
                self.controller.clear_reference_image().await;
                println!("Reference design removed.");
            }
            path => match EncodedImage::from_path(path) {
                Ok(image) => {
                    self.controller.upload_reference_image(image).await;
                    println!("Reference design set. The design will follow it instead of a named style.");
                }
                Err(e) => println!("{} Failed to read {}: {}", "Error:".red(), path, e),
            },
        }
    }

    async fn toggle(&self, arg: &str) {
        let inputs = self.controller.inputs().await;
        let label = match arg.parse::<usize>() {
            Ok(n) if n >= 1 => inputs.selection.detected().get(n - 1).cloned(),
            _ => inputs
                .selection
                .detected()
                .iter()
                .find(|d| d.eq_ignore_ascii_case(arg))
                .cloned(),
        };

        let Some(label) = label else {
            println!("{} No detected feature matches '{}'", "?".yellow(), arg);
            return;
        };

        match self.controller.toggle_feature(&label).await {
            Some(true) => println!("Keeping {}", label.green()),
            Some(false) => println!("Not keeping {}", label.dimmed()),
            None => println!("{} No detected feature matches '{}'", "?".yellow(), arg),
        }
    }

    async fn style(&self, arg: &str) {
        if arg.is_empty() {
            for style in GardenStyle::ALL {
                println!("  {:14} {}", style.key().yellow(), style.label());
            }
            return;
        }
        match arg.parse::<GardenStyle>() {
            Ok(style) => {
                let had_reference = self.controller.inputs().await.reference_image.is_some();
                self.controller.select_style(style).await;
                println!("Style: {}", style.label().green());
                if had_reference {
                    println!("{}", "Reference design removed.".dimmed());
                }
            }
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    async fn complexity(&self, arg: &str) {
        if arg.is_empty() {
            for level in DesignComplexity::ALL {
                println!("  {:10} {} ({})", level.name().yellow(), level.label(), level.tagline());
            }
            return;
        }
        match arg.parse::<DesignComplexity>() {
            Ok(level) => {
                self.controller.set_complexity(level).await;
                println!("Complexity: {}", level.label().green());
            }
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    async fn generate(&self) {
        println!("{}", "The architect is drafting your design...".dimmed());
        match self.controller.start_design().await {
            Ok(Some(project)) => {
                self.announce_render(&project, &project.current_image);
                view::print_project(&project);
            }
            Ok(None) => println!("{}", "A design is already being generated.".dimmed()),
            Err(e) => println!("{} {}", "Error:".red(), failure_notice(&e)),
        }
    }

    async fn open(&self, arg: &str) {
        if arg.is_empty() {
            println!("{} /open <id>", "Usage:".yellow());
            return;
        }
        match self.controller.open_project(arg).await {
            Ok(project) => view::print_project(&project),
            Err(e) => println!("{} {}", "Error:".red(), e),
        }
    }

    async fn export(&self, arg: &str) {
        let Some(project) = self.controller.active_project().await else {
            println!("{}", "No design is open.".dimmed());
            return;
        };

        let path = if arg.is_empty() {
            render_path(&self.output_dir, &project, project.render_count())
        } else {
            PathBuf::from(arg)
        };
        match project.current_image.write_to(&path) {
            Ok(()) => println!("Saved {}", path.display().to_string().green()),
            Err(e) => println!("{} Failed to write {}: {}", "Error:".red(), path.display(), e),
        }
    }

    async fn status(&self) {
        let busy = self.controller.busy();
        println!("View: {:?}", self.controller.view().await);
        if busy.detecting || busy.generating || busy.chatting {
            println!(
                "Busy: detecting={} generating={} chatting={}",
                busy.detecting, busy.generating, busy.chatting
            );
        }
        view::print_inputs(&self.controller.inputs().await);
        match self.controller.active_project().await {
            Some(project) => println!(
                "Open design: {} ({}), {} messages",
                project.name.bold(),
                view::short_id(&project.id),
                project.history.len()
            ),
            None => println!("{}", "No design is open.".dimmed()),
        }
    }

    /// Send a chat line to the architect
    async fn chat(&self, input: &str) {
        if self.controller.active_project().await.is_none() {
            println!("{}", "Generate or open a design first (/generate, /open).".dimmed());
            return;
        }

        println!("{}", "The architect is thinking...".dimmed());
        match self.controller.send_message(input).await {
            ChatOutcome::Ignored => println!("{}", "The architect is still working on your last request.".dimmed()),
            ChatOutcome::Advised(reply) => view::print_message(&reply),
            ChatOutcome::Redesigned(reply) => {
                view::print_message(&reply);
                if let (Some(project), Some(image)) = (self.controller.active_project().await, &reply.image_url) {
                    self.announce_render(&project, image);
                }
            }
            ChatOutcome::Failed(e) => {
                println!("{} {}", "The architect couldn't complete that:".red(), failure_notice(&e))
            }
        }
    }

    /// Write a render to the output directory and print where it went
    fn announce_render(&self, project: &DesignProject, image: &EncodedImage) {
        let path = render_path(&self.output_dir, project, project.render_count());
        match save_render(&path, image) {
            Ok(()) => println!("Render saved to {}", path.display().to_string().green()),
            Err(e) => println!("{} {:#}", "Error:".red(), e),
        }
    }
}

/// What to tell the client when an architect call fails
pub fn failure_notice(err: &SessionError) -> String {
    match err.retry_after() {
        Some(wait) => format!("The service is busy. Try again in {} seconds.", wait.as_secs()),
        None => err.to_string(),
    }
}

/// `{output_dir}/{short id}-{n}.{ext}` for the n-th render of a project
pub fn render_path(output_dir: &Path, project: &DesignProject, n: usize) -> PathBuf {
    output_dir.join(format!(
        "{}-{}.{}",
        view::short_id(&project.id),
        n,
        project.current_image.extension()
    ))
}

fn save_render(path: &Path, image: &EncodedImage) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
    }
    image
        .write_to(path)
        .context(format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatMessage, project_name};
    use crate::llm::LlmError;
    use std::time::Duration;

    fn project() -> DesignProject {
        DesignProject {
            id: "0192f3a4-5b6c-7d8e-9f00-112233445566".to_string(),
            name: project_name(None),
            original_image: EncodedImage::new("image/png", "T1JJRw=="),
            reference_image: None,
            current_image: EncodedImage::new("image/jpeg", "Q1VS"),
            style: None,
            complexity: DesignComplexity::Balanced,
            kept_features: vec![],
            history: vec![ChatMessage::assistant("Welcome")],
            created_at: 0,
        }
    }

    #[test]
    fn test_failure_notice() {
        let limited = SessionError::from(LlmError::RateLimited {
            retry_after: Duration::from_secs(45),
        });
        assert_eq!(failure_notice(&limited), "The service is busy. Try again in 45 seconds.");
        assert_eq!(failure_notice(&SessionError::NoYardPhoto), "Upload a photo of your yard first");
    }

    #[test]
    fn test_render_path() {
        let path = render_path(Path::new("renders"), &project(), 2);
        assert_eq!(path, PathBuf::from("renders/0192f3a4-2.jpg"));
    }

    #[test]
    fn test_save_render_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.png");
        save_render(&path, &EncodedImage::new("image/png", "aGVsbG8=")).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }
}
