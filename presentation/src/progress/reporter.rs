//! Progress reporting for research runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use research_application::ports::progress::ResearchProgressNotifier;
use research_application::PhaseOutcome;
use research_domain::{AgentError, AgentState, DecisionContext};
use std::time::Duration;

/// Reports progress with a bar tracking context progress from 0 to 100
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(Self::bar_style());
        bar.set_prefix(AgentState::Idle.display_name());
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:>10.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResearchProgressNotifier for ProgressReporter {
    fn on_state_change(&self, state: AgentState, context: &DecisionContext) {
        self.bar.set_prefix(state.display_name());
        self.bar.set_position(u64::from(context.progress));
    }

    fn on_phase_start(&self, state: AgentState, attempt: usize) {
        let message = if attempt > 1 {
            format!("{} (attempt {})", state_verb(state), attempt)
        } else {
            state_verb(state).to_string()
        };
        self.bar.set_message(message);
    }

    fn on_phase_outcome(&self, _state: AgentState, outcome: &PhaseOutcome) {
        if !outcome.results.is_empty() {
            self.bar
                .set_message(format!("{} new results", outcome.results.len()));
        }
    }

    fn on_collaborator_error(&self, state: AgentState, error: &AgentError) {
        let marker = if error.recoverable {
            "!".yellow()
        } else {
            "x".red()
        };
        self.bar
            .println(format!("  {} {}: {}", marker, state.display_name(), error));
    }

    fn on_gate_rejected(&self, from: AgentState, to: AgentState) {
        self.bar.println(format!(
            "  {} {} -> {} blocked by its gate",
            "-".dimmed(),
            from,
            to
        ));
    }

    fn on_run_complete(&self, state: AgentState, context: &DecisionContext) {
        self.bar.set_prefix(state.display_name());
        self.bar.set_position(u64::from(context.progress));
        let message = match state {
            AgentState::Completed => "research complete".green().to_string(),
            _ => format!("stopped in {}", state).red().to_string(),
        };
        self.bar.finish_with_message(message);
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ResearchProgressNotifier for SimpleProgress {
    fn on_state_change(&self, state: AgentState, context: &DecisionContext) {
        println!(
            "{} {} ({}%)",
            "->".cyan(),
            state.display_name().bold(),
            context.progress
        );
    }

    fn on_phase_start(&self, state: AgentState, attempt: usize) {
        if attempt > 1 {
            println!("  {} attempt {}", state_verb(state).dimmed(), attempt);
        }
    }

    fn on_collaborator_error(&self, state: AgentState, error: &AgentError) {
        if error.recoverable {
            println!("  {} {}: {}", "!".yellow(), state, error);
        } else {
            println!("  {} {}: {}", "x".red(), state, error);
        }
    }

    fn on_gate_rejected(&self, from: AgentState, to: AgentState) {
        println!("  {} {} -> {} blocked", "-".dimmed(), from, to);
    }

    fn on_run_complete(&self, state: AgentState, _context: &DecisionContext) {
        match state {
            AgentState::Completed => println!("{}\n", "Research complete".green().bold()),
            _ => println!("{}\n", format!("Stopped in {}", state).red().bold()),
        }
    }
}

fn state_verb(state: AgentState) -> &'static str {
    match state {
        AgentState::Planning => "planning the research",
        AgentState::Searching => "searching sources",
        AgentState::Scraping => "scraping documents",
        AgentState::Analyzing => "analyzing findings",
        AgentState::Verifying => "verifying claims",
        AgentState::Compiling => "compiling the report",
        AgentState::Idle => "waiting",
        AgentState::Completed => "done",
        AgentState::Failed => "failed",
    }
}
