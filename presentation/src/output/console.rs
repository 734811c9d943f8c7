//! Console output formatter for research runs

use colored::Colorize;
use research_application::RunResearchOutput;
use research_domain::{AgentState, OutputFormat, TransitionTable};

/// Formats run outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render `output` in the requested format
    pub fn render(format: OutputFormat, output: &RunResearchOutput) -> String {
        match format {
            OutputFormat::Summary => Self::format_summary(output),
            OutputFormat::Full => Self::format(output),
            OutputFormat::Json => Self::format_json(output),
        }
    }

    /// Format the complete run report
    pub fn format(output: &RunResearchOutput) -> String {
        let context = &output.context;
        let mut out = String::new();

        out.push_str(&Self::header("Research Run"));
        out.push('\n');
        out.push_str(&Self::outcome_line(output));
        out.push_str(&format!(
            "{} {} steps, {} restarts, {:.1}s\n",
            "Run:".cyan().bold(),
            output.steps,
            output.restarts,
            context.time_elapsed.as_secs_f64()
        ));

        out.push_str(&Self::section_header("Plan"));
        match &context.plan {
            Some(plan) => {
                out.push_str(&format!("\n{}\n", plan.objective.bold()));
                for query in &plan.queries {
                    out.push_str(&format!("  ? {}\n", query));
                }
                if !plan.sources.is_empty() {
                    out.push_str(&format!(
                        "  {} {}\n",
                        "sources:".dimmed(),
                        plan.sources.join(", ")
                    ));
                }
            }
            None => out.push_str(&format!("\n{}\n", "(no plan)".dimmed())),
        }

        out.push_str(&Self::section_header(&format!(
            "Results ({})",
            context.results.len()
        )));
        for result in &context.results {
            out.push_str(&format!(
                "\n{}\n",
                format!("── {} ──", result.title).yellow().bold()
            ));
            out.push_str(&format!("  {} {}\n", "source:".dimmed(), result.source));
            if let Some(url) = &result.url {
                out.push_str(&format!("  {} {}\n", "url:".dimmed(), url));
            }
            if let Some(relevance) = result.relevance {
                out.push_str(&format!("  {} {:.2}\n", "relevance:".dimmed(), relevance));
            }
            if !result.content.is_empty() {
                out.push_str(&Self::indent(&result.content, "  "));
                out.push('\n');
            }
        }

        out.push_str(&Self::section_header("Quality"));
        out.push('\n');
        for (name, value) in context.quality.fields() {
            out.push_str(&format!("  {:<20} {:.2}\n", name, value));
        }

        if context.error_count() > 0 {
            out.push_str(&Self::section_header(&format!(
                "Errors ({})",
                context.error_count()
            )));
            out.push('\n');
            for error in &context.errors {
                let line = format!("  * {}", error);
                if error.recoverable {
                    out.push_str(&format!("{}\n", line.yellow()));
                } else {
                    out.push_str(&format!("{}\n", line.red()));
                }
            }
        }

        out.push_str(&Self::footer());
        out
    }

    /// Concise outcome: final state, progress and quality
    pub fn format_summary(output: &RunResearchOutput) -> String {
        let context = &output.context;
        let mut out = String::new();

        out.push_str(&format!("{}\n\n", "=== Research Summary ===".cyan().bold()));
        if let Some(plan) = &context.plan {
            out.push_str(&format!("{} {}\n", "Objective:".bold(), plan.objective));
        }
        out.push_str(&Self::outcome_line(output));
        out.push_str(&format!(
            "{} {} collected, overall quality {:.2}\n",
            "Results:".cyan().bold(),
            context.results.len(),
            context.quality.overall
        ));
        if let Some(error) = context.last_error() {
            out.push_str(&format!("{} {}\n", "Last error:".dimmed(), error));
        }
        out
    }

    /// Format as JSON
    pub fn format_json(output: &RunResearchOutput) -> String {
        serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
    }

    /// One line per transition with its guard label, grouped by source state
    pub fn format_table(table: &TransitionTable) -> String {
        let mut out = String::new();
        out.push_str(&Self::header("Transition Table"));
        out.push('\n');

        for from in AgentState::ALL {
            let mut rows = table.transitions_from(from).peekable();
            if rows.peek().is_none() {
                continue;
            }
            out.push_str(&format!("\n{}\n", from.as_str().cyan().bold()));
            for transition in rows {
                let condition = transition
                    .condition_label()
                    .map(|label| format!("  when {}", label).dimmed().to_string())
                    .unwrap_or_default();
                out.push_str(&format!(
                    "  -> {:<10}{}\n",
                    transition.to.as_str(),
                    condition
                ));
            }
        }

        out.push_str(&Self::footer());
        out
    }

    fn outcome_line(output: &RunResearchOutput) -> String {
        let state = if output.success {
            output.final_state.as_str().green().bold()
        } else {
            output.final_state.as_str().red().bold()
        };
        format!(
            "{} {} ({}% progress)\n",
            "State:".cyan().bold(),
            state,
            output.context.progress
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
