//! Run commands.

use anyhow::Result;
use ghrun_config::Settings;
use ghrun_core::{Conclusion, Error, RepoRef, Run, RunFetcher, Status};
use std::io::Write;
use tracing::debug;

use crate::table::TablePrinter;

/// Number of runs requested when neither a flag nor the config sets one.
pub const DEFAULT_LIMIT: u32 = 10;

const SUCCESS_SYMBOL: &str = "✓";
const FAILURE_SYMBOL: &str = "X";
const PENDING_SYMBOL: &str = "-";

/// Options for `run list`, fixed once flags and config are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    pub limit: u32,
    pub plain_output: bool,
    pub repo: RepoRef,
}

impl ListOptions {
    /// Merge command-line values over config file defaults.
    pub fn resolve(
        limit: Option<u32>,
        plain_output: bool,
        repo: Option<RepoRef>,
        settings: &Settings,
    ) -> ghrun_core::Result<Self> {
        let repo = repo.or_else(|| settings.repo.clone()).ok_or_else(|| {
            Error::InvalidInput(
                "no repository given; pass --repo OWNER/REPO or set `repo` in the config file"
                    .to_string(),
            )
        })?;

        Ok(Self {
            limit: limit.or(settings.limit).unwrap_or(DEFAULT_LIMIT),
            plain_output: plain_output || settings.plain.unwrap_or(false),
            repo,
        })
    }
}

/// List recent runs, writing the result to `out`.
///
/// `stdout_is_terminal` selects the aligned table unless plain output was
/// requested.
pub async fn list<W: Write>(
    fetcher: &dyn RunFetcher,
    opts: &ListOptions,
    stdout_is_terminal: bool,
    out: &mut W,
) -> Result<()> {
    let interactive = stdout_is_terminal && !opts.plain_output;
    debug!(
        fetcher = fetcher.name(),
        repo = %opts.repo,
        limit = opts.limit,
        interactive,
        "listing runs"
    );

    let payload = fetcher.fetch_runs(&opts.repo, opts.limit).await?;

    let shown = payload.workflow_runs.len().min(opts.limit as usize);
    render_runs(&payload.workflow_runs[..shown], interactive, out)?;
    Ok(())
}

/// Render runs as an aligned table (`interactive`) or tab-separated lines.
pub fn render_runs<W: Write>(runs: &[Run], interactive: bool, out: &mut W) -> std::io::Result<()> {
    if runs.is_empty() {
        if interactive {
            writeln!(out, "No runs found")?;
        }
        return Ok(());
    }

    let mut table = TablePrinter::new(interactive);
    for run in runs {
        if table.is_tty() {
            table.add_field(status_symbol(run));
        } else {
            table.add_field(run.status.as_str());
            table.add_field(run.conclusion().map(Conclusion::as_str).unwrap_or(""));
        }

        table.add_field(run.head_commit.summary());
        table.add_field(run.name.as_str());
        table.add_field(run.head_branch.as_str());
        table.add_field(run.event.as_str());

        if !table.is_tty() {
            table.add_field(format_elapsed(run.elapsed()));
        }

        table.add_field(run.id.to_string());
        table.end_row();
    }
    table.render(out)?;

    if interactive {
        writeln!(out)?;
        writeln!(out, "For details on a run, try: gh run view <run-id>")?;
    }

    Ok(())
}

/// Glyph summarising a run's outcome.
///
/// Cancelled, neutral and skipped runs count as non-failures.
pub fn status_symbol(run: &Run) -> &'static str {
    match (&run.status, run.conclusion()) {
        (
            Status::Completed,
            Some(
                Conclusion::Success | Conclusion::Cancelled | Conclusion::Neutral | Conclusion::Skipped,
            ),
        ) => SUCCESS_SYMBOL,
        (Status::Completed, _) => FAILURE_SYMBOL,
        _ => PENDING_SYMBOL,
    }
}

/// Compact duration such as `4m34s` or `1h0m5s`.
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let total = elapsed.num_seconds().max(0);
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
