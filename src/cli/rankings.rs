use super::ui;
use crate::core::cache::EnrichmentCache;
use crate::core::orchestrator::{RunOrchestrator, RunSummary};
use crate::core::output::{OutputSink, RankingRow};
use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use std::io::Write;
use std::time::{Duration, Instant};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

const HEADER: [&str; 18] = [
    "Name", "Team", "Pos", "Age", "Draft", "GP", "Verdict", "Action", "Conf", "Tier", "Asset Class",
    "Flags", "Score", "Signal", "Δ", "EV OFF", "Base EV", "Pace",
];

/// Collects rows and renders them as one table when the run is done.
#[derive(Default)]
pub struct TableSink {
    rows: Vec<RankingRow>,
}

impl TableSink {
    /// Renders to the terminal width, or to `width` when given.
    pub fn render(&self, width: Option<u16>) -> String {
        let mut table = ui::new_styled_table();
        if let Some(width) = width {
            table.set_width(width);
        }
        table.set_header(HEADER.iter().map(|h| ui::header_cell(h)).collect::<Vec<_>>());
        for row in &self.rows {
            add_row(&mut table, row);
        }
        table.to_string()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn add_row(table: &mut Table, row: &RankingRow) {
    table.add_row(vec![
        Cell::new(&row.name),
        Cell::new(&row.team),
        Cell::new(&row.position),
        ui::number_cell(row.age),
        ui::number_cell(row.draft_year),
        ui::number_cell(row.games_played),
        ui::verdict_cell(row.verdict.to_string(), row.confidence),
        Cell::new(row.action.to_string()),
        Cell::new(row.confidence.to_string()),
        Cell::new(row.tier.to_string()),
        Cell::new(row.asset_class.to_string()),
        Cell::new(row.flags_label()),
        ui::number_cell(row.score),
        ui::signal_cell(row.signal),
        ui::delta_cell(row.delta),
        ui::format_optional_cell(row.current_index, |v| v.to_string()),
        ui::format_optional_cell(row.baseline_index, |v| v.to_string()),
        ui::number_cell(format!("{}pts", row.pace)),
    ]);
}

impl OutputSink for TableSink {
    fn clear(&mut self) -> Result<()> {
        self.rows.clear();
        Ok(())
    }

    fn append(&mut self, rows: &[RankingRow]) -> Result<()> {
        self.rows.extend_from_slice(rows);
        Ok(())
    }
}

/// Streams each row as one JSON object per line.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for JsonSink<W> {
    /// Nothing written to a stream can be taken back; rows only start
    /// flowing after the clear.
    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn append(&mut self, rows: &[RankingRow]) -> Result<()> {
        for row in rows {
            serde_json::to_writer(&mut self.writer, row).context("Failed to serialize row")?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush().context("Failed to flush output")
    }
}

/// Runs a full pass and prints the rankings.
pub async fn run(
    orchestrator: &RunOrchestrator<'_>,
    season: &str,
    cache: &mut EnrichmentCache,
    format: OutputFormat,
    time_budget: Duration,
) -> Result<()> {
    let lines = orchestrator.fetch_lines(season).await;
    if lines.is_empty() {
        println!("No skater stats available for season {season}.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(lines.len() as u64, true);
    pb.set_message("Scoring players...");
    let deadline = Instant::now() + time_budget;

    let summary = match format {
        OutputFormat::Table => {
            let mut sink = TableSink::default();
            let summary = orchestrator
                .score_lines(&lines, cache, &mut sink, deadline, &|| pb.inc(1))
                .await;
            pb.finish_and_clear();
            println!(
                "Rankings: {}\n",
                ui::style_text(season, ui::StyleType::Title)
            );
            println!("{}", sink.render(None));
            summary
        }
        OutputFormat::Json => {
            let mut sink = JsonSink::new(std::io::stdout());
            let summary = orchestrator
                .score_lines(&lines, cache, &mut sink, deadline, &|| pb.inc(1))
                .await;
            pb.finish_and_clear();
            summary
        }
    };

    if format == OutputFormat::Table {
        print_footer(&summary);
    }
    info!(?summary, "Rankings produced");
    Ok(())
}

fn print_footer(summary: &RunSummary) {
    println!(
        "\n{} {} of {} players ({} from cache, {} looked up)",
        ui::style_text("Scored:", ui::StyleType::TotalLabel),
        summary.rows_written,
        summary.candidates,
        summary.cache_hits,
        summary.lookups
    );
    if summary.deadline_hit {
        println!(
            "{}",
            ui::style_text(
                "Time budget reached; remaining players were skipped.",
                ui::StyleType::Warning
            )
        );
    }
    if summary.cache_written > 0 {
        println!(
            "{}",
            ui::style_text(
                &format!("Cached {} new career records.", summary.cache_written),
                ui::StyleType::Subtle
            )
        );
    }
}
