//! CLI binary for taxo: taxonomy levels and hierarchy paths from flat tables.

mod tasks;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use taxo_core::config::TaxoConfig;
use taxo_core::graph::{Edge, EdgeIndex};
use taxo_core::tables::{self, Table, TableWriter};
use taxo_nav::depth::DepthResolver;
use taxo_nav::format::{self, PathFormatter};
use taxo_nav::paths::PathEnumerator;
use taxo_nav::stats::{LevelReport, PathStats};

#[derive(Parser)]
#[command(name = "taxo", about = "Taxonomy hierarchy levels and paths")]
struct Cli {
    /// Config file (defaults to ./taxo.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Reject hierarchies that contain a cycle instead of containing it
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append each entity's hierarchy level to its row
    Levels {
        /// Entity table (e.g. skills.csv)
        #[arg(long)]
        skills: PathBuf,

        /// Parent/child edge table (e.g. skill_hierarchy.csv)
        #[arg(long)]
        hierarchy: PathBuf,

        /// Output table
        #[arg(short, long)]
        output: PathBuf,

        /// Print the level report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Write one row per upward path of each entity
    Paths {
        /// Entity table (e.g. skills.csv)
        #[arg(long)]
        skills: PathBuf,

        /// Parent/child edge table (e.g. skill_hierarchy.csv)
        #[arg(long)]
        hierarchy: PathBuf,

        /// Extra label tables merged after the entity labels (repeatable)
        #[arg(long)]
        groups: Vec<PathBuf>,

        /// Output table
        #[arg(short, long)]
        output: PathBuf,

        /// Stop after this many paths per entity
        #[arg(long)]
        max_paths: Option<usize>,

        /// Print path statistics as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Map O*NET tasks through DWAs and IWAs to work activities
    Tasks {
        /// Directory holding the O*NET text or CSV tables
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Output table
        #[arg(short, long)]
        output: PathBuf,

        /// Print the task report as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show rows of a levels table and its level distribution
    View {
        /// Table written by `levels`
        #[arg(short, long, default_value = "skills_with_levels.csv")]
        file: PathBuf,

        /// Number of rows to display
        #[arg(short, long, default_value = "20")]
        num: usize,

        /// Only show rows at this level
        #[arg(short, long)]
        level: Option<usize>,
    },
}

fn load_config(cli: &Cli) -> Result<TaxoConfig> {
    let mut config = match &cli.config {
        Some(path) => TaxoConfig::load_file(path)?,
        None => {
            let cwd = std::env::current_dir().context("failed to get current directory")?;
            TaxoConfig::load(&cwd)?
        }
    };
    if cli.strict {
        config.hierarchy.strict_acyclic = true;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Levels {
            skills,
            hierarchy,
            output,
            json,
        } => cmd_levels(&config, &skills, &hierarchy, &output, json),
        Commands::Paths {
            skills,
            hierarchy,
            groups,
            output,
            max_paths,
            json,
        } => cmd_paths(&config, &skills, &hierarchy, &groups, &output, max_paths, json),
        Commands::Tasks {
            data_dir,
            output,
            json,
        } => tasks::cmd_tasks(&config, &data_dir, &output, json),
        Commands::View { file, num, level } => cmd_view(&config, &file, num, level),
    }
}

/// Build the edge index, rejecting cycles up front in strict mode.
pub(crate) fn build_index(edges: Vec<Edge>, config: &TaxoConfig) -> Result<EdgeIndex> {
    let index = EdgeIndex::from_edges(edges);
    eprintln!(
        "  Found {} nodes with parents ({} distinct edges)",
        index.child_count(),
        index.edge_count()
    );
    if config.hierarchy.strict_acyclic {
        taxo_nav::cycles::ensure_acyclic(&index)?;
    }
    Ok(index)
}

/// Row progress: a bar when enabled, periodic log lines otherwise.
pub(crate) struct RowProgress {
    bar: ProgressBar,
    log_every: Option<usize>,
    done: usize,
}

impl RowProgress {
    pub(crate) fn new(config: &TaxoConfig, label: &str, total: usize) -> Self {
        if !config.progress.enabled {
            return Self {
                bar: ProgressBar::hidden(),
                log_every: Some(config.progress.interval),
                done: 0,
            };
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("  {prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} rows")
                .expect("valid template")
                .progress_chars("##-"),
        );
        bar.set_prefix(label.to_string());
        Self {
            bar,
            log_every: None,
            done: 0,
        }
    }

    pub(crate) fn tick(&mut self) {
        self.done += 1;
        self.bar.inc(1);
        if let Some(every) = self.log_every
            && self.done % every == 0
        {
            tracing::info!("processed {} rows", self.done);
        }
    }

    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize report")?
    );
    Ok(())
}

pub(crate) fn print_cycle_summary(count: usize, truncated: &[String]) {
    if count > 0 {
        eprintln!("  Cycles contained: {} (see warnings above)", count);
    }
    if !truncated.is_empty() {
        eprintln!(
            "  Path cap reached for {} entities (first: {})",
            truncated.len(),
            truncated[0]
        );
    }
}

fn cmd_levels(
    config: &TaxoConfig,
    skills: &Path,
    hierarchy: &Path,
    output: &Path,
    json: bool,
) -> Result<()> {
    let columns = &config.columns;

    eprintln!("Building parent map from {}...", hierarchy.display());
    let edges = tables::read_edges(hierarchy, &columns.child, &columns.parent)?;
    let index = build_index(edges, config)?;

    let table = Table::read(skills)?;
    let id_col = table.column(&columns.id)?;

    let headers = table
        .headers()
        .iter()
        .chain(std::iter::once(columns.level.as_str()));
    let mut writer = TableWriter::create(output, headers)?;

    eprintln!("Calculating depths...");
    let mut resolver = DepthResolver::new(&index);
    let mut progress = RowProgress::new(config, "Levels", table.len());
    for record in table.records() {
        let id = table.require(record, id_col)?;
        let level = resolver.depth(id).to_string();
        writer.write_row(record.iter().chain(std::iter::once(level.as_str())))?;
        progress.tick();
    }
    progress.finish();
    let rows = writer.finish()?;

    let report = LevelReport {
        entities: rows,
        resolved_nodes: resolver.resolved(),
        levels: resolver.level_distribution(),
        cycles: resolver.diagnostics().len(),
    };

    eprintln!("\nDone! Processed {} entities", report.entities);
    eprintln!("  Output written to: {}", output.display());
    print_cycle_summary(report.cycles, &[]);
    eprintln!("\nLevel distribution ({} resolved nodes):", report.resolved_nodes);
    for (level, count) in &report.levels {
        eprintln!("  Level {}: {}", level, count);
    }

    if json {
        print_json(&report)?;
    }
    Ok(())
}

fn cmd_paths(
    config: &TaxoConfig,
    skills: &Path,
    hierarchy: &Path,
    groups: &[PathBuf],
    output: &Path,
    max_paths: Option<usize>,
    json: bool,
) -> Result<()> {
    let columns = &config.columns;
    let max_paths = max_paths.or(config.hierarchy.max_paths);
    if max_paths == Some(0) {
        anyhow::bail!("--max-paths must be at least 1");
    }

    eprintln!("Loading hierarchy relationships...");
    let edges = tables::read_edges(hierarchy, &columns.child, &columns.parent)?;
    let index = build_index(edges, config)?;

    eprintln!("Loading labels...");
    let mut labels = tables::read_labels(skills, &columns.id, &columns.label)?;
    for group in groups {
        labels.merge(tables::read_labels(group, &columns.id, &columns.label)?);
    }

    let table = Table::read(skills)?;
    let id_col = table.column(&columns.id)?;

    eprintln!("\nProcessing {} entities...", table.len());
    let mut enumerator = PathEnumerator::new(&index).with_max_paths(max_paths);
    let mut stats = PathStats::default();
    let mut per_row = Vec::with_capacity(table.len());
    let mut progress = RowProgress::new(config, "Paths", table.len());
    for record in table.records() {
        let id = table.require(record, id_col)?;
        let paths = enumerator.paths(id);
        stats.record(&paths);
        per_row.push(paths);
        progress.tick();
    }
    progress.finish();

    // Level columns are sized to the longest path in the whole run.
    let max_levels = stats.max_path_len.saturating_sub(1);
    let headers: Vec<String> = table
        .headers()
        .iter()
        .map(str::to_string)
        .chain(format::level_headers(max_levels))
        .chain(std::iter::once(columns.path.clone()))
        .collect();

    eprintln!(
        "\nWriting {} rows (maximum path length: {} levels)...",
        stats.rows, stats.max_path_len
    );
    let formatter = PathFormatter::with_separator(&labels, config.hierarchy.separator.clone());
    let mut writer = TableWriter::create(output, &headers)?;
    for (record, paths) in table.records().iter().zip(&per_row) {
        for path in paths {
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            let cells = formatter.level_cells(path);
            for level in 0..max_levels {
                let (id, label) = cells.get(level).cloned().unwrap_or_default();
                row.push(id);
                row.push(label);
            }
            row.push(formatter.format_path(path));
            writer.write_row(&row)?;
        }
    }
    writer.finish()?;

    stats.cycle_closures = enumerator.diagnostics().len();
    stats.truncated = enumerator.truncated().len();

    eprintln!("\nDone!");
    eprintln!("  Input entities: {}", stats.entities);
    eprintln!("  Output rows: {} (entities with several paths have several rows)", stats.rows);
    eprintln!("  Output written to: {}", output.display());
    print_cycle_summary(stats.cycle_closures, enumerator.truncated());
    eprintln!("\nPath statistics:");
    eprintln!("  Entities with 1 path: {}", stats.single_path);
    eprintln!("  Entities with 2+ paths: {}", stats.multi_path);
    eprintln!("  Max paths for a single entity: {}", stats.max_paths);

    if json {
        print_json(&stats)?;
    }
    Ok(())
}

/// Cut a cell to `width` characters for terminal display.
fn clip(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut clipped: String = value.chars().take(width.saturating_sub(3)).collect();
        clipped.push_str("...");
        clipped
    }
}

const VIEW_COLUMN_WIDTH: usize = 60;

fn cmd_view(config: &TaxoConfig, file: &Path, num: usize, level: Option<usize>) -> Result<()> {
    let columns = &config.columns;
    let table = Table::read(file)?;
    let level_col = table.column(&columns.level)?;

    let shown: Vec<usize> = [&columns.id, &columns.label, &columns.skill_type, &columns.level]
        .into_iter()
        .filter_map(|name| table.find_column(name))
        .collect();

    let mut distribution: BTreeMap<usize, usize> = BTreeMap::new();
    let mut selected = Vec::new();
    for record in table.records() {
        let value = table.require(record, level_col)?;
        let row_level: usize = value.parse().with_context(|| {
            format!(
                "{}: invalid {} value `{}`",
                file.display(),
                columns.level,
                value
            )
        })?;
        if level.is_some_and(|wanted| wanted != row_level) {
            continue;
        }
        *distribution.entry(row_level).or_insert(0) += 1;
        selected.push(record);
    }

    match level {
        Some(l) => println!("Showing rows at {} {}", columns.level, l),
        None => println!("Showing first {} rows", num),
    }

    let cells: Vec<Vec<String>> = std::iter::once(
        shown
            .iter()
            .map(|&c| table.headers().get(c).unwrap_or_default().to_string())
            .collect(),
    )
    .chain(selected.iter().take(num).map(|record| {
        shown
            .iter()
            .map(|&c| clip(Table::optional(record, c), VIEW_COLUMN_WIDTH))
            .collect()
    }))
    .collect();

    let widths: Vec<usize> = (0..shown.len())
        .map(|i| cells.iter().map(|row| row[i].chars().count()).max().unwrap_or(0))
        .collect();
    let rule = "=".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1));

    println!("\n{}", rule);
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<w$}", cell, w = w))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
    println!("{}", rule);

    println!("\nTotal rows: {}", selected.len());
    println!("\nLevel distribution:");
    for (l, count) in &distribution {
        println!("  Level {}: {}", l, count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_keeps_short_values() {
        assert_eq!(clip("manage staff", 60), "manage staff");
    }

    #[test]
    fn test_clip_long_values() {
        let long = "x".repeat(80);
        let clipped = clip(&long, 10);
        assert_eq!(clipped, "xxxxxxx...");
        assert_eq!(clipped.chars().count(), 10);
    }

    #[test]
    fn test_cli_parses_paths_command() {
        let cli = Cli::try_parse_from([
            "taxo",
            "--strict",
            "paths",
            "--skills",
            "skills.csv",
            "--hierarchy",
            "skill_hierarchy.csv",
            "--groups",
            "skill_groups.csv",
            "-o",
            "out.csv",
            "--max-paths",
            "5",
        ])
        .unwrap();
        assert!(cli.strict);
        match cli.command {
            Commands::Paths {
                groups, max_paths, ..
            } => {
                assert_eq!(groups, vec![PathBuf::from("skill_groups.csv")]);
                assert_eq!(max_paths, Some(5));
            }
            _ => panic!("expected paths command"),
        }
    }

    #[test]
    fn test_view_defaults() {
        let cli = Cli::try_parse_from(["taxo", "view"]).unwrap();
        match cli.command {
            Commands::View { file, num, level } => {
                assert_eq!(file, PathBuf::from("skills_with_levels.csv"));
                assert_eq!(num, 20);
                assert_eq!(level, None);
            }
            _ => panic!("expected view command"),
        }
    }
}
