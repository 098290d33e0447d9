//! O*NET task hierarchy: Task → DWA → IWA → work activity.
//!
//! The three O*NET tables become one edge index and one label table; each
//! task then gets one output row per upward path, exactly like the skills
//! taxonomy.

use crate::{RowProgress, build_index, print_cycle_summary, print_json};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use taxo_core::config::TaxoConfig;
use taxo_core::graph::Edge;
use taxo_core::labels::LabelTable;
use taxo_core::tables::{Table, TableWriter};
use taxo_nav::format::PathFormatter;
use taxo_nav::paths::PathEnumerator;
use taxo_nav::stats::PathStats;

const TASK_STATEMENTS: &str = "Task Statements";
const TASKS_TO_DWAS: &str = "Tasks to DWAs";
const DWA_REFERENCE: &str = "DWA Reference";

const SOC_CODE: &str = "O*NET-SOC Code";
const TASK_ID: &str = "Task ID";
const TASK: &str = "Task";
const DWA_ID: &str = "DWA ID";
const DWA_TITLE: &str = "DWA Title";
const IWA_ID: &str = "IWA ID";
const IWA_TITLE: &str = "IWA Title";
const ELEMENT_ID: &str = "Element ID";
const ELEMENT_NAME: &str = "Element Name";

/// Task-level columns carried into the output, when present.
const TASK_COLUMNS: &[&str] = &[
    SOC_CODE,
    "Title",
    TASK_ID,
    TASK,
    "Task Type",
    "Incumbents Responding",
    "Date",
    "Domain Source",
];

/// Output column pairs for the three levels above a task.
const HIERARCHY_COLUMNS: [(&str, &str); 3] = [
    (DWA_ID, DWA_TITLE),
    (IWA_ID, IWA_TITLE),
    ("WA_Element_ID", "WA_Element_Name"),
];

const PATH_COLUMN: &str = "Hierarchy_Path";

/// Summary of a task run.
#[derive(Debug, Default, Serialize)]
pub struct TaskReport {
    pub paths: PathStats,
    pub rows_with_dwa: usize,
    pub rows_with_iwa: usize,
    pub rows_with_work_activity: usize,
    pub unique_dwas: usize,
    pub unique_iwas: usize,
    pub unique_work_activities: usize,
}

/// Locate an O*NET table by name: tab-delimited `.txt` first, then `.csv`.
fn find_table(dir: &Path, name: &str) -> Result<PathBuf> {
    ["txt", "tsv", "csv"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", name, ext)))
        .find(|path| path.exists())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no `{}` table (.txt, .tsv or .csv) in {}",
                name,
                dir.display()
            )
        })
}

/// Node id of a task. Task rows are keyed by occupation and task id together.
pub fn task_node(soc_code: &str, task_id: &str) -> String {
    format!("{}#{}", soc_code, task_id)
}

/// Edges and labels from the task-to-DWA and DWA reference tables.
fn load_activity_hierarchy(data_dir: &Path) -> Result<(Vec<Edge>, LabelTable)> {
    let mut edges = Vec::new();
    let mut labels = LabelTable::new();

    let mapping = Table::read(&find_table(data_dir, TASKS_TO_DWAS)?)?;
    let soc = mapping.column(SOC_CODE)?;
    let task_id = mapping.column(TASK_ID)?;
    let dwa_id = mapping.column(DWA_ID)?;
    let dwa_title = mapping.find_column(DWA_TITLE);
    for record in mapping.records() {
        let task = task_node(mapping.require(record, soc)?, mapping.require(record, task_id)?);
        let dwa = mapping.require(record, dwa_id)?;
        edges.push(Edge::new(task, dwa));
        if let Some(col) = dwa_title {
            let title = Table::optional(record, col);
            if !title.is_empty() {
                labels.insert(dwa, title);
            }
        }
    }
    eprintln!("  Loaded {} task-to-DWA mappings", mapping.len());

    let reference = Table::read(&find_table(data_dir, DWA_REFERENCE)?)?;
    let dwa_id = reference.column(DWA_ID)?;
    let iwa_id = reference.column(IWA_ID)?;
    let element_id = reference.column(ELEMENT_ID)?;
    let titled = [
        (dwa_id, reference.find_column(DWA_TITLE)),
        (iwa_id, reference.find_column(IWA_TITLE)),
        (element_id, reference.find_column(ELEMENT_NAME)),
    ];
    for record in reference.records() {
        let dwa = reference.require(record, dwa_id)?;
        let iwa = reference.require(record, iwa_id)?;
        let element = reference.require(record, element_id)?;
        edges.push(Edge::new(dwa, iwa));
        edges.push(Edge::new(iwa, element));
        for (id_col, title_col) in titled {
            if let Some(col) = title_col {
                let title = Table::optional(record, col);
                if !title.is_empty() {
                    labels.insert(Table::optional(record, id_col), title);
                }
            }
        }
    }
    eprintln!("  Loaded {} DWA reference entries", reference.len());

    Ok((edges, labels))
}

pub fn cmd_tasks(config: &TaxoConfig, data_dir: &Path, output: &Path, json: bool) -> Result<()> {
    eprintln!("Loading O*NET data files...");
    let statements = Table::read(&find_table(data_dir, TASK_STATEMENTS)?)?;
    eprintln!("  Loaded {} task statements", statements.len());
    let soc = statements.column(SOC_CODE)?;
    let task_id = statements.column(TASK_ID)?;
    let task_text = statements.column(TASK)?;

    let (edges, mut labels) = load_activity_hierarchy(data_dir)?;
    let index = build_index(edges, config)?;

    let mut nodes = Vec::with_capacity(statements.len());
    for record in statements.records() {
        let node = task_node(statements.require(record, soc)?, statements.require(record, task_id)?);
        labels.insert(node.clone(), statements.require(record, task_text)?);
        nodes.push(node);
    }

    let kept: Vec<usize> = TASK_COLUMNS
        .iter()
        .filter_map(|name| statements.find_column(name))
        .collect();
    let headers: Vec<&str> = kept
        .iter()
        .filter_map(|&c| statements.headers().get(c))
        .chain(HIERARCHY_COLUMNS.iter().flat_map(|(id, title)| [*id, *title]))
        .chain(std::iter::once(PATH_COLUMN))
        .collect();

    eprintln!("\nBuilding hierarchy paths...");
    let formatter = PathFormatter::with_separator(&labels, config.hierarchy.separator.clone());
    let mut enumerator = PathEnumerator::new(&index).with_max_paths(config.hierarchy.max_paths);
    let mut report = TaskReport::default();
    let mut seen: [BTreeSet<String>; 3] = Default::default();
    let mut writer = TableWriter::create(output, &headers)?;
    let mut progress = RowProgress::new(config, "Tasks", nodes.len());

    for (record, node) in statements.records().iter().zip(&nodes) {
        let paths = enumerator.paths(node);
        report.paths.record(&paths);
        for path in &paths {
            let mut row: Vec<String> = kept
                .iter()
                .map(|&c| Table::optional(record, c).to_string())
                .collect();
            let cells = formatter.level_cells(path);
            for (level, seen_ids) in seen.iter_mut().enumerate() {
                let (id, title) = cells.get(level).cloned().unwrap_or_default();
                if !id.is_empty() {
                    seen_ids.insert(id.clone());
                }
                row.push(id);
                row.push(title);
            }
            row.push(formatter.format_path(path));
            writer.write_row(&row)?;
        }
        progress.tick();
    }
    progress.finish();
    writer.finish()?;

    report.paths.cycle_closures = enumerator.diagnostics().len();
    report.paths.truncated = enumerator.truncated().len();
    report.rows_with_dwa = report.paths.rows_reaching(1);
    report.rows_with_iwa = report.paths.rows_reaching(2);
    report.rows_with_work_activity = report.paths.rows_reaching(3);
    let [dwas, iwas, activities] = &seen;
    report.unique_dwas = dwas.len();
    report.unique_iwas = iwas.len();
    report.unique_work_activities = activities.len();

    print_report(&report);
    print_cycle_summary(report.paths.cycle_closures, enumerator.truncated());
    eprintln!("\nOutput saved to: {}", output.display());

    if json {
        print_json(&report)?;
    }
    Ok(())
}

fn print_report(report: &TaskReport) {
    let stats = &report.paths;
    eprintln!("\n{}", "=".repeat(60));
    eprintln!("HIERARCHY PATH ANALYSIS");
    eprintln!("{}", "=".repeat(60));
    eprintln!("\nTotal rows (unique paths): {}", stats.rows);
    eprintln!("Unique tasks: {}", stats.entities);
    eprintln!("Average paths per task: {:.2}", stats.average_paths());

    eprintln!("\nDistribution of paths per task:");
    eprintln!("  1 path: {} tasks", stats.distribution.one);
    eprintln!("  2-5 paths: {} tasks", stats.distribution.two_to_five);
    eprintln!("  6-10 paths: {} tasks", stats.distribution.six_to_ten);
    eprintln!("  >10 paths: {} tasks", stats.distribution.over_ten);
    eprintln!("  Max paths for a single task: {}", stats.max_paths);

    eprintln!("\nHierarchy completeness:");
    eprintln!(
        "  Rows with complete path to work activity: {} ({:.1}%)",
        report.rows_with_work_activity,
        stats.percent_of_rows(report.rows_with_work_activity)
    );
    eprintln!(
        "  Rows with DWA mapping: {} ({:.1}%)",
        report.rows_with_dwa,
        stats.percent_of_rows(report.rows_with_dwa)
    );
    eprintln!(
        "  Rows with IWA mapping: {} ({:.1}%)",
        report.rows_with_iwa,
        stats.percent_of_rows(report.rows_with_iwa)
    );

    eprintln!("\nUnique counts at each level:");
    eprintln!("  Work activities: {}", report.unique_work_activities);
    eprintln!("  IWAs: {}", report.unique_iwas);
    eprintln!("  DWAs: {}", report.unique_dwas);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_node_joins_occupation_and_task() {
        assert_eq!(task_node("11-1011.00", "8823"), "11-1011.00#8823");
    }

    #[test]
    fn test_find_table_prefers_text_export() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("DWA Reference.csv"), "").unwrap();
        std::fs::write(tmp.path().join("DWA Reference.txt"), "").unwrap();
        let found = find_table(tmp.path(), DWA_REFERENCE).unwrap();
        assert_eq!(found.extension().unwrap(), "txt");
    }

    #[test]
    fn test_find_table_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let err = find_table(tmp.path(), TASK_STATEMENTS).unwrap_err();
        assert!(err.to_string().contains("Task Statements"));
    }
}
