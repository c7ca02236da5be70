use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use supervisor_allocation::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::allocation::config_reader::*;
use crate::allocation::io_common::RawTable;
use crate::args::Args;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_output;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum AllocError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The spreadsheet {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Line {lineno}: cannot read cell {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the input"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("The input has no header row"))]
    EmptyInput {},
    #[snafu(display("Missing required column {column}: the header is {found:?}"))]
    MissingColumn { column: String, found: Vec<String> },
    #[snafu(display("Line {lineno}: expected {expected} cells, found {found}"))]
    WrongRowLength {
        lineno: usize,
        expected: usize,
        found: usize,
    },
    #[snafu(display("Line {lineno}: cannot read the score {content:?}"))]
    ParsingScore { lineno: usize, content: String },
    #[snafu(display("Line {lineno}, column {column}: cannot read the rank {content:?}"))]
    ParsingRank {
        lineno: usize,
        column: String,
        content: String,
    },
    #[snafu(display("Invalid input: {source}"))]
    Allocation { source: AllocationErrors },
    #[snafu(display("Error reading file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the configuration"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("No input file: use --input or set inputSource.filePath in the configuration"))]
    MissingInput {},
    #[snafu(display("Error formatting the summary"))]
    RenderingSummary { source: serde_json::Error },
    #[snafu(display("Error formatting a table"))]
    RenderingCsv { source: csv::Error },
    #[snafu(display("Error formatting a table"))]
    RenderingIo { source: std::io::Error },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading the reference file {path}"))]
    OpeningReference {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between {path} and the reference"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AllocResult<T> = Result<T, AllocError>;

/// Where the tables go.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum OutputTarget {
    Stdout,
    Directory(PathBuf),
}

/// All the settings of one run, after merging the command line and the configuration file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AllocationJob {
    pub input_path: String,
    pub provider: String,
    pub excel_worksheet_name: Option<String>,
    pub output: OutputTarget,
    pub preference_count_file: String,
    pub score_wise_file: String,
    pub roll_wise_file: String,
    pub generate_summary_json: bool,
    pub rules: AllocationRules,
    pub reference_dir: Option<String>,
}

const DEFAULT_OUTPUT_DIRECTORY: &str = "Output";
const PREFERENCE_COUNT_FILE: &str = "faculty_preference_count.csv";
const SCORE_WISE_FILE: &str = "cgpa_wise_student_allocation.csv";
const ROLL_WISE_FILE: &str = "roll_wise_student_allocation.csv";
const SUMMARY_FILE: &str = "allocation_summary.json";

fn round_stats_to_json(res: &AllocationResult) -> Vec<JSValue> {
    res.round_stats
        .iter()
        .map(|rs| {
            let assignments: Vec<JSValue> = rs
                .assignments
                .iter()
                .map(|(roll, supervisor)| json!({"roll": roll, "supervisor": supervisor}))
                .collect();
            json!({
                "round": rs.round,
                "assignments": assignments,
                "unassigned": rs.unassigned,
            })
        })
        .collect()
}

fn build_summary_js(job: &AllocationJob, res: &AllocationResult) -> JSValue {
    let supervisors: Vec<JSValue> = res
        .supervisors
        .iter()
        .map(|s| json!({"name": s.name, "capacity": s.capacity, "assigned": s.assigned}))
        .collect();
    json!({
        "config": {
            "input": io_common::simplify_file_name(&job.input_path),
            "students": res.by_score.len(),
        },
        "supervisors": supervisors,
        "results": round_stats_to_json(res),
        "unassigned": res.unassigned(),
    })
}

fn resolve_path(root: &Path, p: &str) -> String {
    root.join(p).display().to_string()
}

/// Merges the command line arguments with the configuration file, if any.
///
/// Paths from the command line are taken as they are. Paths from the configuration file are
/// relative to the directory of the configuration file.
pub fn resolve_job(args: &Args) -> AllocResult<AllocationJob> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            let root = Path::new(config_path)
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root)
        }
        None => (AllocConfig::default(), PathBuf::new()),
    };

    let input_path = match (&args.input, &config.input_source.file_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => resolve_path(&root, p),
        (None, None) => return MissingInputSnafu {}.fail(),
    };

    let provider = args
        .input_type
        .clone()
        .or_else(|| config.input_source.provider.clone())
        .unwrap_or_else(|| {
            if input_path.to_lowercase().ends_with(".xlsx") {
                "xlsx".to_string()
            } else {
                "csv".to_string()
            }
        });

    let output = match (&args.out, &config.output_settings.output_directory) {
        (Some(o), _) if o == "stdout" => OutputTarget::Stdout,
        (Some(o), _) => OutputTarget::Directory(PathBuf::from(o)),
        (None, Some(o)) => OutputTarget::Directory(root.join(o)),
        (None, None) => OutputTarget::Directory(PathBuf::from(DEFAULT_OUTPUT_DIRECTORY)),
    };

    let os = &config.output_settings;
    Ok(AllocationJob {
        input_path,
        provider,
        excel_worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or_else(|| config.input_source.excel_worksheet_name.clone()),
        output,
        preference_count_file: os
            .preference_count_file
            .clone()
            .unwrap_or_else(|| PREFERENCE_COUNT_FILE.to_string()),
        score_wise_file: os
            .score_wise_file
            .clone()
            .unwrap_or_else(|| SCORE_WISE_FILE.to_string()),
        roll_wise_file: os
            .roll_wise_file
            .clone()
            .unwrap_or_else(|| ROLL_WISE_FILE.to_string()),
        generate_summary_json: os.generate_summary_json.unwrap_or(true),
        rules: config.rules.allocation_rules()?,
        reference_dir: args.reference.clone(),
    })
}

fn read_input_table(job: &AllocationJob) -> AllocResult<RawTable> {
    info!("Attempting to read input file {:?}", job.input_path);
    match job.provider.as_str() {
        "csv" => io_csv::read_csv_table(&job.input_path),
        "xlsx" => io_xlsx::read_xlsx_table(&job.input_path, job.excel_worksheet_name.as_deref()),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn write_outputs(
    job: &AllocationJob,
    tables: &[(String, String)],
    summary: &JSValue,
) -> AllocResult<()> {
    match &job.output {
        OutputTarget::Stdout => {
            for (name, content) in tables.iter() {
                println!("{}:", name);
                print!("{}", content);
                println!();
            }
        }
        OutputTarget::Directory(dir) => {
            let dir_s = dir.display().to_string();
            fs::create_dir_all(dir).context(WritingFileSnafu { path: dir_s })?;
            for (name, content) in tables.iter() {
                let p = dir.join(name).display().to_string();
                fs::write(&p, content).context(WritingFileSnafu { path: p.clone() })?;
                info!("Wrote {}", p);
            }
            if job.generate_summary_json {
                let p = dir.join(SUMMARY_FILE).display().to_string();
                let pretty_js =
                    serde_json::to_string_pretty(summary).context(RenderingSummarySnafu {})?;
                fs::write(&p, pretty_js).context(WritingFileSnafu { path: p.clone() })?;
                info!("Wrote {}", p);
            }
        }
    }
    Ok(())
}

fn check_reference(reference_dir: &str, tables: &[(String, String)]) -> AllocResult<()> {
    for (name, content) in tables.iter() {
        let p: PathBuf = [reference_dir, name.as_str()].iter().collect();
        let ref_path = p.display().to_string();
        let reference =
            fs::read_to_string(&ref_path).context(OpeningReferenceSnafu { path: ref_path.clone() })?;
        // Only the line endings may differ.
        let reference = reference.replace("\r\n", "\n");
        let generated = content.replace("\r\n", "\n");
        if reference != generated {
            warn!("Found differences with the reference file {}", ref_path);
            print_diff(reference.as_str(), generated.as_str(), "\n");
            return ReferenceMismatchSnafu { path: ref_path }.fail();
        }
        debug!("check_reference: {} matches", ref_path);
    }
    Ok(())
}

/// Reads the input, runs the allocation and writes the tables.
pub fn run_job(job: &AllocationJob) -> AllocResult<AllocationResult> {
    let table = read_input_table(job)?;
    info!(
        "Read {} rows and {} columns",
        table.rows.len(),
        table.header.len()
    );
    let (supervisors, students) = io_common::parse_students(&table)?;

    let result = run_allocation(&students, &supervisors, &job.rules).context(AllocationSnafu {})?;

    let unassigned = result.unassigned();
    if !unassigned.is_empty() {
        warn!(
            "{} students could not be allocated: {:?}",
            unassigned.len(),
            unassigned
        );
    }

    let tables: Vec<(String, String)> = vec![
        (
            job.preference_count_file.clone(),
            io_output::render_csv(&io_output::preference_count_table(&result))?,
        ),
        (
            job.score_wise_file.clone(),
            io_output::render_csv(&io_output::score_wise_table(&table, &result))?,
        ),
        (
            job.roll_wise_file.clone(),
            io_output::render_csv(&io_output::roll_wise_table(&table, &result))?,
        ),
    ];

    let summary = build_summary_js(job, &result);
    debug!("summary: {}", summary);
    write_outputs(job, &tables, &summary)?;

    if let Some(reference_dir) = &job.reference_dir {
        check_reference(reference_dir, &tables)?;
        info!("All the tables match the reference in {}", reference_dir);
    }

    info!("Allocation complete.");
    Ok(result)
}

pub fn run_allocation_cmd(args: &Args) -> AllocResult<()> {
    let job = resolve_job(args)?;
    debug!("job: {:?}", job);
    run_job(&job)?;
    Ok(())
}

#[cfg(test)]
fn test_data_dir() -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "tests", "data"].iter().collect()
}

#[cfg(test)]
fn run_allocation_test(test_name: &str, config_lpath: &str, reference_lpath: &str) -> AllocResult<AllocationResult> {
    let _ = env_logger::builder().is_test(true).try_init();
    let test_dir = test_data_dir().join(test_name);
    let out_dir = std::env::temp_dir().join(format!("supalloc-{}-{}", test_name, reference_lpath));
    info!("Running test {}", test_name);
    let args = Args {
        config: Some(test_dir.join(config_lpath).display().to_string()),
        reference: Some(test_dir.join(reference_lpath).display().to_string()),
        out: Some(out_dir.display().to_string()),
        ..Args::default()
    };
    let job = resolve_job(&args)?;
    run_job(&job)
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) -> AllocationResult {
    let res = run_allocation_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        "expected",
    );
    match res {
        Ok(r) => r,
        Err(e) => panic!("test {} failed: {}", test_name, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with_input(input: &str) -> Args {
        Args {
            input: Some(input.to_string()),
            ..Args::default()
        }
    }

    #[test]
    fn two_rounds_of_two() {
        let res = test_wrapper("two_rounds_of_two");
        assert_eq!(res.round_stats.len(), 2);
        let allocated: Vec<(String, Option<String>)> = res
            .by_roll
            .iter()
            .map(|s| (s.roll.clone(), s.supervisor.clone()))
            .collect();
        assert_eq!(
            allocated,
            vec![
                ("S1".to_string(), Some("F1".to_string())),
                ("S2".to_string(), Some("F2".to_string())),
                ("S3".to_string(), Some("F2".to_string())),
                ("S4".to_string(), Some("F1".to_string())),
            ]
        );
    }

    #[test]
    fn cse_batch() {
        let res = test_wrapper("cse_batch");
        assert!(res.unassigned().is_empty());
        assert_eq!(res.supervisors.len(), 3);
    }

    #[test]
    fn duplicate_ranks_with_column_order() {
        test_wrapper("duplicate_ranks_with_column_order");
    }

    #[test]
    fn rank_out_of_range() {
        let dir = test_data_dir().join("rank_out_of_range");
        let args = args_with_input(&dir.join("input.csv").display().to_string());
        let job = resolve_job(&args).unwrap();
        let err = run_job(&job).unwrap_err();
        assert!(matches!(
            err,
            AllocError::Allocation {
                source: AllocationErrors::RankOutOfRange { row: 2, rank: 4, .. }
            }
        ));
    }

    #[test]
    fn missing_columns() {
        let dir = test_data_dir().join("missing_columns");
        let args = args_with_input(&dir.join("input.csv").display().to_string());
        let job = resolve_job(&args).unwrap();
        let err = run_job(&job).unwrap_err();
        match err {
            AllocError::MissingColumn { column, found } => {
                assert_eq!(column, "CGPA");
                assert_eq!(found.len(), 3);
            }
            x => panic!("unexpected error {:?}", x),
        }
    }

    #[test]
    fn no_supervisor_columns() {
        let dir = test_data_dir().join("no_supervisors");
        let args = args_with_input(&dir.join("input.csv").display().to_string());
        let job = resolve_job(&args).unwrap();
        let err = run_job(&job).unwrap_err();
        assert!(matches!(
            err,
            AllocError::Allocation {
                source: AllocationErrors::NoSupervisors
            }
        ));
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let res = run_allocation_test(
            "two_rounds_of_two",
            "two_rounds_of_two_config.json",
            "wrong_reference",
        );
        assert!(matches!(res, Err(AllocError::ReferenceMismatch { .. })));
    }

    #[test]
    fn command_line_overrides_config() {
        let dir = test_data_dir().join("two_rounds_of_two");
        let args = Args {
            config: Some(
                dir.join("two_rounds_of_two_config.json")
                    .display()
                    .to_string(),
            ),
            out: Some("stdout".to_string()),
            input_type: Some("xlsx".to_string()),
            ..Args::default()
        };
        let job = resolve_job(&args).unwrap();
        assert_eq!(job.output, OutputTarget::Stdout);
        assert_eq!(job.provider, "xlsx");
        assert_eq!(job.input_path, dir.join("input.csv").display().to_string());
        assert_eq!(job.rules, AllocationRules::DEFAULT_RULES);
    }

    #[test]
    fn defaults_without_config() {
        let job = resolve_job(&args_with_input("students.XLSX")).unwrap();
        assert_eq!(job.provider, "xlsx");
        assert_eq!(job.output, OutputTarget::Directory(PathBuf::from("Output")));
        assert_eq!(job.score_wise_file, "cgpa_wise_student_allocation.csv");
        assert!(job.generate_summary_json);

        let job = resolve_job(&args_with_input("students.csv")).unwrap();
        assert_eq!(job.provider, "csv");
    }

    #[test]
    fn summary_errors_are_not_configuration_errors() {
        let source = serde_json::from_str::<JSValue>("{").unwrap_err();
        let err = AllocError::RenderingSummary { source };
        assert_eq!(err.to_string(), "Error formatting the summary");
    }

    #[test]
    fn input_is_required() {
        let res = resolve_job(&Args::default());
        assert!(matches!(res, Err(AllocError::MissingInput {})));
    }

    #[test]
    fn unknown_provider() {
        let args = Args {
            input: Some("students.ods".to_string()),
            input_type: Some("ods".to_string()),
            ..Args::default()
        };
        let job = resolve_job(&args).unwrap();
        assert!(matches!(run_job(&job), Err(AllocError::Whatever { .. })));
    }
}
