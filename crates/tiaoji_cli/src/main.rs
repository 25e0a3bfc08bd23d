//! Command-line front end for the admissions-transfer school store.
//!
//! # Responsibility
//! - Map subcommands onto `tiaoji_core` session operations.
//! - Render records, pages, statistics and chart series as plain text.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tiaoji_core::config::RANKING_LIMIT;
use tiaoji_core::table::csv_io::{read_csv_path, write_csv, write_template_csv};
use tiaoji_core::{
    compare_schools, core_version, init_logging, recruitment_ranking, score_trend_series,
    Contact, JsonFileStore, NewSchool, OverflowPolicy, PageRequest, RecruitmentCount, School,
    SchoolService, ScoreRange, ScoreYear, Session, SortKey, StoreConfig, ViewQuery,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "tiaoji", version, about = "Admissions-transfer school record store")]
struct Args {
    /// Data directory holding schools.json (overrides TIAOJI_DATA_DIR)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides TIAOJI_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the data directory and an empty collection
    Init,
    /// Add one school
    Add(AddArgs),
    /// List schools with filter, sort and pagination
    List(ListArgs),
    /// Show every field of one school
    Show { id: u64 },
    /// Delete one school by id
    Delete { id: u64 },
    /// Delete several schools by id
    DeleteBatch {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Delete schools whose 2024 line is below a threshold
    DeleteBelow {
        /// Delete when the 2024 minimum score is below this (0 = ignore)
        #[arg(long, default_value_t = 0)]
        min_below: i32,
        /// Delete when the 2024 maximum score is below this (0 = ignore)
        #[arg(long, default_value_t = 0)]
        max_below: i32,
    },
    /// Delete every school
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Preview a CSV import; pass --commit to persist it
    Import {
        path: PathBuf,
        #[arg(long)]
        commit: bool,
    },
    /// Write the two-row import template as CSV
    Template {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Export every school as CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Recruitment totals and extremes
    Stats,
    /// Score lines of one school from 2021 to 2024
    Trend { id: u64 },
    /// One year's score lines for up to five schools
    Compare {
        #[arg(required = true)]
        ids: Vec<u64>,
        #[arg(long, default_value = "2024")]
        year: String,
    },
    /// Schools ranked by recruitment count
    Ranking {
        #[arg(long, default_value_t = RANKING_LIMIT)]
        limit: usize,
    },
}

#[derive(clap::Args)]
struct AddArgs {
    name: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long, default_value = "")]
    major: String,
    /// Exact headcount or a range such as 2-4
    #[arg(long, default_value = "0")]
    recruitment: String,
    /// Score line as YEAR=MAX:MIN, repeatable (e.g. 2024=380:350)
    #[arg(long = "score")]
    scores: Vec<String>,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long)]
    remark: Option<String>,
}

#[derive(clap::Args)]
struct ListArgs {
    /// Case-insensitive school name substring
    #[arg(long)]
    name: Option<String>,
    /// Minimum 2024 lowest score (0 = no filter)
    #[arg(long, default_value_t = 0)]
    min_score: i32,
    #[arg(long, value_enum, default_value_t = SortArg::NameAsc)]
    sort: SortArg,
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Page size (defaults to TIAOJI_PAGE_SIZE or 6)
    #[arg(long)]
    page_size: Option<usize>,
    /// Jump to page 1 instead of the last page when --page is out of range
    #[arg(long)]
    reset_overflow: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    NameAsc,
    NameDesc,
    MaxDesc,
    MinDesc,
}

impl From<SortArg> for SortKey {
    fn from(value: SortArg) -> Self {
        match value {
            SortArg::NameAsc => SortKey::NameAsc,
            SortArg::NameDesc => SortKey::NameDesc,
            SortArg::MaxDesc => SortKey::Max2024Desc,
            SortArg::MinDesc => SortKey::Min2024Desc,
        }
    }
}

fn main() -> CliResult<()> {
    let args = Args::parse();

    let mut config = StoreConfig::from_env()?;
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    let level = args
        .log_level
        .unwrap_or_else(|| config.log_level.to_string());
    init_logging(&level, config.log_dir()?)?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let store = JsonFileStore::in_dir(&config.data_dir);
    if let Command::Init = args.command {
        store.ensure_initialized()?;
        println!("initialized {}", store.path().display());
        return Ok(());
    }

    let mut session = Session::open(SchoolService::new(store), config.snapshot_ttl)?;
    match args.command {
        Command::Init => {}
        Command::Add(add) => {
            let school = session.add_school(new_school(add)?)?;
            println!("added #{} {}", school.id, school.name);
        }
        Command::List(list) => {
            let page_size = list.page_size.unwrap_or(config.page_size);
            let overflow = if list.reset_overflow {
                OverflowPolicy::ResetToFirst
            } else {
                OverflowPolicy::ClampToLast
            };
            let query = ViewQuery {
                name_substring: list.name,
                min_score_2024: list.min_score,
                sort: list.sort.into(),
                page: PageRequest::new(list.page, page_size).with_overflow(overflow),
            };
            let page = session.view(&query);
            for school in &page.items {
                print_summary(school);
            }
            println!(
                "page {}/{} ({} schools)",
                page.current_page, page.total_pages, page.total_items
            );
        }
        Command::Show { id } => match session.collection().get(id) {
            Some(school) => print_detail(school),
            None => return Err(format!("school not found: {id}").into()),
        },
        Command::Delete { id } => {
            if session.delete_one(id)? {
                println!("deleted #{id}");
            } else {
                println!("no school with id {id}");
            }
        }
        Command::DeleteBatch { ids } => {
            let removed = session.delete_batch(ids)?;
            println!("deleted {removed} school(s)");
        }
        Command::DeleteBelow {
            min_below,
            max_below,
        } => {
            let removed = session.delete_below_thresholds(min_below, max_below)?;
            println!("deleted {removed} school(s)");
        }
        Command::Clear { yes } => {
            if !yes {
                return Err("refusing to delete every school without --yes".into());
            }
            let removed = session.records().len();
            session.delete_all()?;
            println!("deleted {removed} school(s)");
        }
        Command::Import { path, commit } => {
            let table = read_csv_path(&path)?;
            let preview = session.prepare_import(&table)?;
            for school in &preview.records {
                print_summary(school);
            }
            println!("{}", preview.message);
            if commit {
                let added = session.commit_import(preview.records)?;
                println!("imported {added} school(s)");
            } else {
                println!("preview only; rerun with --commit to save");
            }
        }
        Command::Template { output } => match output {
            Some(path) => write_template_csv(File::create(path)?)?,
            None => write_template_csv(io::stdout().lock())?,
        },
        Command::Export { output } => match output {
            Some(path) => write_csv(File::create(path)?, session.records())?,
            None => write_csv(io::stdout().lock(), session.records())?,
        },
        Command::Stats => match session.stats() {
            Some(stats) => {
                println!("total: {}", stats.total);
                println!("average: {:.1}", stats.average);
                println!("max: {}", stats.max_display);
                println!("min: {}", stats.min_display);
            }
            None => println!("no schools"),
        },
        Command::Trend { id } => {
            let school = session
                .collection()
                .get(id)
                .ok_or_else(|| format!("school not found: {id}"))?;
            println!("{}", school.display_label());
            for point in score_trend_series(school) {
                println!("{}  max {:>4}  min {:>4}", point.year, point.max, point.min);
            }
        }
        Command::Compare { ids, year } => {
            let year = ScoreYear::parse(&year).ok_or_else(|| format!("unknown year: {year}"))?;
            for row in compare_schools(session.records(), &ids, year)? {
                println!("#{:<4} {}  max {:>4}  min {:>4}", row.id, row.label, row.max, row.min);
            }
        }
        Command::Ranking { limit } => {
            for (rank, entry) in recruitment_ranking(session.records(), limit)
                .iter()
                .enumerate()
            {
                println!("{:>2}. {}  {}", rank + 1, entry.label, entry.original);
            }
        }
    }
    Ok(())
}

fn new_school(add: AddArgs) -> CliResult<NewSchool> {
    let mut scores = BTreeMap::new();
    for spec in &add.scores {
        let (year, range) = parse_score_arg(spec)?;
        scores.insert(year, range);
    }
    Ok(NewSchool {
        name: add.name,
        address: add.address,
        major: add.major,
        recruitment_count: RecruitmentCount::parse_lenient(&add.recruitment),
        scores,
        contact: Contact {
            email: add.email,
            phone: add.phone,
        },
        remark: add.remark,
    })
}

/// Parses `YEAR=MAX:MIN`.
fn parse_score_arg(spec: &str) -> CliResult<(ScoreYear, ScoreRange)> {
    let invalid = || format!("invalid --score `{spec}`, expected YEAR=MAX:MIN");
    let (year, range) = spec.split_once('=').ok_or_else(invalid)?;
    let (max, min) = range.split_once(':').ok_or_else(invalid)?;
    let year = ScoreYear::parse(year).ok_or_else(invalid)?;
    let max = max.trim().parse::<i32>().map_err(|_| invalid())?;
    let min = min.trim().parse::<i32>().map_err(|_| invalid())?;
    Ok((year, ScoreRange::new(max, min)))
}

fn print_summary(school: &School) {
    let line = school.scores.get(ScoreYear::Y2024);
    println!(
        "#{:<4} {}  [{}]  2024 {}-{}",
        school.id,
        school.display_label(),
        school.recruitment_count.display_label(),
        line.min,
        line.max
    );
}

fn print_detail(school: &School) {
    println!("id: {}", school.id);
    println!("name: {}", school.name);
    println!("address: {}", school.address);
    println!("major: {}", school.major);
    println!("recruitment: {}", school.recruitment_count.display_label());
    for year in ScoreYear::ALL.iter().rev() {
        let range = school.scores.get(*year);
        println!("{year}: max {} min {}", range.max, range.min);
    }
    println!("email: {}", school.contact.email);
    println!("phone: {}", school.contact.phone);
    if let Some(remark) = &school.remark {
        println!("remark: {remark}");
    }
    println!("created_at: {}", school.created_at);
}
