//! # CLI Module
//!
//! Command-line interface for DupePix.
//!
//! ## Usage
//! ```bash
//! # Scan a directory for duplicates
//! dupepix scan ~/Photos
//!
//! # Save the report as photo_duplicates_<timestamp>.json
//! dupepix scan ~/Photos --save ./reports
//!
//! # Two-step: write a hash list, then classify it later
//! dupepix hash ~/Photos --save ./reports
//! dupepix classify ./reports/photo_hashes_20240101_120000.json --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use dupepix::core::classifier::{classify, ScanReport};
use dupepix::core::hasher::{ContentHasher, FileHasher, PhotoRecord};
use dupepix::core::job::JobStatus;
use dupepix::core::reporter::{self, DUPLICATES_PREFIX, HASHES_PREFIX};
use dupepix::core::scanner::{ScanConfig, WalkDirScanner};
use dupepix::core::JobRegistry;
use dupepix::error::{DupePixError, Result};
use dupepix::events::{EventChannel, ScanEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{error, warn};

/// Events queued before scan workers wait on the notice printer
const EVENT_BUFFER: usize = 256;

/// DupePix - find byte-identical photos
#[derive(Parser, Debug)]
#[command(name = "dupepix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a directory and report duplicate photos
    Scan {
        /// Directory to scan
        root: PathBuf,

        #[command(flatten)]
        walk: WalkArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Also write the report to this directory
        #[arg(long, value_name = "DIR")]
        save: Option<PathBuf>,

        /// Publish progress every N files
        #[arg(long, default_value = "50")]
        progress_interval: usize,

        /// Print every skipped file
        #[arg(short, long)]
        verbose: bool,
    },

    /// Hash every photo under a directory and print the hash list
    Hash {
        /// Directory to scan
        root: PathBuf,

        #[command(flatten)]
        walk: WalkArgs,

        /// Write the hash list to this directory instead of stdout
        #[arg(long, value_name = "DIR")]
        save: Option<PathBuf>,
    },

    /// Build a duplicate report from a saved hash list
    Classify {
        /// JSON hash list produced by `dupepix hash`
        hash_list: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Also write the report to this directory
        #[arg(long, value_name = "DIR")]
        save: Option<PathBuf>,
    },
}

/// Directory walk options shared by `scan` and `hash`
#[derive(Args, Debug)]
struct WalkArgs {
    /// Skip hidden files and directories
    #[arg(long)]
    skip_hidden: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// Maximum directory depth
    #[arg(long)]
    max_depth: Option<usize>,
}

impl From<&WalkArgs> for ScanConfig {
    fn from(args: &WalkArgs) -> Self {
        ScanConfig {
            follow_symlinks: args.follow_symlinks,
            include_hidden: !args.skip_hidden,
            max_depth: args.max_depth,
            extensions: None,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON report for scripting
    Json,
    /// Minimal output (duplicate paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            root,
            walk,
            output,
            save,
            progress_interval,
            verbose,
        } => run_scan(&root, (&walk).into(), output, save, progress_interval, verbose),
        Commands::Hash { root, walk, save } => run_hash(&root, (&walk).into(), save),
        Commands::Classify {
            hash_list,
            output,
            save,
        } => run_classify(&hash_list, output, save),
    }
}

fn run_scan(
    root: &Path,
    scan_config: ScanConfig,
    output: OutputFormat,
    save: Option<PathBuf>,
    progress_interval: usize,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(output, OutputFormat::Pretty);

    if pretty {
        print_header(&term);
    }

    let (sender, receiver) = EventChannel::bounded(EVENT_BUFFER);
    let registry = JobRegistry::builder()
        .scan_config(scan_config)
        .progress_interval(progress_interval)
        .events(sender)
        .build();

    let id = registry.submit_scan(root)?;

    let progress = pretty.then(|| {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        pb
    });

    // Skipped-file notices arrive as events; everything else is polled
    let notices_pb = progress.clone();
    let notices = thread::spawn(move || {
        for event in receiver.iter().filter(|event| event.job_id() == id) {
            if let ScanEvent::FileSkipped { path, message, .. } = event {
                if verbose {
                    let line = format!("  {} {} ({})", style("skipped").yellow(), path.display(), message);
                    match notices_pb {
                        Some(ref pb) => pb.println(line),
                        None => eprintln!("{}", line),
                    }
                }
            }
        }
    });

    loop {
        let status = registry.poll_status(id)?;
        if let Some(ref pb) = progress {
            pb.set_length(status.total as u64);
            pb.set_position(status.processed as u64);
            pb.set_message(status.message.clone());
        }
        if status.status.is_terminal() {
            break;
        }
        thread::sleep(Duration::from_millis(100));
    }

    let snapshot = registry.wait(id)?;
    if let Some(ref pb) = progress {
        pb.finish_and_clear();
    }

    // Registry holds the last sender
    drop(registry);
    notices.join().ok();

    if snapshot.status == JobStatus::Error {
        term.write_line(&format!(
            "{} {}",
            style("✗ Scan failed:").red().bold(),
            snapshot.message
        ))
        .ok();
        std::process::exit(1);
    }

    let report = snapshot
        .report
        .ok_or(DupePixError::NotReady {
            id,
            status: snapshot.status,
        })?;

    if let Some(dir) = save {
        let path = reporter::write_json(report.as_ref(), &dir, DUPLICATES_PREFIX)?;
        if pretty {
            term.write_line(&format!("  Report saved to {}", style(path.display()).cyan()))
                .ok();
        }
    }

    print_report(&term, &report, output, snapshot.skipped);
    Ok(())
}

fn run_hash(root: &Path, scan_config: ScanConfig, save: Option<PathBuf>) -> Result<()> {
    let term = Term::stderr();
    let scanner = WalkDirScanner::new(scan_config);
    let hasher = ContentHasher::new();

    let invalid = |e: dupepix::error::ScanError| DupePixError::InvalidInput {
        path: root.to_path_buf(),
        reason: e.to_string(),
    };
    let candidates = scanner
        .discover(root)
        .map_err(invalid)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(invalid)?;

    let pb = ProgressBar::new(candidates.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} hashing")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let records = hash_candidates(&hasher, &candidates, &pb);
    pb.finish_and_clear();

    match save {
        Some(dir) => {
            let path = reporter::write_json(&records, &dir, HASHES_PREFIX)?;
            term.write_line(&format!(
                "Processed {} files. Data saved to {}",
                style(records.len()).cyan(),
                style(path.display()).cyan()
            ))
            .ok();
        }
        None => println!("{}", to_json(&records)?),
    }

    Ok(())
}

/// Hash each candidate, logging and leaving out files that cannot be read
fn hash_candidates(hasher: &dyn FileHasher, candidates: &[PathBuf], pb: &ProgressBar) -> Vec<PhotoRecord> {
    let mut records = Vec::with_capacity(candidates.len());
    for path in candidates {
        match hasher.hash_file(path) {
            Ok(record) => records.push(record),
            Err(e) => {
                if e.is_expected() {
                    warn!("Skipping {}", e);
                } else {
                    error!("Unexpected error hashing {}", e);
                }
                pb.println(format!("  {} {}", style("skipped").yellow(), e));
            }
        }
        pb.inc(1);
    }
    records
}

fn run_classify(hash_list: &Path, output: OutputFormat, save: Option<PathBuf>) -> Result<()> {
    let term = Term::stderr();
    let records = reporter::read_records(hash_list)?;
    let report = classify(records);

    if let Some(dir) = save {
        let path = reporter::write_json(&report, &dir, DUPLICATES_PREFIX)?;
        term.write_line(&format!("Duplicate report saved to {}", path.display()))
            .ok();
    }

    print_report(&term, &report, output, 0);
    Ok(())
}

fn print_header(term: &Term) {
    term.write_line(&format!(
        "{} {}",
        style("DupePix").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_report(term: &Term, report: &ScanReport, output: OutputFormat, skipped: usize) {
    match output {
        OutputFormat::Pretty => print_pretty_report(term, report, skipped),
        OutputFormat::Json => match to_json(report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}", e),
        },
        OutputFormat::Minimal => {
            for duplicate in &report.duplicates {
                println!("{}", duplicate.record.path.display());
            }
        }
    }
}

fn print_pretty_report(term: &Term, report: &ScanReport, skipped: usize) {
    let summary = &report.summary;

    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} photos processed",
        style(summary.total_files_processed).cyan()
    ))
    .ok();
    if skipped > 0 {
        term.write_line(&format!("  {} files skipped", style(skipped).yellow()))
            .ok();
    }
    term.write_line(&format!(
        "  {} unique photos",
        style(summary.unique_content_count).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate photos",
        style(summary.duplicate_count).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} in duplicate groups, {} reclaimable",
        style(format_bytes(summary.total_storage_consumed_bytes)).yellow(),
        style(format_bytes(summary.reclaimable_bytes)).yellow()
    ))
    .ok();
    term.write_line("").ok();

    if report.duplicates.is_empty() {
        term.write_line(&format!("  {}", style("No duplicates found").green()))
            .ok();
        return;
    }

    term.write_line(&format!("{}", style("Duplicates:").bold().underlined()))
        .ok();

    let mut seen = HashSet::new();
    let originals: Vec<&Path> = report
        .duplicates
        .iter()
        .map(|d| d.original_path.as_path())
        .filter(|original| seen.insert(*original))
        .collect();

    for original in originals {
        term.write_line("").ok();
        term.write_line(&format!("  {} {}", style("★").green(), original.display()))
            .ok();
        for duplicate in report.duplicates_of(original) {
            term.write_line(&format!(
                "    {} {} ({})",
                style("○").dim(),
                duplicate.record.path.display(),
                format_bytes(duplicate.record.size)
            ))
            .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "{}",
        style("No files were deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| DupePixError::Serialization {
        path: PathBuf::from("<stdout>"),
        source,
    })
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
