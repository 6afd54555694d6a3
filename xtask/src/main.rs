use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_CRATE: &str = "crawler_trigger_lambda";
const LAMBDA_BIN: &str = "crawler_trigger";
const LAMBDA_DIST_DIR: &str = "infra/crawler_trigger/dist";
const TESTED_CRATES: [&str; 2] = ["fraud_explore", LAMBDA_CRATE];

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the fraud exploration workspace",
    long_about = "CI checks and Lambda packaging for the fraud exploration workspace.\n\
                  Run the analysis tools directly with `cargo run -p fraud_explore --bin explore_data`."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks
    Ci {
        #[arg(value_enum, default_value_t = CiJob::All)]
        job: CiJob,
    },
    /// Build the crawler trigger and zip it as a Lambda `bootstrap`
    LambdaPackage {
        /// Target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build the debug profile instead of release
        #[arg(long)]
        debug: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CiJob {
    /// rustfmt and clippy
    Lint,
    /// Unit and integration tests
    Test,
    /// Lint then test
    All,
}

/// Runs a tool to completion, exiting with its status code on failure.
fn run(program: &str, args: &[&str]) {
    eprintln!("+ {program} {}", args.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .unwrap_or_else(|error| panic!("failed to launch {program}: {error}"));
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn section(title: &str) {
    eprintln!("\n=== {title} ===");
}

fn ci(job: CiJob) {
    if matches!(job, CiJob::Lint | CiJob::All) {
        section("rustfmt");
        run("cargo", &["fmt", "--all", "--", "--check"]);
        section("clippy");
        run(
            "cargo",
            &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
        );
    }
    if matches!(job, CiJob::Test | CiJob::All) {
        for krate in TESTED_CRATES {
            section(&format!("test {krate}"));
            run("cargo", &["test", "-p", krate]);
        }
    }
    eprintln!("\nCI job passed.");
}

fn target_installed(target: &str) -> Option<bool> {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let listing = String::from_utf8_lossy(&output.stdout);
    Some(listing.lines().any(|line| line.trim() == target))
}

fn lambda_package(target: &str, debug: bool) {
    match target_installed(target) {
        Some(true) => {}
        Some(false) => panic!(
            "rust target `{target}` is missing; add it with `rustup target add {target}`"
        ),
        None => eprintln!("warning: could not query rustup, skipping target check"),
    }

    section("build lambda binary");
    let mut build = vec!["build", "-p", LAMBDA_CRATE, "--bin", LAMBDA_BIN, "--target", target];
    if !debug {
        build.push("--release");
    }
    run("cargo", &build);

    let profile = if debug { "debug" } else { "release" };
    let binary: PathBuf = ["target", target, profile, LAMBDA_BIN].iter().collect();
    let archive = Path::new(LAMBDA_DIST_DIR).join(format!("{LAMBDA_BIN}.zip"));

    section("zip bootstrap");
    write_bootstrap_zip(&binary, &archive);
    eprintln!("\nPackaged artifact:\n- {}", archive.display());
}

fn write_bootstrap_zip(binary: &Path, archive: &Path) {
    let bytes = fs::read(binary)
        .unwrap_or_else(|error| panic!("cannot read {}: {error}", binary.display()));
    if let Some(dir) = archive.parent() {
        fs::create_dir_all(dir).expect("failed to create lambda dist directory");
    }

    let mut zip = ZipWriter::new(fs::File::create(archive).expect("failed to create lambda zip"));
    let entry = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", entry)
        .expect("failed to add bootstrap to lambda zip");
    zip.write_all(&bytes).expect("failed to write bootstrap");
    zip.finish().expect("failed to finish lambda zip");
}

fn main() {
    match Cli::parse().command {
        Commands::Ci { job } => ci(job),
        Commands::LambdaPackage { target, debug } => lambda_package(&target, debug),
    }
}
