use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};
use fraud_explore::dataset::DEFAULT_DATASET_PATH;
use fraud_explore::{summarize_csv, DecisionTree, DotOptions};

/// Running without a subcommand prints the dataset summary.
#[derive(Parser)]
#[command(
    name = "explore_data",
    about = "Quick exploratory statistics for the transaction fraud dataset",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    summary: SummaryArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print fraud and distinct-party counts for the transaction CSV
    Summary(SummaryArgs),
    /// Render a fitted decision tree (JSON) to Graphviz DOT
    Tree(TreeArgs),
}

#[derive(clap::Args)]
struct SummaryArgs {
    /// Transaction CSV file
    #[arg(long, env = "FRAUD_CSV", default_value = DEFAULT_DATASET_PATH)]
    input: PathBuf,
    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,
}

#[derive(clap::Args)]
struct TreeArgs {
    /// Tree model exported as JSON
    #[arg(long)]
    model: PathBuf,
    /// Output DOT file
    #[arg(long, default_value = "decision_tree.dot")]
    output: PathBuf,
    /// Draw plain boxes instead of class-coloured nodes
    #[arg(long)]
    no_fill: bool,
    /// Comma-separated feature values to classify with the loaded tree
    #[arg(long, value_delimiter = ',')]
    sample: Option<Vec<f64>>,
}

fn run_summary(args: &SummaryArgs) -> Result<(), Box<dyn std::error::Error>> {
    let delimiter = u8::try_from(args.delimiter).map_err(|_| {
        format!(
            "delimiter must be a single-byte character, got {:?}",
            args.delimiter
        )
    })?;

    // Nothing reaches stdout unless the whole file summarized cleanly.
    let summary = summarize_csv(&args.input, delimiter)?;
    println!("Start analysing");
    println!("{summary}");
    Ok(())
}

fn run_tree(args: &TreeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let tree = DecisionTree::load(&args.model)?;
    let predicted = match &args.sample {
        Some(sample) => Some(tree.predict(sample)?),
        None => None,
    };

    let options = DotOptions {
        filled: !args.no_fill,
        ..DotOptions::default()
    };
    std::fs::write(&args.output, tree.to_dot(&options))?;
    eprintln!(
        "wrote {} nodes to {}",
        tree.node_count(),
        args.output.display()
    );

    if let Some(class) = predicted {
        println!("predicted class: {}", tree.class_names()[class]);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        None => run_summary(&cli.summary),
        Some(Commands::Summary(args)) => run_summary(args),
        Some(Commands::Tree(args)) => run_tree(args),
    };

    if let Err(error) = result {
        eprintln!("error: {error}");
        exit(1);
    }
}
