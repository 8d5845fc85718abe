use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{eda::PlotKind, hypothesis::TestKind};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Explore CSV datasets with descriptive statistics, hypothesis tests, charts and regression",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Infer column types and print basic statistics for every column
    Profile(ProfileArgs),
    /// Count the distinct values of one column
    Frequency(FrequencyArgs),
    /// Run a hypothesis test and print its summary
    Test(TestArgs),
    /// Emit a chart configuration (histogram, bar, scatter, boxplot) as JSON
    Plot(PlotArgs),
    /// Fit a simple linear regression of one numeric column on another
    Regress(RegressArgs),
    /// List the available tests and, given an input, the columns eligible for each
    Tests(TestsArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file (`-` reads stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Print the profile as JSON instead of a table
    #[arg(long)]
    pub json: bool,
    /// Also print the dataset overview used as narrative context
    #[arg(long)]
    pub overview: bool,
}

#[derive(Debug, Args)]
pub struct FrequencyArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Column to count
    #[arg(short = 'c', long = "column")]
    pub column: String,
    /// Show only the N most frequent values (0 shows all)
    #[arg(long, default_value_t = 0)]
    pub top: usize,
}

#[derive(Debug, Args)]
pub struct TestArgs {
    /// Test identifier, e.g. `independent-t-test` (see `tests`)
    pub kind: TestKind,
    #[command(flatten)]
    pub source: InputArgs,
    /// First variable
    #[arg(long = "var1")]
    pub var1: String,
    /// Second variable (grouping column or paired column, depending on the test)
    #[arg(long = "var2")]
    pub var2: Option<String>,
    /// Hypothesized population mean for the one-sample t-test
    #[arg(long = "mean", allow_negative_numbers = true)]
    pub mean: Option<f64>,
    /// Expected proportion for goodness-of-fit, repeatable: `--proportion A=0.25`
    #[arg(long = "proportion", value_parser = parse_proportion, action = clap::ArgAction::Append)]
    pub proportions: Vec<(String, f64)>,
    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
    /// Print the analysis log (narrative context) after the summary
    #[arg(long = "show-log")]
    pub show_log: bool,
}

#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Chart type: histogram, bar, scatter or boxplot
    pub kind: PlotKind,
    #[command(flatten)]
    pub source: InputArgs,
    /// Variable to plot (x axis for scatter plots)
    #[arg(long = "var1")]
    pub var1: String,
    /// Y variable for scatter plots
    #[arg(long = "var2")]
    pub var2: Option<String>,
    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Args)]
pub struct RegressArgs {
    #[command(flatten)]
    pub source: InputArgs,
    /// Independent variable (X)
    #[arg(short = 'x', long = "predictor")]
    pub predictor: String,
    /// Dependent variable (Y)
    #[arg(short = 'y', long = "response")]
    pub response: String,
    /// Print the full result, including residuals and line points, as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct TestsArgs {
    /// Optional CSV file used to list eligible columns per variable slot
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_proportion(value: &str) -> Result<(String, f64), String> {
    let (category, proportion) = value
        .rsplit_once('=')
        .ok_or_else(|| format!("Expected CATEGORY=PROPORTION, got '{value}'"))?;
    let category = category.trim();
    if category.is_empty() {
        return Err("Category name cannot be empty".to_string());
    }
    let proportion = proportion
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("Invalid proportion '{proportion}': {err}"))?;
    Ok((category.to_string(), proportion))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportions_parse_category_and_value() {
        assert_eq!(parse_proportion("A=0.25").unwrap(), ("A".to_string(), 0.25));
        assert_eq!(
            parse_proportion(" x=y = 0.5 ").unwrap(),
            ("x=y".to_string(), 0.5)
        );
        assert!(parse_proportion("A").is_err());
        assert!(parse_proportion("=0.5").is_err());
        assert!(parse_proportion("A=half").is_err());
    }

    #[test]
    fn test_command_accepts_repeated_proportions() {
        let cli = Cli::try_parse_from([
            "csv-analyst",
            "test",
            "chi-squared-gof",
            "-i",
            "data.csv",
            "--var1",
            "colour",
            "--proportion",
            "red=0.5",
            "--proportion",
            "blue=0.5",
        ])
        .unwrap();
        let Commands::Test(args) = cli.command else {
            panic!("expected test command");
        };
        assert_eq!(args.kind, TestKind::ChiSquaredGof);
        assert_eq!(args.proportions.len(), 2);
        assert_eq!(args.var2, None);
    }

    #[test]
    fn unknown_test_kind_is_rejected() {
        let parsed = Cli::try_parse_from(["csv-analyst", "test", "t-test", "-i", "a.csv", "--var1", "x"]);
        assert!(parsed.is_err());
    }
}
