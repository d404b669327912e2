//! Normality analysis command
//!
//! Reads numbers from a file or stdin, runs every diagnostic and prints a
//! text report (or the full result as JSON).

use std::{io::Write, path::PathBuf};

use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use normcheck_stats::{
    analysis::{
        AnalysisOptions, AnalysisResult, MAX_SAMPLE_SIZE, RECOMMENDED_MIN_SAMPLE_SIZE, analyze,
    },
    anderson_darling::SignificanceLevel,
    descriptive::VarianceMode,
    divergence::KlDivergence,
    histogram::BinCount,
    interpret::{KlThresholds, ThresholdPreset},
    sample::{Sample, extract_numbers},
};

use crate::util::{self, Output};

const GAUGE_WIDTH: usize = 40;

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Input file with numbers separated by whitespace or commas (stdin if omitted)
    input: Option<PathBuf>,

    /// How to choose the number of histogram bins
    #[arg(long, value_enum, default_value_t = BinStrategy::Adaptive)]
    bins: BinStrategy,

    /// Number of bins used with `--bins fixed`
    #[arg(long, default_value_t = 20)]
    fixed_bins: usize,

    /// Variance normalization used to fit the normal model
    #[arg(long, value_enum, default_value_t = VarianceArg::Sample)]
    variance: VarianceArg,

    /// Maximum number of Q-Q points
    #[arg(long, default_value_t = 1000)]
    qq_max_points: usize,

    /// KL interpretation thresholds
    #[arg(long, value_enum, default_value_t = ThresholdArg::Standard)]
    thresholds: ThresholdArg,

    /// Significance level of the Anderson-Darling test, in percent
    #[arg(long, value_enum, default_value_t = SignificanceArg::Five)]
    significance: SignificanceArg,

    /// Refuse samples with fewer data points
    #[arg(long, default_value_t = RECOMMENDED_MIN_SAMPLE_SIZE)]
    min_points: usize,

    /// Tests to include in the report (all if omitted)
    #[arg(long = "test", value_enum)]
    tests: Vec<TestKind>,

    /// Write the full result as JSON
    #[arg(long)]
    json: bool,

    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BinStrategy {
    /// Always `--fixed-bins` bins
    Fixed,
    /// ceil(sqrt(n)) clamped to 20..=50
    Adaptive,
    /// ceil(sqrt(n)), at most 50
    #[value(name = "sqrt")]
    SquareRoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum VarianceArg {
    Population,
    Sample,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThresholdArg {
    /// 0.1 / 0.3 / 0.7
    Standard,
    /// 0.1 / 0.5 / 1.0 / 1.2
    Gauge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SignificanceArg {
    #[value(name = "15")]
    Fifteen,
    #[value(name = "10")]
    Ten,
    #[value(name = "5")]
    Five,
    #[value(name = "2.5")]
    TwoPointFive,
    #[value(name = "1")]
    One,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TestKind {
    /// Kullback-Leibler divergence
    Kl,
    /// Anderson-Darling
    Ad,
    /// Q-Q plot summary
    Qq,
}

impl AnalyzeArg {
    fn options(&self) -> AnalysisOptions {
        let bin_count = match self.bins {
            BinStrategy::Fixed => BinCount::Fixed(self.fixed_bins),
            BinStrategy::Adaptive => BinCount::default(),
            BinStrategy::SquareRoot => BinCount::SquareRoot { max: 50 },
        };
        let variance_mode = match self.variance {
            VarianceArg::Population => VarianceMode::Population,
            VarianceArg::Sample => VarianceMode::Sample,
        };
        let preset = match self.thresholds {
            ThresholdArg::Standard => ThresholdPreset::Standard,
            ThresholdArg::Gauge => ThresholdPreset::Gauge,
        };
        let significance_level = match self.significance {
            SignificanceArg::Fifteen => SignificanceLevel::FifteenPercent,
            SignificanceArg::Ten => SignificanceLevel::TenPercent,
            SignificanceArg::Five => SignificanceLevel::FivePercent,
            SignificanceArg::TwoPointFive => SignificanceLevel::TwoPointFivePercent,
            SignificanceArg::One => SignificanceLevel::OnePercent,
        };
        AnalysisOptions {
            bin_count,
            variance_mode,
            qq_max_points: self.qq_max_points,
            kl_thresholds: preset.thresholds(),
            significance_level,
            min_sample_size: self.min_points,
            ..AnalysisOptions::default()
        }
    }

    fn includes(&self, test: TestKind) -> bool {
        self.tests.is_empty() || self.tests.contains(&test)
    }
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let source = arg
        .input
        .as_ref()
        .map_or_else(|| "stdin".to_owned(), |path| path.display().to_string());
    eprintln!("Reading {source}...");
    let text = util::read_input(arg.input.as_deref())?;

    let values = extract_numbers(&text);
    if values.len() > MAX_SAMPLE_SIZE {
        bail!(
            "{source} contains {} values; at most {MAX_SAMPLE_SIZE} are supported",
            values.len()
        );
    }
    let sample =
        Sample::new(values).with_context(|| format!("No usable data found in {source}"))?;

    eprintln!("Analyzing {} values...", sample.len());
    let options = arg.options();
    let result = analyze(&sample, &options)?;

    if arg.json {
        return Output::save_json(&result, arg.output.clone());
    }

    let mut output = Output::from_output_path(arg.output.clone())?;
    write_report(&mut output, arg, &options, &result)
        .with_context(|| format!("Failed to write report to {}", output.display_path()))?;
    output.finish()
}

fn write_report<W>(
    w: &mut W,
    arg: &AnalyzeArg,
    options: &AnalysisOptions,
    result: &AnalysisResult,
) -> std::io::Result<()>
where
    W: Write,
{
    let stats = &result.stats;
    writeln!(w, "Normality Analysis Report")?;
    writeln!(w, "=========================")?;
    writeln!(w)?;
    writeln!(w, "Sample:")?;
    writeln!(w, "  Count:    {}", stats.count)?;
    writeln!(w, "  Mean:     {:.6}", stats.mean)?;
    writeln!(w, "  Median:   {:.6}", stats.median)?;
    writeln!(
        w,
        "  Std dev:  {:.6} ({:?} variance)",
        stats.std_dev, stats.variance_mode
    )?;
    writeln!(w, "  Range:    {:.6} .. {:.6}", stats.min, stats.max)?;
    if stats.count < RECOMMENDED_MIN_SAMPLE_SIZE {
        writeln!(
            w,
            "  Note: fewer than {RECOMMENDED_MIN_SAMPLE_SIZE} data points; results are unreliable"
        )?;
    }
    writeln!(w)?;

    let histogram = &result.histogram;
    if histogram.is_single_point() {
        writeln!(w, "Histogram: every value equals {}", stats.min)?;
    } else {
        writeln!(
            w,
            "Histogram ({} bins, width {:.6}):",
            histogram.bins.len(),
            histogram.bin_width
        )?;
        util::write_histogram(
            w,
            histogram.bins.iter().map(|bin| {
                (
                    format!("{:.3} .. {:.3}", bin.range.start, bin.range.end),
                    bin.count,
                )
            }),
        )?;
    }
    writeln!(w)?;

    if arg.includes(TestKind::Kl) {
        write_kl_section(w, &options.kl_thresholds, result)?;
        writeln!(w)?;
    }
    if arg.includes(TestKind::Ad) {
        write_ad_section(w, result)?;
        writeln!(w)?;
    }
    if arg.includes(TestKind::Qq) {
        writeln!(w, "Q-Q Plot:")?;
        writeln!(w, "  Points:          {}", result.qq_points.len())?;
        if let Some(deviation) = result.max_qq_deviation() {
            writeln!(w, "  Max |deviation|: {deviation:.4}")?;
        }
    }
    Ok(())
}

fn write_kl_section<W>(
    w: &mut W,
    thresholds: &KlThresholds,
    result: &AnalysisResult,
) -> std::io::Result<()>
where
    W: Write,
{
    writeln!(w, "KL Divergence:")?;
    let KlDivergence::Score(score) = result.kl_divergence else {
        writeln!(
            w,
            "  Undefined: the fitted normal has no mass on the data's support"
        )?;
        return Ok(());
    };
    writeln!(w, "  Score:  {score:.4} nats")?;
    if let Some(bucket) = &result.kl_interpretation {
        writeln!(w, "  Level:  {bucket}")?;
        writeln!(w, "  {}", bucket.message)?;
    }
    writeln!(
        w,
        "  Gauge:  [{}] 0 .. {}",
        gauge_bar(thresholds.gauge_position(score)),
        thresholds.gauge_max()
    )?;
    Ok(())
}

fn write_ad_section<W>(w: &mut W, result: &AnalysisResult) -> std::io::Result<()>
where
    W: Write,
{
    let ad = &result.anderson_darling;
    writeln!(w, "Anderson-Darling:")?;
    writeln!(w, "  A²:        {:.4}", ad.statistic)?;
    writeln!(w, "  A*²:       {:.4}", ad.adjusted_statistic())?;
    writeln!(w, "  p-value:   {:.4}", ad.p_value())?;
    writeln!(w, "  {:>6}  {:>8}  result", "level", "critical")?;
    for level in SignificanceLevel::ALL {
        let verdict = if ad.passes(level) { "pass" } else { "reject" };
        let marker = if level == result.significance_level {
            " <"
        } else {
            ""
        };
        writeln!(
            w,
            "  {:>6}  {:>8.3}  {verdict}{marker}",
            level.to_string(),
            level.critical_value()
        )?;
    }
    let conclusion = if result.passes_normality {
        "normality is not rejected"
    } else {
        "normality is rejected"
    };
    writeln!(w, "  At {}: {conclusion}", result.significance_level)?;
    Ok(())
}

#[expect(
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation
)]
fn gauge_bar(position: f64) -> String {
    let filled = ((position * GAUGE_WIDTH as f64).round() as usize).min(GAUGE_WIDTH);
    format!("{}{}", "#".repeat(filled), "-".repeat(GAUGE_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;
    use crate::command::{CommandArgs, Mode};

    fn parse(args: &[&str]) -> AnalyzeArg {
        let argv = ["normcheck", "analyze"].iter().chain(args).copied();
        let args = CommandArgs::try_parse_from(argv).unwrap();
        match args.mode {
            Mode::Analyze(arg) => arg,
            Mode::Generate(_) => unreachable!(),
        }
    }

    #[test]
    fn test_default_options() {
        let arg = parse(&[]);
        let options = arg.options();
        assert_eq!(
            options,
            AnalysisOptions {
                min_sample_size: RECOMMENDED_MIN_SAMPLE_SIZE,
                ..AnalysisOptions::default()
            }
        );
        assert!(arg.includes(TestKind::Kl));
        assert!(arg.includes(TestKind::Qq));
    }

    #[test]
    fn test_flags_map_to_options() {
        let arg = parse(&[
            "--bins",
            "fixed",
            "--fixed-bins",
            "12",
            "--variance",
            "population",
            "--thresholds",
            "gauge",
            "--significance",
            "2.5",
            "--test",
            "ad",
        ]);
        let options = arg.options();
        assert_eq!(options.bin_count, BinCount::Fixed(12));
        assert_eq!(options.variance_mode, VarianceMode::Population);
        assert_eq!(options.kl_thresholds, KlThresholds::gauge());
        assert_eq!(
            options.significance_level,
            SignificanceLevel::TwoPointFivePercent
        );
        assert!(arg.includes(TestKind::Ad));
        assert!(!arg.includes(TestKind::Kl));
    }

    #[test]
    fn test_report_sections() {
        let arg = parse(&["--test", "kl", "--test", "qq"]);
        let options = arg.options();
        let sample = Sample::new((1..=40).map(f64::from).collect()).unwrap();
        let result = analyze(&sample, &options).unwrap();

        let mut buf = Vec::new();
        write_report(&mut buf, &arg, &options, &result).unwrap();
        let report = String::from_utf8(buf).unwrap();
        assert!(report.contains("Count:    40"));
        assert!(report.contains("Histogram (20 bins"));
        assert!(report.contains("KL Divergence:"));
        assert!(report.contains("Q-Q Plot:"));
        assert!(!report.contains("Anderson-Darling:"));
    }

    #[test]
    fn test_degenerate_report() {
        let arg = parse(&["--min-points", "2"]);
        let options = arg.options();
        let sample = Sample::new(vec![5.0; 5]).unwrap();
        let result = analyze(&sample, &options).unwrap();

        let mut buf = Vec::new();
        write_report(&mut buf, &arg, &options, &result).unwrap();
        let report = String::from_utf8(buf).unwrap();
        assert!(report.contains("every value equals 5"));
        assert!(report.contains("Undefined"));
        assert!(report.contains("results are unreliable"));
    }

    #[test]
    fn test_gauge_bar() {
        assert_eq!(gauge_bar(0.0), "-".repeat(GAUGE_WIDTH));
        assert_eq!(gauge_bar(1.0), "#".repeat(GAUGE_WIDTH));
        assert_eq!(gauge_bar(0.5).matches('#').count(), GAUGE_WIDTH / 2);
    }
}
