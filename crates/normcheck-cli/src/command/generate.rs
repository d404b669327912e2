use std::{io::Write as _, path::PathBuf};

use anyhow::{Context, ensure};
use clap::{Args, ValueEnum};
use rand::{Rng, SeedableRng as _};
use rand_distr::{Distribution, Exp, Normal, Uniform};
use rand_pcg::Pcg64;

use crate::util::Output;

#[derive(Debug, Clone, Args)]
pub(crate) struct GenerateArg {
    /// Number of values to generate
    #[arg(long)]
    count: usize,
    /// Shape of the generated data
    #[arg(long, value_enum, default_value_t = DistributionKind::Normal)]
    distribution: DistributionKind,
    /// Mean of the generated data
    #[arg(long, default_value_t = 0.0)]
    mean: f64,
    /// Standard deviation of the generated data
    #[arg(long, default_value_t = 1.0)]
    std_dev: f64,
    /// Random seed (a fresh one is drawn if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DistributionKind {
    Normal,
    /// Flat over mean ± sqrt(3)·std_dev
    Uniform,
    /// Right-skewed, shifted to the requested mean
    Exponential,
}

pub(crate) fn run(arg: &GenerateArg) -> anyhow::Result<()> {
    let mut rng = match arg.seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_rng(&mut rand::rng()),
    };

    eprintln!(
        "Generating {} {:?} values (mean={}, std_dev={})...",
        arg.count, arg.distribution, arg.mean, arg.std_dev
    );
    let values = generate(arg, &mut rng)?;

    let mut output = Output::from_output_path(arg.output.clone())?;
    for value in &values {
        writeln!(output, "{value}")
            .with_context(|| format!("Failed to write values to {}", output.display_path()))?;
    }
    output.finish()?;
    eprintln!("Wrote {} values to {}", values.len(), output.display_path());

    Ok(())
}

fn generate<R>(arg: &GenerateArg, rng: &mut R) -> anyhow::Result<Vec<f64>>
where
    R: Rng,
{
    let GenerateArg {
        count,
        distribution,
        mean,
        std_dev,
        ..
    } = *arg;
    ensure!(
        mean.is_finite() && std_dev.is_finite() && std_dev > 0.0,
        "mean must be finite and std_dev finite and positive (mean={mean}, std_dev={std_dev})"
    );

    let values = match distribution {
        DistributionKind::Normal => {
            let normal = Normal::new(mean, std_dev).context("Invalid normal parameters")?;
            draw(&normal, count, rng)
        }
        DistributionKind::Uniform => {
            let half_width = 3.0_f64.sqrt() * std_dev;
            let uniform = Uniform::new(mean - half_width, mean + half_width)
                .context("Invalid uniform range")?;
            draw(&uniform, count, rng)
        }
        DistributionKind::Exponential => {
            // Exp(1/σ) has mean σ and standard deviation σ
            let exp = Exp::new(1.0 / std_dev).context("Invalid exponential rate")?;
            draw(&exp, count, rng)
                .into_iter()
                .map(|x| x + mean - std_dev)
                .collect()
        }
    };
    Ok(values)
}

fn draw<D, R>(distribution: &D, count: usize, rng: &mut R) -> Vec<f64>
where
    D: Distribution<f64>,
    R: Rng,
{
    distribution.sample_iter(rng).take(count).collect()
}

#[cfg(test)]
mod tests {
    use normcheck_stats::{
        analysis::{AnalysisOptions, analyze},
        sample::Sample,
    };
    use rand::SeedableRng as _;

    use super::*;

    fn arg(distribution: DistributionKind, mean: f64, std_dev: f64) -> GenerateArg {
        GenerateArg {
            count: 2_000,
            distribution,
            mean,
            std_dev,
            seed: Some(1),
            output: None,
        }
    }

    #[test]
    fn test_moments_match_request() {
        for distribution in [
            DistributionKind::Normal,
            DistributionKind::Uniform,
            DistributionKind::Exponential,
        ] {
            let mut rng = Pcg64::seed_from_u64(1);
            let values = generate(&arg(distribution, 10.0, 2.0), &mut rng).unwrap();
            let sample = Sample::new(values).unwrap();
            let result = analyze(&sample, &AnalysisOptions::default()).unwrap();
            assert_eq!(result.stats.count, 2_000);
            assert!((result.stats.mean - 10.0).abs() < 0.2, "{distribution:?}");
            assert!((result.stats.std_dev - 2.0).abs() < 0.2, "{distribution:?}");
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let arg = arg(DistributionKind::Normal, 0.0, 1.0);
        let a = generate(&arg, &mut Pcg64::seed_from_u64(9)).unwrap();
        let b = generate(&arg, &mut Pcg64::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_skewed_data_is_rejected() {
        let mut rng = Pcg64::seed_from_u64(4);
        let values = generate(&arg(DistributionKind::Exponential, 0.0, 1.0), &mut rng).unwrap();
        let sample = Sample::new(values).unwrap();
        let result = analyze(&sample, &AnalysisOptions::default()).unwrap();
        assert!(!result.passes_normality);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut rng = Pcg64::seed_from_u64(0);
        assert!(generate(&arg(DistributionKind::Normal, 0.0, 0.0), &mut rng).is_err());
        assert!(generate(&arg(DistributionKind::Uniform, f64::NAN, 1.0), &mut rng).is_err());
    }
}
