use std::fmt::Display;
use std::fs::File;
use std::io::{prelude::*, stderr, BufReader, BufWriter};
use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgGroup, Parser};
use folio::{
    coarse_registry, metadata_registry, read_libsvm, ClassWeights, FeatureVectorBuilder, Kernel,
    Label, MetadataPart, Page, TrainingParams, TrainingSample, Zone, ZoneCategory, ZoneClassifier,
};

#[derive(Clone, Copy, Debug)]
enum KernelKind {
    Linear,
    Polynomial,
    Rbf,
    Sigmoid,
}

impl FromStr for KernelKind {
    type Err = &'static str;
    fn from_str(kernel: &str) -> Result<Self, Self::Err> {
        match kernel {
            "0" => Ok(Self::Linear),
            "1" => Ok(Self::Polynomial),
            "2" => Ok(Self::Rbf),
            "3" => Ok(Self::Sigmoid),
            _ => Err("Could not parse a kernel value"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum RegistryKind {
    Coarse,
    Metadata,
}

impl FromStr for RegistryKind {
    type Err = &'static str;
    fn from_str(registry: &str) -> Result<Self, Self::Err> {
        match registry {
            "coarse" => Ok(Self::Coarse),
            "metadata" => Ok(Self::Metadata),
            _ => Err("Could not parse a registry value"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    about = "A program to train zone classification models.",
    group = ArgGroup::new("dataset").required(true),
)]
struct Args {
    /// A training dataset in the solver text format
    #[arg(long, group = "dataset")]
    data: Option<PathBuf>,

    /// A labeled zone corpus, one JSON page per line
    #[arg(long, group = "dataset")]
    zones: Option<PathBuf>,

    /// The feature registry deciding the label set: {coarse, metadata}
    #[arg(long, default_value = "coarse")]
    registry: RegistryKind,

    /// The file to write the trained model to
    #[arg(long)]
    model: PathBuf,

    /// The kernel. {0, 1, 2, 3} (0: linear, 1: polynomial, 2: RBF, 3: sigmoid)
    #[arg(long, default_value = "1")]
    kernel: KernelKind,

    /// The cost hyperparameter for classifier training
    #[arg(long, default_value = "8.0")]
    cost: f64,

    /// The gamma hyperparameter of the polynomial, RBF and sigmoid kernels
    #[arg(long, default_value = "0.125")]
    gamma: f64,

    /// The degree of the polynomial kernel
    #[arg(long, default_value = "3")]
    degree: u32,

    /// The coef0 hyperparameter of the polynomial and sigmoid kernels
    #[arg(long, default_value = "0.5")]
    coef0: f64,

    /// The epsilon stopping criterion for classifier training
    #[arg(long, default_value = "0.001")]
    eps: f64,

    /// Disable the shrinking heuristic hint
    #[arg(long)]
    no_shrinking: bool,

    /// The number of workers for zstd (0 means multithreaded will be disabled)
    #[arg(long, default_value = "0")]
    zstd_workers: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.registry {
        RegistryKind::Coarse => run::<ZoneCategory>(&args, coarse_registry()?),
        RegistryKind::Metadata => run::<MetadataPart>(&args, metadata_registry()?),
    }
}

fn run<L>(
    args: &Args,
    builder: FeatureVectorBuilder<Zone, Page>,
) -> Result<(), Box<dyn std::error::Error>>
where
    L: Label + FromStr<Err = &'static str> + Display,
{
    let mut samples: Vec<TrainingSample<L>> = vec![];
    if let Some(path) = &args.data {
        eprintln!("Loading {path:?} ...");
        let f = BufReader::new(File::open(path)?);
        samples = read_libsvm(f)?;
    } else if let Some(path) = &args.zones {
        eprintln!("Loading {path:?} ...");
        let f = BufReader::new(File::open(path)?);
        let mut n_pages = 0;
        for (i, line) in f.lines().enumerate() {
            if i % 1000 == 0 {
                eprint!("# of pages: {i}\r");
                stderr().flush()?;
            }
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let page: Page = serde_json::from_str(&line)?;
            for zone in &page.zones {
                let vector = builder.build(zone, &page)?;
                match &zone.label {
                    Some(label) => {
                        samples.push(TrainingSample::labeled(vector, L::from_str(label)?));
                    }
                    None => samples.push(TrainingSample::unlabeled(vector)),
                }
            }
            n_pages += 1;
        }
        eprintln!("# of pages: {n_pages}");
    }
    eprintln!("# of samples: {}", samples.len());

    let weights = ClassWeights::compute(&samples)?;
    eprintln!("# of classes: {}", weights.len());
    for (ordinal, weight) in weights.iter() {
        if let Some(label) = L::from_ordinal(ordinal) {
            eprintln!("  {label}: penalty weight {weight:.3}");
        }
    }

    let kernel = match args.kernel {
        KernelKind::Linear => Kernel::Linear,
        KernelKind::Polynomial => Kernel::Polynomial {
            degree: args.degree,
            gamma: args.gamma,
            coef0: args.coef0,
        },
        KernelKind::Rbf => Kernel::Rbf { gamma: args.gamma },
        KernelKind::Sigmoid => Kernel::Sigmoid {
            gamma: args.gamma,
            coef0: args.coef0,
        },
    };
    let params = TrainingParams {
        kernel,
        cost: args.cost,
        epsilon: args.eps,
        shrinking: !args.no_shrinking,
    };

    eprintln!("Start training...");
    let classifier = ZoneClassifier::train(&samples, &weights, params)?;
    eprintln!("Finish training.");

    let mut f = zstd::Encoder::new(File::create(&args.model)?, 19)?;
    f.multithread(args.zstd_workers)?;
    classifier.write_model(&mut f)?;
    f.finish()?;

    let mut range_path = args.model.clone().into_os_string();
    range_path.push(".range");
    let mut f = BufWriter::new(File::create(range_path)?);
    classifier.write_ranges(&mut f)?;

    Ok(())
}
