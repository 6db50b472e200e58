use std::fs::File;
use std::io::{prelude::*, stderr, BufReader, BufWriter};
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use folio::{
    coarse_registry, metadata_registry, write_libsvm, FeatureVectorBuilder, Label, MetadataPart,
    Page, TrainingSample, Zone, ZoneCategory,
};

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
#[command(about = "A program to convert labeled zone corpora into the solver text format.")]
struct Args {
    /// A labeled zone corpus, one JSON page per line
    #[arg(long)]
    zones: PathBuf,

    /// The feature registry deciding the label set: {coarse, metadata}
    #[arg(long, default_value = "coarse")]
    registry: RegistryKind,

    /// The file to write the dataset to
    #[arg(long)]
    output: PathBuf,
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
    L: Label + FromStr<Err = &'static str>,
{
    eprintln!("Loading {:?} ...", args.zones);
    let f = BufReader::new(File::open(&args.zones)?);
    let mut samples: Vec<TrainingSample<L>> = vec![];
    let mut n_pages = 0;
    let mut n_failed = 0;
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
            let vector = match builder.build(zone, &page) {
                Ok(vector) => vector,
                Err(e) => {
                    eprintln!("Skipping zone: {e}");
                    n_failed += 1;
                    continue;
                }
            };
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

    let mut f = BufWriter::new(File::create(&args.output)?);
    let n_written = write_libsvm(&samples, &mut f)?;

    eprintln!("# of samples: {n_written}");
    eprintln!("# of unlabeled zones: {}", samples.len() - n_written);
    eprintln!("# of skipped zones: {n_failed}");

    Ok(())
}
