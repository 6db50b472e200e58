use std::fmt::Display;
use std::fs::File;
use std::io::{prelude::*, stdin, stdout, BufReader, BufWriter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use clap::Parser;
use folio::{
    coarse_registry, metadata_registry, FeatureVectorBuilder, Label, MetadataPart, Page, Zone,
    ZoneCategory, ZoneClassifier,
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
#[command(about = "A program to classify document zones.")]
struct Args {
    /// The model file to use when classifying zones
    #[arg(long)]
    model: PathBuf,

    /// A zone corpus, one JSON page per line; reads stdin when omitted
    #[arg(long)]
    zones: Option<PathBuf>,

    /// The feature registry deciding the label set: {coarse, metadata}
    #[arg(long, default_value = "coarse")]
    registry: RegistryKind,
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
    L: Label + Display,
{
    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(&args.model)?)?;
    let mut range_path = args.model.clone().into_os_string();
    range_path.push(".range");
    let classifier = match File::open(&range_path) {
        Ok(ranges) => {
            let mut ranges = BufReader::new(ranges);
            ZoneClassifier::<L>::read_model(&mut f, Some(&mut ranges))?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            eprintln!("No range table found, scaling disabled.");
            ZoneClassifier::read_model(&mut f, None)?
        }
        Err(e) => return Err(e.into()),
    };

    eprintln!("Start classification");
    let is_tty = atty::is(atty::Stream::Stdout);
    let out = stdout();
    let mut out = BufWriter::new(out.lock());
    let rdr: Box<dyn BufRead> = match &args.zones {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(stdin().lock()),
    };
    let mut n_zones = 0;
    let start = Instant::now();
    for line in rdr.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        let page: Page = serde_json::from_str(&line)?;
        for zone in &page.zones {
            let vector = builder.build(zone, &page)?;
            let label = classifier.predict(&vector)?;
            writeln!(out, "{label}")?;
            n_zones += 1;
        }
        if is_tty {
            out.flush()?;
        }
    }
    out.flush()?;
    let duration = start.elapsed();
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    eprintln!(
        "Speed: {} [zones/sec]",
        n_zones as f64 / duration.as_secs_f64()
    );

    Ok(())
}
