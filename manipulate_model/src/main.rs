use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use folio::{ZoneCategory, ZoneClassifier};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "A program to manipulate trained models.")]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model_in: PathBuf,

    /// Output path of the model file
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Output the aggregate feature weights as CSV.
    #[arg(long)]
    dump_weights: Option<PathBuf>,

    /// Output the scaling range table.
    #[arg(long)]
    dump_ranges: Option<PathBuf>,
}

#[derive(Serialize)]
struct WeightRecord {
    feature: String,
    weight: f64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(fs::File::open(&args.model_in)?)?;
    let mut range_path = args.model_in.clone().into_os_string();
    range_path.push(".range");
    // Weight and range dumps never consult the label set.
    let classifier = match fs::File::open(&range_path) {
        Ok(ranges) => {
            let mut ranges = BufReader::new(ranges);
            ZoneClassifier::<ZoneCategory>::read_model(&mut f, Some(&mut ranges))?
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            ZoneClassifier::read_model(&mut f, None)?
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(path) = args.dump_weights {
        eprintln!("Saving weight file...");
        let file = fs::File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for (feature, weight) in classifier.feature_weights() {
            wtr.serialize(WeightRecord { feature, weight })?;
        }
    }

    if let Some(path) = args.dump_ranges {
        if classifier.scaling().is_identity() {
            eprintln!("The model has no range table.");
        } else {
            eprintln!("Saving range file...");
            let mut wtr = BufWriter::new(fs::File::create(path)?);
            classifier.write_ranges(&mut wtr)?;
        }
    }

    if let Some(path) = args.model_out {
        eprintln!("Saving model file...");
        let mut f = zstd::Encoder::new(fs::File::create(&path)?, 19)?;
        classifier.write_model(&mut f)?;
        f.finish()?;
        if !classifier.scaling().is_identity() {
            let mut range_path = path.into_os_string();
            range_path.push(".range");
            let mut wtr = BufWriter::new(fs::File::create(range_path)?);
            classifier.write_ranges(&mut wtr)?;
        }
    }

    Ok(())
}
