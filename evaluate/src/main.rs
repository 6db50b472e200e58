use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::PathBuf;

use clap::Parser;
use folio::{metadata_policies, EvaluationEngine, EvaluationRecord};

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate extracted metadata against ground truth.")]
struct Args {
    /// The expected records, one JSON document per line
    #[arg(long)]
    expected: PathBuf,

    /// The extracted records, one JSON document per line, paired with the
    /// expected file line by line
    #[arg(long)]
    extracted: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let expected = BufReader::new(File::open(&args.expected)?);
    let extracted = BufReader::new(File::open(&args.extracted)?);

    let mut engine = EvaluationEngine::new(metadata_policies());
    let mut n_documents = 0;
    let mut n_skipped = 0;
    for (i, (expected, extracted)) in expected.lines().zip(extracted.lines()).enumerate() {
        let expected = expected?;
        let extracted = extracted?;
        if expected.is_empty() && extracted.is_empty() {
            continue;
        }
        let expected: EvaluationRecord = match serde_json::from_str(&expected) {
            Ok(record) => record,
            Err(e) => {
                eprintln!("Skipping document {}: {e}", i + 1);
                n_skipped += 1;
                continue;
            }
        };
        let extracted: EvaluationRecord = match serde_json::from_str(&extracted) {
            Ok(record) => record,
            Err(e) => {
                eprintln!("Skipping document {}: {e}", i + 1);
                n_skipped += 1;
                continue;
            }
        };
        engine.observe(&expected, &extracted);
        n_documents += 1;
    }
    eprintln!("# of documents: {n_documents}");
    if n_skipped > 0 {
        eprintln!("# of skipped documents: {n_skipped}");
    }

    print!("{}", engine.report());

    Ok(())
}
