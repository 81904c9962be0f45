use std::fs;
use std::io::prelude::*;
use std::io::BufWriter;
use std::path::PathBuf;

// CLI tools
use anyhow::{Context, Result};
use console::style;
use indicatif::HumanBytes;
use structopt::StructOpt;

use bounded_lempel_ziv::BoundedLempelZiv;

#[derive(StructOpt)]
struct CliInput {
    /// File with the text to parse. Read as raw bytes; the zero byte is
    /// reserved as terminator and must not occur in it
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Maximum permitted reference-chain depth per position
    cost_bound: u32,
}

fn main() -> Result<()> {
    let args = CliInput::from_args();

    let text = fs::read(&args.input)
        .with_context(|| format!("Could not read input file `{}`", args.input.display()))?;
    eprintln!(
        "Input: {} ({})",
        args.input.display(),
        HumanBytes(text.len() as u64)
    );

    eprintln!(
        "{} Constructing tree & parsing...",
        style("[1/2]").bold().dim()
    );
    let encoded = BoundedLempelZiv::encode(&text, args.cost_bound)
        .with_context(|| format!("Could not parse `{}`", args.input.display()))?;

    eprintln!("{} Writing phrases...", style("[2/2]").bold().dim());
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "n = {}", encoded.text_len())?;
    for phrase in encoded.phrases() {
        writeln!(out, "{}", phrase)?;
    }
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "z = {} phrases", encoded.phrases().len())?;
    out.flush()?;

    eprintln!("{} phrases", encoded.phrases().len());
    eprintln!("{}", encoded.analysis(args.input.display().to_string()));

    Ok(())
}
