use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mraw_rs::image_pipeline::{clean_cih_file, CihMetadata, MrawReader};
use mraw_rs::logger;

use tracing::info;

#[derive(Parser)]
#[command(name = "mraw_rs", version, about = "Decode Photron MRAW 12-bit video frames")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the geometry and frame count recorded in a CIH sidecar
    Info {
        cih: PathBuf,
        /// Also report how many whole frames this MRAW file holds
        #[arg(long)]
        mraw: Option<PathBuf>,
    },
    /// Write a cleaned, parseable copy of a CIH sidecar next to it (.xml)
    Clean { cih: PathBuf },
    /// Decode one frame and print its sample statistics
    Frame {
        cih: PathBuf,
        mraw: PathBuf,
        /// Zero-based frame index
        #[arg(long, default_value_t = 0)]
        index: u64,
        /// Also print the samples of this row
        #[arg(long)]
        row: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_with_default(match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    });

    run(cli.command)
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Info { cih, mraw } => {
            let metadata = CihMetadata::from_file(&cih)
                .with_context(|| format!("reading {}", cih.display()))?;

            println!("Resolution:      {}x{}", metadata.columns, metadata.rows);
            println!("Bit depth:       {}", metadata.bit_depth);
            println!("Recorded frames: {}", metadata.recorded_frames);
            if let Some(rate) = metadata.record_rate {
                println!("Record rate:     {} fps", rate);
            }

            let geometry = metadata.geometry()?;
            println!("Frame size:      {} bytes", geometry.frame_byte_size());

            if let Some(mraw) = mraw {
                let mut reader = MrawReader::open(&cih, &mraw)?;
                println!("Frames in file:  {}", reader.available_frames()?);
            }
        }
        Command::Clean { cih } => {
            let xml = clean_cih_file(&cih)?;
            info!("Wrote {}", xml.display());
        }
        Command::Frame {
            cih,
            mraw,
            index,
            row,
        } => {
            let mut reader = MrawReader::open(&cih, &mraw)
                .with_context(|| format!("opening {}", mraw.display()))?;
            let frame = reader
                .decode_frame(index)
                .with_context(|| format!("decoding frame {}", index))?;

            let samples = frame.as_slice();
            let min = samples.iter().copied().min().unwrap_or(0);
            let max = samples.iter().copied().max().unwrap_or(0);
            let mean = samples.iter().map(|&v| v as f64).sum::<f64>() / samples.len() as f64;

            println!("Frame:           {}", index);
            println!(
                "Shape:           {}x{} ({}-bit)",
                frame.columns(),
                frame.rows(),
                reader.geometry().bit_depth()
            );
            println!("Min / max:       {} / {}", min, max);
            println!("Mean:            {:.2}", mean);

            if let Some(row) = row {
                if row >= frame.rows() {
                    anyhow::bail!("row {} is outside a frame of {} rows", row, frame.rows());
                }
                let values: Vec<String> = frame.row(row).iter().map(u16::to_string).collect();
                println!("Row {}: {}", row, values.join(" "));
            }
        }
    }

    Ok(())
}
