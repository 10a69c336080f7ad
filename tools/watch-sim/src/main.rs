use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use watch_sim::{parse_line, ColorLogger, ReportFormatter, Simulator};

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive the watch core from a script")]
struct Opts {
    /// Script to run; standard input when omitted
    script: Option<PathBuf>,

    /// Print reports as JSON lines
    #[arg(long)]
    json: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Report failing lines and continue instead of stopping
    #[arg(long)]
    keep_going: bool,
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    ColorLogger::init(ColorLogger::level_for(opts.verbose)).context("installing the logger")?;

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))
        .context("installing the Ctrl-C handler")?;

    let input: Box<dyn BufRead> = match &opts.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut simulator = Simulator::new()?;
    let formatter = ReportFormatter::new(opts.json);

    for (index, line) in input.lines().enumerate() {
        if !running.load(Ordering::SeqCst) {
            log::info!("interrupted after {} lines", index);
            break;
        }
        let number = index + 1;
        let line = line.context("reading the script")?;

        let outcome = parse_line(&line)
            .map_err(anyhow::Error::from)
            .and_then(|command| match command {
                Some(command) => simulator.execute(command),
                None => Ok(Vec::new()),
            });
        match outcome {
            Ok(reports) => {
                for report in &reports {
                    println!("{}", formatter.format(number, report));
                }
            }
            Err(err) if opts.keep_going => log::error!("line {number}: {err:#}"),
            Err(err) => return Err(err.context(format!("line {number}"))),
        }
    }
    Ok(())
}
