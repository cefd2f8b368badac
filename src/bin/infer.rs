//! Command line tool to parse raw log lines with a trained model

use anyhow::anyhow;
use burn::backend::{libtorch::LibTorchDevice, LibTorch};
use burn_log_parser::{
    cli::{Dataset, Model},
    models::bert,
    pipelines::{
        token_classification::{self, config::artifact_dir},
        Pipeline,
    },
    utils::files::read_lines,
};
use pico_args::Arguments;
use tokio::io::{self, AsyncBufReadExt};

const HELP: &str = "\
Usage: infer [OPTIONS] [LINE...]

Arguments:
  LINE                 Raw log lines to parse (read from stdin when none are given)

Options:
  -h, --help           Print help
  -m, --model          The model the parser was trained from (e.g., 'bert-base-cased')
  -D, --dataset        The dataset the parser was trained on (defaults to 'apache')
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  -f, --file           Read raw log lines from a file
  --cpu                Run on the CPU instead of the first CUDA device
";

#[derive(Debug)]
struct Args {
    model: Option<String>,
    dataset: Option<String>,
    data_dir: Option<String>,
    file: Option<String>,
    cpu: bool,
    lines: Vec<String>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            dataset: pargs.opt_value_from_str(["-D", "--dataset"])?,
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            file: pargs.opt_value_from_str(["-f", "--file"])?,
            cpu: pargs.contains("--cpu"),
            lines: pargs
                .finish()
                .into_iter()
                .map(|arg| {
                    arg.into_string()
                        .map_err(|arg| anyhow!("Invalid UTF-8 argument: {:?}", arg))
                })
                .collect::<anyhow::Result<_>>()?,
        };

        Ok(Some(args))
    }
}

/// Collect the non-blank lines of stdin
async fn read_stdin() -> anyhow::Result<Vec<String>> {
    let mut lines = io::BufReader::new(io::stdin()).lines();
    let mut input = Vec::new();

    while let Some(line) = lines.next_line().await? {
        if !line.trim().is_empty() {
            input.push(line);
        }
    }

    Ok(input)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let pipeline = Pipeline::TokenClassification;

    let model = match &args.model {
        Some(model) => Model::try_from(model.as_str())?,
        None => Model::default_for(&pipeline),
    };

    let dataset = match &args.dataset {
        Some(dataset) => Dataset::try_from(dataset.as_str())?,
        None => Dataset::Apache,
    };

    let data_dir = args.data_dir.as_deref().unwrap_or("data");
    let artifact_dir = artifact_dir(data_dir, &dataset.to_string(), &model.to_string());

    let lines = if let Some(file) = &args.file {
        read_lines(file)
            .await
            .map_err(|e| anyhow!("Unable to read log lines from {}: {}", file, e))?
    } else if !args.lines.is_empty() {
        args.lines
    } else {
        read_stdin().await?
    };

    if lines.is_empty() {
        log::warn!("No log lines to parse");

        return Ok(());
    }

    let device = if args.cpu {
        LibTorchDevice::Cpu
    } else {
        LibTorchDevice::Cuda(0)
    };

    let parsed = token_classification::infer::<LibTorch, bert::token_classification::Config>(
        device,
        &artifact_dir,
        lines,
    )?;

    for line in parsed {
        println!("{}", serde_json::to_string(&line)?);
    }

    Ok(())
}
