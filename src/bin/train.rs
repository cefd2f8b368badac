//! Command line tool to fine-tune a log parser

use anyhow::anyhow;
use burn::{
    backend::{libtorch::LibTorchDevice, Autodiff, LibTorch},
    config::Config as _,
};
use burn_log_parser::{
    cli::{models::ModelError, Dataset, Model},
    datasets::{apache, LoadableDataset},
    models::bert,
    pipelines::{
        token_classification::{self, training},
        Pipeline,
    },
};
use pico_args::Arguments;

const HELP: &str = "\
Usage: train PIPELINE DATASET [OPTIONS]

Arguments:
  PIPELINE             The pipeline to use (e.g., 'token-classification')
  DATASET              The dataset to use (e.g., 'apache')

Options:
  -h, --help           Print help
  -m, --model          The model to use (e.g., 'bert-base-cased')
  -n, --num-epochs     Number of epochs to train for
  -b, --batch-size     Batch size
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  -c, --config         A training config file to start from
  --cpu                Train on the CPU instead of the first CUDA device
  --no-tui             Disable TUI
  --no-save            Skip saving the trained model
";

#[derive(Debug)]
struct Args {
    pipeline: String,
    dataset: String,
    model: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    data_dir: Option<String>,
    config: Option<String>,
    cpu: bool,
    use_tui: bool,
    save: bool,
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
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            cpu: pargs.contains("--cpu"),
            use_tui: !(pargs.contains("--no-tui")),
            save: !(pargs.contains("--no-save")),
            pipeline: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: PIPELINE"),
                _ => anyhow!("{}", e),
            })?,
            dataset: pargs.free_from_str().map_err(|e| match e {
                pico_args::Error::MissingArgument => anyhow!("Missing required argument: DATASET"),
                _ => anyhow!("{}", e),
            })?,
        };

        Ok(Some(args))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let pipeline = Pipeline::try_from(args.pipeline.as_str())?;

    let model = if let Some(model) = &args.model {
        Model::try_from(model.as_str())?
    } else {
        Model::default_for(&pipeline)
    };

    if !model.is_supported(&pipeline) {
        return Err(ModelError::Unsupported(model.to_string(), pipeline.to_string()).into());
    }

    let dataset = Dataset::try_from(args.dataset.as_str())?;

    match pipeline {
        Pipeline::TokenClassification => {
            handle_token_classification(&dataset, &model, &args).await
        }
    }
}

/// Build the training config from an optional config file, then apply command line overrides
fn training_config(
    dataset: &Dataset,
    model: &Model,
    args: &Args,
) -> anyhow::Result<training::Config> {
    let mut config = match &args.config {
        Some(path) => training::Config::load(path)
            .map_err(|e| anyhow!("Unable to load training config {}: {}", path, e))?,
        None => training::Config::new(model.to_string(), dataset.to_string(), Vec::new()),
    };

    config.model_name = model.to_string();
    config.dataset_name = dataset.to_string();

    if let Some(num_epochs) = args.num_epochs {
        config.num_epochs = num_epochs;
    }

    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }

    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.to_string();
    }

    Ok(config)
}

async fn handle_token_classification(
    dataset: &Dataset,
    model: &Model,
    args: &Args,
) -> anyhow::Result<()> {
    match dataset {
        Dataset::Apache => {
            let mut config = training_config(dataset, model, args)?;

            let logs = apache::Dataset::load(&config.data_dir, &config.raw_column).await?;

            // Labels always come from the dataset header
            config.labels = logs.labels();

            let (train, test) = logs.split(config.test_split, config.seed);

            let device = if args.cpu {
                LibTorchDevice::Cpu
            } else {
                LibTorchDevice::Cuda(0)
            };

            let options = training::Options {
                use_tui: args.use_tui,
                save: args.save,
            };

            let report = token_classification::train::<
                Autodiff<LibTorch>,
                bert::token_classification::Model<Autodiff<LibTorch>>,
                apache::Item,
                apache::Dataset,
            >(vec![device], train, test, config, options)
            .await?;

            println!("{}", report);
        }
    }

    Ok(())
}
