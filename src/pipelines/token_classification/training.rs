use burn::{
    config::Config as _,
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    module::{AutodiffModule, Module},
    optim::AdamWConfig,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
    train::{
        metric::{AccuracyMetric, LearningRateMetric, LossMetric},
        LearnerBuilder, ValidStep,
    },
};
use tokenizers::Tokenizer;

use crate::{
    metrics::Report,
    utils::{hugging_face::download_hf_model, renderer},
};

use super::{
    batcher::Train, evaluation::evaluate, labels::PAD_ID, Batcher, Item, Model, ModelConfig,
    Output, TokenClassifier,
};

/// Training Config
pub type Config = super::config::Training;

/// What to do with the model once training is done
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Render progress with the terminal dashboard rather than the log
    pub use_tui: bool,

    /// Persist the trained model and its configuration to the artifact directory
    pub save: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_tui: true,
            save: true,
        }
    }
}

/// Fine-tune a pretrained model on the training set, then score it on the test set
pub async fn train<B, M, I, D>(
    devices: Vec<B::Device>, // Device on which to perform computation (e.g., CPU or CUDA device)
    dataset_train: D,        // Training dataset
    dataset_test: D,         // Testing dataset
    config: Config,          // Experiment configuration
    options: Options,        // Rendering and persistence
) -> anyhow::Result<Report>
where
    B: AutodiffBackend,
    M: Model<B> + 'static,
    I: Item + 'static,
    D: Dataset<I> + 'static,
    M::InnerModule: ValidStep<
            Train<<B as AutodiffBackend>::InnerBackend>,
            Output<<B as AutodiffBackend>::InnerBackend>,
        > + TokenClassifier<<B as AutodiffBackend>::InnerBackend>,
{
    let device = devices
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("At least one device is required for training"))?;
    let artifact_dir = config.artifact_dir();

    std::fs::create_dir_all(&artifact_dir)
        .map_err(|e| anyhow!("Unable to create artifact directory {}: {}", artifact_dir, e))?;

    let files = download_hf_model(&config.model_name).await?;

    let model_config = M::Config::load_pretrained(
        files.config,
        &config.labels,
        config.hidden_dropout_prob,
        config.max_seq_length,
    )
    .map_err(|e| anyhow!("Unable to load pre-trained model config file: {}", e))?;

    let model = M::load_from_safetensors(&device, files.weights, model_config.clone())?;

    // Initialize tokenizer
    let tokenizer = Tokenizer::from_file(&files.tokenizer)
        .map_err(|e| anyhow!("Unable to load tokenizer for {}: {}", config.model_name, e))?;

    // Initialize batchers for training and testing data
    let batcher_train =
        Batcher::<B>::new(tokenizer.clone(), model_config.get_config(), device.clone())?;
    let batcher_test = Batcher::<B::InnerBackend>::new(
        tokenizer.clone(),
        model_config.get_config(),
        device.clone(),
    )?;

    let test_items: Vec<I> = dataset_test.iter().collect();

    // Surface tokenizer failures before the data loaders take over
    batcher_train.validate(dataset_train.iter())?;
    batcher_test.validate(test_items.iter().cloned())?;

    log::info!(
        "Training {} on {} log lines, validating on {}",
        config.model_name,
        dataset_train.len(),
        test_items.len()
    );

    let workers = std::thread::available_parallelism()?;

    // Initialize data loaders for training and testing data
    let dataloader_train = DataLoaderBuilder::new(batcher_train)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(workers.into())
        .build(dataset_train);

    let dataloader_test = DataLoaderBuilder::new(batcher_test)
        .batch_size(config.batch_size * 2)
        .num_workers(workers.into())
        .build(dataset_test);

    // Initialize optimizer
    let optimizer = AdamWConfig::new().with_epsilon(config.adam_epsilon).init();

    // Initialize learner
    let mut builder = LearnerBuilder::new(&artifact_dir)
        .metric_train_numeric(AccuracyMetric::new().with_pad_token(PAD_ID))
        .metric_valid_numeric(AccuracyMetric::new().with_pad_token(PAD_ID))
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .metric_train_numeric(LearningRateMetric::new())
        .with_file_checkpointer(CompactRecorder::new())
        .devices(devices)
        .num_epochs(config.num_epochs)
        .summary();

    if !options.use_tui {
        builder = builder.renderer(renderer::Simple::new());
    }

    let learner = builder.build(model, optimizer, config.learning_rate);

    // Train the model
    let model_trained = learner.fit(dataloader_train, dataloader_test);

    // Score the trained model on the held-out lines, without dropout
    let batcher_eval =
        Batcher::<B::InnerBackend>::new(tokenizer.clone(), model_config.get_config(), device)?;
    let report = evaluate(
        &model_trained.valid(),
        &batcher_eval,
        &test_items,
        config.batch_size,
    )?;

    log::info!("Evaluation on the test split:\n{}", report);

    if !options.save {
        return Ok(report);
    }

    // Save the configuration, tokenizer, metrics and the trained model
    model_config
        .save(format!("{artifact_dir}/config.json"))
        .map_err(|e| anyhow!("Unable to save model config: {}", e))?;

    config
        .save(format!("{artifact_dir}/training.json"))
        .map_err(|e| anyhow!("Unable to save training config: {}", e))?;

    tokenizer
        .save(format!("{artifact_dir}/tokenizer.json"), false)
        .map_err(|e| anyhow!("Unable to save tokenizer: {}", e))?;

    std::fs::write(
        format!("{artifact_dir}/metrics.json"),
        serde_json::to_string_pretty(&report)?,
    )?;

    CompactRecorder::new()
        .record(
            model_trained.into_record(),
            format!("{artifact_dir}/model").into(),
        )
        .map_err(|e| anyhow!("Unable to save trained model weights: {}", e))?;

    log::info!("Saved trained model to {}", artifact_dir);

    Ok(report)
}
