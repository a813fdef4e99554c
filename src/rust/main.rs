use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};
use wordseq::{Classifier, ExampleTexts, ModelManager, ModelSource, ModelSources, RuntimeConfig};
use wordseq::examples::DEFAULT_EXAMPLE;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Text to classify; defaults to the selected example
    text: Option<String>,

    /// Model location (path or http(s) URL)
    #[arg(long, default_value = "model_js/model.onnx")]
    model: String,

    /// Metadata location (path or http(s) URL)
    #[arg(long, default_value = "model_js/metadata.json")]
    metadata: String,

    /// Expected SHA-256 of a downloaded model
    #[arg(long)]
    model_sha256: Option<String>,

    /// Force a fresh download of a remote model
    #[arg(short, long)]
    fresh: bool,

    /// Example key to classify when no text is given
    #[arg(short, long, default_value = DEFAULT_EXAMPLE)]
    example: String,

    /// JSON file mapping example keys to texts
    #[arg(long)]
    examples_file: Option<PathBuf>,

    /// Classify every line read from stdin after the initial text
    #[arg(long)]
    stdin: bool,

    /// ONNX Runtime intra-op threads (0 lets the runtime decide)
    #[arg(long, default_value_t = 0)]
    intra_threads: usize,
}

fn status(text: &str) {
    info!("{}", text);
    println!("{}", text);
}

fn show_metadata(classifier: &Classifier) {
    if let Some(info) = classifier.info() {
        println!("Vocabulary size: {}", info.vocabulary_size);
        println!("Max length: {}", info.max_len);
    }
}

fn do_predict(classifier: &Classifier, text: &str) -> Result<()> {
    let result = classifier.predict(text)?;
    status(&result.to_string());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let examples = match &args.examples_file {
        Some(path) => ExampleTexts::from_file(path)?,
        None => ExampleTexts::builtin(),
    };
    let initial = examples.initial_text(args.text.as_deref(), &args.example)?;

    let mut sources = ModelSources::new(&args.model, &args.metadata);
    if let Some(hash) = &args.model_sha256 {
        sources = sources.with_model_sha256(hash);
    }

    let manager = ModelManager::new_default().context("Failed to create model cache")?;
    if args.fresh {
        info!("Fresh download requested - removing any cached model...");
        manager.remove_download(&sources.model)?;
    }

    status(&format!("Testing url {}", sources.model));
    if !manager.url_exists(&sources.model).await {
        status("Standing by.");
        return Ok(());
    }
    status(&format!("Model available: {}", sources.model));

    let config = RuntimeConfig::default().with_intra_threads(args.intra_threads);
    let mut classifier = Classifier::new().with_runtime_config(config);
    if let Err(e) = classifier.init(sources.clone(), &manager).await {
        status(classifier.status());
        return Err(e.into());
    }
    status(classifier.status());
    show_metadata(&classifier);

    do_predict(&classifier, &initial)?;

    if args.stdin {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            do_predict(&classifier, &line)?;
        }
    }

    if let ModelSource::Url(url) = &sources.model {
        info!("Model cached at {:?}", manager.get_cache_path(url));
    }

    Ok(())
}
