use catalog_l10n::l10n::{
    CacheStore, CancelToken, ExportSink, GoogleTranslateProvider, JsonFileSink, JsonFileStore,
    MachineTranslator, MockMode, MockTranslator, cache_key,
};
use catalog_l10n::{FieldSelector, L10nConfig, PhraseCache, Pipeline, Product};
use clap::{Arg, ArgAction, Command};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let matches = Command::new("catalog-l10n")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate catalog text fields, keeping markup and brand names intact")
        .arg(
            Arg::new("products")
                .help("JSON file with the products to translate")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("target-locale")
                .help("Target language code (e.g., fr, es, de)")
                .index(2),
        )
        .arg(
            Arg::new("source-locale")
                .long("source")
                .short('s')
                .help("Source language code"),
        )
        .arg(
            Arg::new("channel")
                .long("channel")
                .short('c')
                .help("Target channel tag; names the cache snapshot and export"),
        )
        .arg(
            Arg::new("cache-dir")
                .long("cache-dir")
                .help("Directory holding phrase cache snapshots"),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .short('o')
                .help("Directory for translated products")
                .default_value("out"),
        )
        .arg(
            Arg::new("concurrency")
                .long("concurrency")
                .help("Maximum in-flight translations (0 for unbounded)")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("deadline")
                .long("deadline")
                .help("Abort translation after this many seconds")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use mock translator instead of Google Translate")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let mut config = L10nConfig::from_env()?;
    if let Some(target) = matches.get_one::<String>("target-locale") {
        config.target_locale = target.clone();
    }
    if let Some(source) = matches.get_one::<String>("source-locale") {
        config.source_locale = source.clone();
    }
    if let Some(channel) = matches.get_one::<String>("channel") {
        config.channel_tag = channel.clone();
    }
    if let Some(dir) = matches.get_one::<String>("cache-dir") {
        config.cache_dir = dir.into();
    }
    if let Some(concurrency) = matches.get_one::<usize>("concurrency") {
        config.max_concurrency = *concurrency;
    }
    if let Some(secs) = matches.get_one::<u64>("deadline") {
        config.deadline = (*secs > 0).then(|| Duration::from_secs(*secs));
    }
    config.validate()?;

    let products_path = matches
        .get_one::<String>("products")
        .ok_or("missing products file")?;
    let products: Vec<Product> = serde_json::from_slice(&tokio::fs::read(products_path).await?)?;
    info!(products = products.len(), path = %products_path, "Loaded catalog");

    let translator: Arc<dyn MachineTranslator> = if matches.get_flag("mock") {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        Arc::new(GoogleTranslateProvider::from_env()?)
    };

    let store = JsonFileStore::new(&config.cache_dir);
    let key = cache_key(&config.channel_tag);
    let snapshot = store.load(&key).await?;
    info!(key = %key, entries = snapshot.len(), "Loaded phrase cache");
    let cache = Arc::new(PhraseCache::from_snapshot(snapshot).with_rate(config.rate_per_char));

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, stopping translation");
                cancel.cancel();
            }
        });
    }
    let options = config.resolve_options().with_cancel(cancel);

    let mut pipeline = Pipeline::new(Arc::clone(&cache), FieldSelector::default());
    let (translated, report) = pipeline.run(products, translator, &options).await?;

    store.save(&key, &cache.snapshot()).await?;
    println!("Translation cost: {}", report.cost);

    let sink = JsonFileSink::new(matches.get_one::<String>("out").map_or("out", |s| s.as_str()));
    sink.export(&translated, &key).await?;
    info!(
        products = report.products,
        new_phrases = report.phrases_registered,
        destination = %sink.dir().display(),
        "Done"
    );

    Ok(())
}
