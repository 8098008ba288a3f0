use media_probe::Prober;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Probe every non-hidden file below a folder and print a one-line summary per file.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let start_dir = env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("assets"), PathBuf::from);
    let prober = Prober::builder().timeout(Duration::from_secs(10)).build()?;

    let files = WalkDir::new(&start_dir)
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.')
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file());

    for entry in files {
        let path = entry.path().to_string_lossy().into_owned();
        match prober.probe(&path).await {
            Ok(result) => println!(
                "{path}\n\t{}\n\t{} video, {} audio, {} subtitle, {} chapters",
                result.format(),
                result.video().len(),
                result.audio().len(),
                result.subtitle().len(),
                result.chapters().len(),
            ),
            Err(err) => println!("{path}\n\t{:?}: {err}", err.kind()),
        }
    }

    Ok(())
}
