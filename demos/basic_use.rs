use media_probe::{Introspect, Prober};
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let target = env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/sample.mp4".to_string());
    let prober = Prober::builder().timeout(Duration::from_secs(30)).build()?;
    let result = prober.probe(&target).await?;

    println!("{result}");
    println!();
    for (name, value) in result.format().attribute_values() {
        println!("format.{name} = {value}");
    }
    for video in result.video() {
        let (width, height) = video.get_frame_shape((None, None));
        println!(
            "video stream {:?}: {width:?}x{height:?}, {:?} fps",
            video.index(),
            video.avg_frame_rate_fps()
        );
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
