use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::window::WinitPlatform;
use lumen_engine::Runtime;
use lumen_lessons::BasicWindowApplication;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let mut app = BasicWindowApplication::new();
    let summary = Runtime::run(&mut app, WinitPlatform::new())?;

    log::info!("basic-window: {} frames", summary.frames);
    Ok(())
}
