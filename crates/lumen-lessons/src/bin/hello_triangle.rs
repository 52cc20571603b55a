use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::window::WinitPlatform;
use lumen_engine::Runtime;
use lumen_lessons::HelloTriangleApplication;

fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default());

    let mut app = HelloTriangleApplication::new();
    Runtime::run(&mut app, WinitPlatform::new())?;
    Ok(())
}
