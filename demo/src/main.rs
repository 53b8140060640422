use anyhow::Context;
use engine::{EngineContext, LoopArgs};
use shape_demo::{DemoConfig, ShapesDemo};

/// Our own messages (key help, resets) at info; everything else only from warn.
const DEFAULT_LOG_FILTER: &str = "warn,shape_demo=info,engine=info";

fn main() -> anyhow::Result<()> {
    engine::init_logging(DEFAULT_LOG_FILTER);

    let args = LoopArgs::from_env();
    let config = DemoConfig::discover().context("loading configuration")?;
    let window = config.window.clone();

    let demo = ShapesDemo::new(config).context("creating the shapes")?;
    let ctx = EngineContext::new(window, args).context("opening the event loop")?;
    ctx.run(demo).context("running the simulation")?;

    log::info!("exiting");
    Ok(())
}
