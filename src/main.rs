/*!
 * Isolate Executive - Demo Entry Point
 *
 * Boots an executive, spawns one MIDLET-model isolate, and drives an
 * application through its full lifecycle:
 * start -> pause -> resume -> destroy
 */

use anyhow::Context;
use isolate_exec::{init_tracing, AppDescriptor, AppModel, Executive, RuntimeConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Isolate executive starting...");
    let config = RuntimeConfig::from_env();
    let executive = Executive::builder().with_config(config).build()?;
    info!(pid = executive.pid(), "Executive ready");

    let lifecycle = executive.lifecycle();
    let isolate = lifecycle
        .new_isolate(AppModel::Midlet)
        .await
        .context("isolate failed to initialize")?;
    info!(
        pid = isolate.pid(),
        state = ?isolate.state(),
        "Isolate ready"
    );

    let app = AppDescriptor::new(AppModel::Midlet, "demo", "com.example.Foo");
    let app_id = isolate
        .start_app(app, vec!["com.example.Foo".to_string()])
        .await
        .context("application failed to start")?;
    info!(app_id, "Application started");

    isolate.pause_app(app_id).await.context("pause failed")?;
    info!(app_id, "Application paused");

    isolate.resume_app(app_id).await.context("resume failed")?;
    info!(app_id, "Application resumed");

    isolate
        .destroy_app(app_id, true)
        .await
        .context("destroy failed")?;
    info!(app_id, "Application destroyed");

    lifecycle.remove_isolate(isolate.pid())?;
    executive.shutdown().await;
    info!("Executive exited cleanly");
    Ok(())
}
