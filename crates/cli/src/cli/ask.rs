//! `council ask`: one-shot turn.
//!
//! Sends a single message (optionally with a file), prints the synthesized
//! answer and exits. Useful for scripting, piping and quick questions.

use std::sync::Arc;

use council_domain::config::Config;

use crate::bootstrap::{App, TurnOptions};
use crate::render::{print_turn, save_images, TurnReport};

/// Run one turn and print the result.
///
/// Returns `false` when the turn failed, so the caller can exit non-zero.
pub async fn run(
    config: Arc<Config>,
    message: String,
    session: Option<String>,
    opts: TurnOptions,
    json_output: bool,
) -> anyhow::Result<bool> {
    let app = App::build(config)?;
    let session = app.open_session(session.as_deref())?;

    let submitted = app.submit(&session.id, &message, &opts).await?;
    let images = save_images(
        &app.config.sessions.state_path.join("images"),
        &submitted.session.id,
        submitted.session.turns.len(),
        &submitted.message,
    )?;

    if json_output {
        let report = TurnReport::new(&submitted, images);
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| anyhow::anyhow!("serializing result: {e}"))?;
        println!("{json}");
    } else {
        print_turn(&submitted, &images);
        eprintln!("\x1b[2m(session {})\x1b[0m", submitted.session.id);
    }

    Ok(submitted.result.is_ok())
}
