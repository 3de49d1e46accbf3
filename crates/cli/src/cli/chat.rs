//! `council chat`: interactive REPL command.
//!
//! Opens a readline loop that submits each line as a turn and prints the
//! synthesized answer. Slash commands stage attachments, inspect memory and
//! switch model, grounding or session.

use std::path::PathBuf;
use std::sync::Arc;

use council_domain::config::Config;

use crate::bootstrap::{App, TurnOptions};
use crate::render::{print_turn, save_images};

/// What the REPL should do after a slash command.
#[derive(Debug, PartialEq, Eq)]
enum Slash {
    Continue,
    Quit,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Public entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn chat(config: Arc<Config>, session: Option<String>, mut opts: TurnOptions) -> anyhow::Result<()> {
    let app = App::build(config)?;
    let mut session_id = app.open_session(session.as_deref())?.id;

    let history_path = app.config.sessions.state_path.join("chat_history.txt");
    let mut rl = rustyline::DefaultEditor::new()?;
    let _ = rl.load_history(&history_path);

    eprintln!("Council interactive chat");
    eprintln!(
        "Session: {session_id}  |  Model: {}  |  Type /help for commands, Ctrl+D to exit",
        app.model(&opts)
    );
    eprintln!();

    loop {
        let prompt = if opts.attachment.is_some() { "you [+file]> " } else { "you> " };
        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(&line).ok();

                if trimmed.starts_with('/') {
                    match handle_slash_command(&app, trimmed, &mut session_id, &mut opts) {
                        Ok(Slash::Quit) => break,
                        Ok(Slash::Continue) => {}
                        Err(e) => eprintln!("\x1B[31merror: {e}\x1B[0m"),
                    }
                    continue;
                }

                if let Err(e) = send_message(&app, &session_id, trimmed, &opts).await {
                    eprintln!("\x1B[31merror: {e}\x1B[0m");
                }
                // A staged attachment goes with exactly one message.
                opts.attachment = None;
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                eprintln!("(Use Ctrl+D or /quit to exit)");
            }
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("\x1B[31mreadline error: {e}\x1B[0m");
                break;
            }
        }
    }

    rl.save_history(&history_path).ok();
    eprintln!("Goodbye!");
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Slash command handling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn handle_slash_command(
    app: &App,
    input: &str,
    session_id: &mut String,
    opts: &mut TurnOptions,
) -> anyhow::Result<Slash> {
    let (cmd, arg) = match input.split_once(' ') {
        Some((cmd, arg)) => (cmd, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (input, None),
    };

    match cmd {
        "/quit" | "/exit" => return Ok(Slash::Quit),

        "/attach" => match arg {
            Some(path) => {
                let path = PathBuf::from(path);
                if !path.is_file() {
                    anyhow::bail!("{} is not a file", path.display());
                }
                eprintln!("Attached {} to your next message.", path.display());
                opts.attachment = Some(path);
            }
            None => match opts.attachment.take() {
                Some(path) => eprintln!("Dropped staged file {}.", path.display()),
                None => eprintln!("Usage: /attach <path>"),
            },
        },

        "/memory" => super::memory::list(&app.sessions),

        "/model" => match arg {
            Some(name) => {
                let name = name.to_string();
                app.sessions.update_settings(|s| s.model = Some(name.clone()))?;
                opts.model = Some(name);
                eprintln!("Model set to: {}", app.model(opts));
            }
            None => eprintln!("Current model: {}", app.model(opts)),
        },

        "/grounding" => {
            let on = match arg {
                Some("on") | Some("true") => true,
                Some("off") | Some("false") => false,
                _ => anyhow::bail!("Usage: /grounding on|off"),
            };
            app.sessions.update_settings(|s| s.grounding = Some(on))?;
            opts.grounding = Some(on);
            eprintln!("Web grounding {}.", if on { "on" } else { "off" });
        }

        "/new" => {
            *session_id = app.sessions.create()?.id;
            eprintln!("New session: {session_id}");
        }

        "/session" => match arg {
            Some(id) => {
                let session = app.open_session(Some(id))?;
                *session_id = session.id;
                eprintln!("Switched to \"{}\" ({} messages).", session.title, session.turns.len());
            }
            None => eprintln!("Current session: {session_id}"),
        },

        "/help" => {
            eprintln!("Commands:");
            eprintln!("  /attach <path>     Attach a file to your next message (no path: drop it)");
            eprintln!("  /memory            List remembered facts");
            eprintln!("  /model [name]      Show or set the model");
            eprintln!("  /grounding on|off  Toggle web grounding");
            eprintln!("  /new               Start a new session");
            eprintln!("  /session [id]      Show or switch session");
            eprintln!("  /quit, /exit       Exit the chat");
            eprintln!("  /help              Show this help");
        }

        other => eprintln!("Unknown command: {other}  (type /help for a list)"),
    }

    Ok(Slash::Continue)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Message sending
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

async fn send_message(app: &App, session_id: &str, text: &str, opts: &TurnOptions) -> anyhow::Result<()> {
    eprintln!("\x1B[2m(consulting the council...)\x1B[0m");
    let submitted = app.submit(session_id, text, opts).await?;
    let images = save_images(
        &app.config.sessions.state_path.join("images"),
        &submitted.session.id,
        submitted.session.turns.len(),
        &submitted.message,
    )?;
    print_turn(&submitted, &images);
    println!();
    Ok(())
}
