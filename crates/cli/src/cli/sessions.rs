//! `council sessions`: list, inspect and delete saved sessions.

use council_domain::turn::{Role, Segment};
use council_sessions::SessionStore;

use crate::bootstrap::App;

pub fn list(store: &SessionStore) {
    let rows = store.list();
    if rows.is_empty() {
        println!("No sessions yet.");
        return;
    }
    for row in rows {
        println!(
            "{}  {}  ({} messages)  {}",
            row.id,
            row.updated_at.format("%Y-%m-%d %H:%M"),
            row.turns,
            row.title
        );
    }
}

pub fn show(store: &SessionStore, id: &str) -> anyhow::Result<()> {
    let session = store
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("no session with id {id}"))?;

    println!("# {}", session.title);
    println!("created {}", session.created_at.to_rfc3339());
    for turn in &session.turns {
        let who = match turn.role {
            Role::User => "you",
            Role::Model => "council",
        };
        println!();
        if let Some(att) = &turn.attachment {
            println!("{who}> [attached {} ({})]", att.name, att.mime_type);
        }
        for segment in &turn.segments {
            match segment {
                Segment::Text { text } => println!("{who}> {text}"),
                Segment::InlineBlob { mime_type, data } => {
                    println!("{who}> [{mime_type}, {} bytes]", data.len())
                }
            }
        }
    }
    Ok(())
}

pub fn delete(app: &App, id: &str) -> anyhow::Result<()> {
    if app.delete_session(id)? {
        println!("Deleted {id}");
        Ok(())
    } else {
        anyhow::bail!("no session with id {id}")
    }
}
