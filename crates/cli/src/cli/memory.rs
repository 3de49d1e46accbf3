//! `council memory`: inspect and edit remembered facts.

use council_sessions::SessionStore;

use super::MemoryCommand;

pub fn run(store: &SessionStore, command: MemoryCommand) -> anyhow::Result<()> {
    match command {
        MemoryCommand::List => list(store),
        MemoryCommand::Add { fact } => {
            if store.add_memory(&fact)? {
                println!("Remembered.");
            } else {
                println!("Already known (or empty).");
            }
        }
        MemoryCommand::Forget { fact } => {
            if !store.forget_memory(&fact)? {
                anyhow::bail!("no such fact: {fact}");
            }
            println!("Forgotten.");
        }
        MemoryCommand::Clear => {
            store.clear_memory()?;
            println!("Memory cleared.");
        }
    }
    Ok(())
}

pub fn list(store: &SessionStore) {
    let memory = store.memory();
    if memory.is_empty() {
        println!("Nothing remembered yet.");
        return;
    }
    for fact in memory.facts() {
        println!("- {fact}");
    }
}
