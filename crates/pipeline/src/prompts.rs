//! Prompt text for the refinement and synthesis stages.

use council_domain::turn::PendingAttachment;

/// Marker that separates an agent's own answer from its peers' answers.
pub const PEERS_HEADER: &str = "The other agents answered:";

/// Restate the user's request for stages that do not see the current turn.
pub fn request_context(user_text: &str, attachment: Option<&PendingAttachment>) -> String {
    let mut out = String::from("The user's request was:\n");
    if let Some(att) = attachment {
        out.push_str(&att.describe());
        out.push('\n');
    }
    let text = user_text.trim();
    if text.is_empty() {
        out.push_str("(no text, only the attached file)");
    } else {
        out.push_str(text);
    }
    out
}

/// Refinement prompt for `agent`: its own initial answer, then every other
/// agent's answer in agent order.
pub fn refinement_prompt(context: &str, agent: usize, initial: &[String]) -> String {
    let mut out = format!(
        "{context}\n\nYour initial answer was:\n{}\n\n{PEERS_HEADER}\n",
        initial[agent]
    );
    for (i, answer) in initial.iter().enumerate().filter(|(i, _)| *i != agent) {
        out.push_str(&format!("\nAgent {}:\n{answer}\n", i + 1));
    }
    out.push_str(
        "\nCompare your answer with theirs, fix any mistakes, adopt anything \
         they got right that you missed, and reply with your improved answer.",
    );
    out
}

/// Synthesis prompt listing every refined answer, labeled from 1.
pub fn synthesis_prompt(context: &str, refined: &[String]) -> String {
    let mut out = format!(
        "{context}\n\nHere are {} refined responses from different agents:\n",
        refined.len()
    );
    for (i, answer) in refined.iter().enumerate() {
        out.push_str(&format!("\nResponse {}:\n{answer}\n", i + 1));
    }
    out.push_str(
        "\nWrite the single best final answer to the user's request. \
         Do not critique or compare the responses; answer the user directly.",
    );
    out
}
