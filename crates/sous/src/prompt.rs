//! The fixed system prompt describing assistant behavior and tool policy.

use crate::systems::System;

/// Base policy for the assistant. Per-system instructions are appended by
/// `build_system_prompt`, so the history itself never carries a system
/// message and re-running a conversation cannot duplicate one.
pub const SYSTEM_PROMPT: &str = "\
You are a recipe assistant. Use the available tools whenever the user asks \
about their pantry or about recipes, and prefer searching stored recipes \
before inventing new ones.

Your reply must be plain text only: no tool names, no JSON, no code, and no \
narration of which tools you are about to call. Perform the actions \
silently, then write a short natural answer describing the outcome.

When the user asks for several actions, do all of them in order and reply \
once with the combined result. Only the tools know the current pantry and \
recipes: always consult them instead of relying on earlier conversation, \
and when listing pantry items report exactly what the list tool returned.";

/// Compose the prompt sent out-of-band with every completion request.
pub fn build_system_prompt(systems: &[Box<dyn System>]) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);
    for system in systems {
        let instructions = system.instructions();
        if !instructions.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(instructions);
        }
    }
    prompt
}
