// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Common instruction appended to prompts that rely on Google Search grounding.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Base every figure on current information found through search. \
    Do NOT invent salary numbers or hiring locations. \
    If recent data is unavailable, give your best conservative estimate rather than omitting the field.";
