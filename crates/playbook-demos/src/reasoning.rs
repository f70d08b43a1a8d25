// ABOUTME: Reasoning-style comparison: one question, three system prompts, three sequential calls.
// ABOUTME: Replies are printed under fixed labels in order; comparing them is left to the reader.

use std::io::Write;

use playbook_agent::ChatInvoker;

pub const MODEL_ID: &str = "amazon.nova-pro-v1:0";

pub const MAX_OUTPUT_TOKENS: u32 = 1000;

pub const TEST_QUESTION: &str = "Given the list of numbers [2, 3, 4, 5, 6], find all unique pairs whose sum is a prime number. Show your reasoning process.";

pub const ABOUT: &str = "This demo sends the same question to Amazon Nova Pro three times, once per reasoning style.
It requires AWS credentials (a profile or access keys) or a Bedrock API key, and access to amazon.nova-pro-v1:0.";

const INTERLEAVED_PROMPT: &str = "You are an AI agent that alternates between thinking and acting. \
    For each step: reason about which numbers might form pairs, simulate checking their sums, \
    observe whether the sum is prime, and repeat until all pairs are considered. \
    Present the answer at the end.";

const RECURSIVE_PROMPT: &str = "You are an AI agent that recursively breaks problems into smaller subproblems. \
    For each pair, calculate the sum, check if it is prime, and if not, move to the next pair. \
    Continue recursively until all pairs are tested, then list those whose sums are prime.";

const STAGED_PROMPT: &str = "You are an AI agent that solves problems in clearly defined stages. \
    Stage 1: List all possible pairs from the given numbers. \
    Stage 2: For each pair, calculate their sum. \
    Stage 3: Check which sums are prime numbers. \
    Stage 4: Present the pairs whose sums are prime.";

/// A way of instructing the model to reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningStyle {
    Interleaved,
    Recursive,
    Staged,
}

impl ReasoningStyle {
    /// Print order.
    pub const ALL: [ReasoningStyle; 3] = [
        ReasoningStyle::Interleaved,
        ReasoningStyle::Recursive,
        ReasoningStyle::Staged,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReasoningStyle::Interleaved => "Interleaved Thinking Output:",
            ReasoningStyle::Recursive => "Recursive Reasoning Output:",
            ReasoningStyle::Staged => "Multistage Reasoning Output:",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            ReasoningStyle::Interleaved => INTERLEAVED_PROMPT,
            ReasoningStyle::Recursive => RECURSIVE_PROMPT,
            ReasoningStyle::Staged => STAGED_PROMPT,
        }
    }
}

/// Ask `question` once per style, in order, printing each reply as it arrives.
/// The first failure aborts the remaining calls.
pub async fn compare<W: Write>(
    invoker: &ChatInvoker,
    question: &str,
    out: &mut W,
) -> anyhow::Result<Vec<(ReasoningStyle, String)>> {
    let mut replies = Vec::with_capacity(ReasoningStyle::ALL.len());

    for style in ReasoningStyle::ALL {
        tracing::info!(style = ?style, model = invoker.model_id(), "asking");
        let reply = invoker.ask(style.system_prompt(), question).await?;
        writeln!(out, "{}\n{}\n", style.label(), reply)?;
        replies.push((style, reply));
    }

    Ok(replies)
}
