//! Prompt templates for the discussion flow.
//!
//! Text is kept in Chinese to match the stock participant backends; the
//! engine itself never inspects prompt content.

mod discussant;
mod recorder;

pub use discussant::DiscussionPrompt;
pub use recorder::RecorderPrompt;

/// Steering instructions injected into the discussant system prompt by
/// control commands.
pub mod injections {
    /// `@all` — fresh topic, drop prior context.
    pub const ALL: &str = "这是一个全新的讨论话题，请围绕它展开讨论，不要受之前讨论的限制。";
    /// `@深入` — multi-dimensional deep analysis.
    pub const DEEP: &str =
        "请深入分析以下观点，从多个维度（技术可行性、成本、时间、风险等）给出详细思考。";
    /// `@挑战` — critical review.
    pub const CHALLENGE: &str =
        "请从批判性角度审视以下想法，找出潜在的问题、风险、漏洞和不切实际的假设。请直言不讳。";
    /// `@总结` — produce the full summary.
    pub const SUMMARY: &str = "请输出完整的讨论记录摘要。";
}
