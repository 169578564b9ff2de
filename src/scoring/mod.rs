//! Judgment score fusion: boundary decoding, feedback adjustment,
//! fallback policy, and the async scoring pipeline.
//!
//! ## Data Flow
//!
//! ```text
//! provider JSON ──decode──> JudgmentResult ──adjust──> FinalJudgment
//!       │ (failure/timeout)                  │ (failure)
//!       └──> fallback: Rejected, xp = 0      └──> zero deltas, pass-through
//! ```
//!
//! The intelligence lives in the external provider; this module's job is
//! contract enforcement — coercion, clamping, bounded rewards, and a
//! deterministic degraded path that never throws.

mod fallback;
mod feedback;
mod judgment;
mod pipeline;

pub use fallback::{
    baseline_quest, needs_review_verdict, rejected_judgment, ModerationAction, ModerationVerdict,
};
pub use feedback::{adjust, FeedbackInput, FinalJudgment, ScoreAdjustments};
pub use judgment::{parse_raw, score, JudgmentResult, JudgmentStatus, QuestLog, QuestPlan};
pub use pipeline::ScoringPipeline;
