//! Engine-level error kinds.
//!
//! Every recoverable failure leaves the engine exactly as it was before the
//! failing request; the dispatcher converts these into the wire-level error
//! updates of the Presenter contract. An exhausted history ring is *not* an
//! error: `reverse` on an empty ring is a silent no-op by contract.

use core_pattern::PatternError;
use core_rule::RuleError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("cannot jump backward: target {target} <= current generation {current}")]
    CannotJumpBackward { target: u64, current: u64 },
}
