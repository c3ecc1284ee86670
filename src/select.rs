//! Operator selection tokens and the subset they denote.

use crate::record::MailRecord;

/// Closed set of selection choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    LastOne,
    LastThree,
    All,
}

impl Choice {
    /// Map an operator token to a choice. Unknown tokens are `None`, never
    /// silently defaulted.
    pub fn parse(token: &str) -> Option<Choice> {
        match token {
            "1" => Some(Choice::LastOne),
            "2" => Some(Choice::LastThree),
            "3" => Some(Choice::All),
            _ => None,
        }
    }
}

/// The subset of `records` a choice denotes: a tail slice, original order
/// preserved.
pub fn select(records: &[MailRecord], choice: Choice) -> &[MailRecord] {
    let n = records.len();
    let take = match choice {
        Choice::LastOne => n.min(1),
        Choice::LastThree => n.min(3),
        Choice::All => n,
    };
    &records[n - take..]
}
