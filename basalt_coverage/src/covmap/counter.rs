//! Counters and counter expressions.
//!
//! The mapping format describes every region's count as a *counter term*:
//! a physical counter slot, a node of a per-function expression table, or
//! the constant zero. Expression tables let the format derive counts
//! without spending a slot on them; this backend only ever emits pairwise
//! sums, built once per function by [`sum_counters`].

use crate::region::CounterId;

/// Number of low bits holding a counter term's kind tag on the wire.
const TAG_BITS: u64 = 2;

/// A counter term referenced by a mapping region or expression operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// The constant zero.
    Zero,
    /// A physical counter slot.
    CounterRef(CounterId),
    /// A node of the function's expression table.
    ExpressionRef(u32),
}

impl Counter {
    /// Encode the term for ULEB128 emission.
    ///
    /// Layout: kind tag in the low two bits, operand index above. Tags are
    /// 0 (zero), 1 (counter slot), 2 (subtraction expression), and
    /// 3 (addition expression); expression tags need the table to pick
    /// between 2 and 3.
    #[must_use]
    pub(crate) fn encode(self, expressions: &[CounterExpression]) -> u64 {
        match self {
            Counter::Zero => 0,
            Counter::CounterRef(id) => 1 | (u64::from(id.index()) << TAG_BITS),
            Counter::ExpressionRef(index) => {
                let tag = match expressions[index as usize].kind {
                    ExprKind::Subtract => 2,
                    ExprKind::Add => 3,
                };
                tag | (u64::from(index) << TAG_BITS)
            }
        }
    }
}

/// Operator of an expression table node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKind {
    /// `lhs - rhs`.
    Subtract,
    /// `lhs + rhs`.
    Add,
}

/// One node of a function's expression table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterExpression {
    /// Operator.
    pub kind: ExprKind,
    /// Left operand.
    pub lhs: Counter,
    /// Right operand.
    pub rhs: Counter,
}

/// An immutable expression table plus the term naming its root.
///
/// Built in one shot and never modified afterwards; both the encoder and
/// any diagnostics read the same tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionTree {
    /// Expression table in operand-before-use order.
    pub expressions: Vec<CounterExpression>,
    /// The term for the combined total.
    pub root: Counter,
}

/// Pairwise-sum a function's counters into an expression tree.
///
/// No counters yields a zero root and an empty table; a single counter is
/// its own root. Otherwise each step adds the next counter to the running
/// total, so n counters produce n-1 addition nodes.
#[must_use]
pub fn sum_counters(counters: &[CounterId]) -> ExpressionTree {
    match counters {
        [] => ExpressionTree {
            expressions: Vec::new(),
            root: Counter::Zero,
        },
        [only] => ExpressionTree {
            expressions: Vec::new(),
            root: Counter::CounterRef(*only),
        },
        [first, rest @ ..] => {
            let mut expressions = Vec::with_capacity(rest.len());
            let mut total = Counter::CounterRef(*first);
            for counter in rest {
                expressions.push(CounterExpression {
                    kind: ExprKind::Add,
                    lhs: total,
                    rhs: Counter::CounterRef(*counter),
                });
                total = Counter::ExpressionRef(expressions.len() as u32 - 1);
            }
            ExpressionTree {
                expressions,
                root: total,
            }
        }
    }
}
