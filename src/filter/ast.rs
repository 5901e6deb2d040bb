//! Typed filter syntax tree.

use chrono::NaiveDate;

/// Comparison operator after translation.
///
/// The external `gt`/`lt` tokens map to `Ge`/`Le`: both bounds are
/// inclusive in this API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Ge,
    Le,
}

/// A single field comparison with its already-typed operand.
///
/// `Distance` is the external alias for the `running_distance` storage
/// column; the rewrite happens where the tree is compiled to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    Date(CmpOp, NaiveDate),
    Distance(CmpOp, i64),
    Time(CmpOp, i64),
}

/// Boolean combination of comparisons.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Cmp(Comparison),
    And(Box<FilterExpr>, Box<FilterExpr>),
}
