//! Scope-hierarchy access rules.
//!
//! The privilege order is `admin > manager > user`. All checks are pure
//! functions over scope sets so the policy can be tested without any
//! transport or storage in the picture.

use super::user::{Scope, ScopeSet};

/// Whether `actor` may modify or expire `target`.
///
/// Rules, in order:
/// - an actor may always act on themselves;
/// - an admin may act on anyone;
/// - a manager may act on any target that holds neither `manager` nor
///   `admin`;
/// - a plain user may act on nobody else.
pub fn can_act_on(actor: &ScopeSet, target: &ScopeSet, is_self: bool) -> bool {
    if is_self {
        return true;
    }
    match actor.highest() {
        Some(Scope::Admin) => true,
        Some(Scope::Manager) => target.highest().map_or(true, |t| t < Scope::Manager),
        _ => false,
    }
}

/// Whether `actor` may list user accounts at all.
pub fn is_privileged(actor: &ScopeSet) -> bool {
    actor.contains(Scope::Manager) || actor.contains(Scope::Admin)
}

/// Whether `actor` sees every account when listing users.
///
/// Managers pass the listing gate but only see user-scoped accounts; this is
/// a data-visibility rule on the query, not just an action gate.
pub fn sees_all_users(actor: &ScopeSet) -> bool {
    actor.contains(Scope::Admin)
}
