//! Deduplicated engine warnings.
//!
//! Malformed input is recovered, never rejected, so the parser and tokenizer
//! report what they recovered from here. Warnings are deduplicated on a
//! `(component, kind)` pair of static strings, so the set of reported keys is
//! bounded by the number of call sites no matter what the input contains.
//! Input-derived detail travels only as a structured `tracing` field.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

type WarningKey = (&'static str, &'static str);

/// Global set of warning kinds we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<WarningKey>>> = Mutex::new(None);

/// Warn about recovered input (emits once per component and kind).
///
/// `detail` is attached to the first event of each kind and is never stored.
///
/// # Example
/// ```
/// use sable_common::warning::{has_warned, warn_once};
///
/// warn_once("HTML Parser", "orphaned end tag", "span");
/// warn_once("HTML Parser", "orphaned end tag", "em");
/// assert!(has_warned("HTML Parser", "orphaned end tag"));
/// ```
pub fn warn_once(component: &'static str, kind: &'static str, detail: &str) {
    let first_time = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert((component, kind));

    if first_time {
        tracing::warn!(component, detail, "{kind}");
    }
}

/// Whether a warning of this kind has been emitted since the last
/// [`clear_warnings`].
#[must_use]
pub fn has_warned(component: &str, kind: &str) -> bool {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .is_some_and(|set| set.iter().any(|&(c, k)| c == component && k == kind))
}

/// Clear all recorded warnings (call before parsing an unrelated document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded_for(component: &str) -> usize {
        WARNED
            .lock()
            .unwrap()
            .as_ref()
            .map_or(0, |set| set.iter().filter(|&&(c, _)| c == component).count())
    }

    #[test]
    fn test_warn_once_deduplicates_on_kind() {
        warn_once("Dedup", "repeated kind", "first");
        warn_once("Dedup", "repeated kind", "second");
        assert!(has_warned("Dedup", "repeated kind"));
        assert_eq!(recorded_for("Dedup"), 1);
    }

    #[test]
    fn test_distinct_details_do_not_grow_the_set() {
        for i in 0..1_000 {
            warn_once("Bounded", "hostile tag", &format!("x-{i}"));
        }
        assert_eq!(recorded_for("Bounded"), 1);
    }

    #[test]
    fn test_same_kind_different_component() {
        warn_once("A", "component scoped kind", "");
        warn_once("B", "component scoped kind", "");
        assert!(has_warned("A", "component scoped kind"));
        assert!(has_warned("B", "component scoped kind"));
        assert!(!has_warned("C", "component scoped kind"));
    }
}
