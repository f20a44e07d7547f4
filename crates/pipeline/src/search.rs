//! First-match lookup over provider-ordered sequences.
//!
//! Status entries, workflow jobs and pull request comments are all searched
//! the same way: linearly, in the order the provider returned them, stopping
//! at the first hit. Later matches are never considered.

/// Returns the first item for which `predicate` holds, in iteration order.
pub fn find_first<I, P>(items: I, mut predicate: P) -> Option<I::Item>
where
    I: IntoIterator,
    P: FnMut(&I::Item) -> bool,
{
    items.into_iter().find(|item| predicate(item))
}
