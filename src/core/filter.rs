//! Search/status projection over a list of entries.

use crate::models::entry::EntryView;
use crate::models::person::Person;
use crate::models::status::StatusFilter;

/// Entries whose status passes `status` and whose person matches `search`
/// (case-folded substring of id, name, cohort or group; empty matches all).
///
/// Lazy and restartable: clone the iterator to walk it again. Input order is
/// preserved.
pub fn filter_entries<'a>(
    entries: &'a [EntryView],
    search: &str,
    status: StatusFilter,
) -> impl Iterator<Item = &'a EntryView> + Clone + use<'a> {
    let needle = search.to_lowercase();
    entries
        .iter()
        .filter(move |v| status.matches(v.entry.status) && v.person.matches_search(&needle))
}

/// Roster search with the same matching rules.
pub fn filter_persons<'a>(
    persons: &'a [Person],
    search: &str,
) -> impl Iterator<Item = &'a Person> + Clone + use<'a> {
    let needle = search.to_lowercase();
    persons.iter().filter(move |p| p.matches_search(&needle))
}
