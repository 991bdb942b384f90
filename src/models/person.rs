use serde::Serialize;

/// A roster member. `id` is the external identifier printed on the badge.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub cohort: String, // e.g. year level
    pub group: String,  // e.g. program / course
}

impl Person {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cohort: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cohort: cohort.into(),
            group: group.into(),
        }
    }

    /// Case-folded substring match on id, name, cohort or group.
    /// `needle` must already be lowercase; an empty needle always matches.
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.id.to_lowercase().contains(needle)
            || self.name.to_lowercase().contains(needle)
            || self.cohort.to_lowercase().contains(needle)
            || self.group.to_lowercase().contains(needle)
    }
}
