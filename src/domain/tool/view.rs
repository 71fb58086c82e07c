//! Presentation-side views over a tool snapshot.
//!
//! Sorting and filtering are view concerns. They never reorder the stored
//! collection; they produce a new ordering of borrowed entries.

use super::Tool;

/// Ordering applied by a `ToolQuery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolSort {
    /// Keep collection (insertion) order.
    #[default]
    Insertion,
    NameAscending,
    NameDescending,
}

/// Text filter plus ordering for rendering the tool list.
#[derive(Debug, Clone, Default)]
pub struct ToolQuery {
    search: Option<String>,
    sort: ToolSort,
}

impl ToolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring filter over name and description.
    /// A blank term disables filtering.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into().trim().to_lowercase();
        self.search = if term.is_empty() { None } else { Some(term) };
        self
    }

    pub fn sort(mut self, sort: ToolSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, tool: &Tool) -> bool {
        match &self.search {
            None => true,
            Some(term) => {
                tool.name.to_lowercase().contains(term)
                    || tool.description.to_lowercase().contains(term)
            }
        }
    }

    pub fn apply<'a>(&self, tools: &'a [Tool]) -> Vec<&'a Tool> {
        let mut view: Vec<&Tool> = tools.iter().filter(|t| self.matches(t)).collect();
        match self.sort {
            ToolSort::Insertion => {}
            // Stable sort keeps insertion order among equal names.
            ToolSort::NameAscending => view.sort_by_key(|t| t.name.to_lowercase()),
            ToolSort::NameDescending => {
                view.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()))
            }
        }
        view
    }
}
