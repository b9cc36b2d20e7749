use std::collections::HashMap;

use crate::types::element::{ElementId, PageElement};

/// A visibility scope governed by a page or branch element.
///
/// The governing element is the page's first member. Visibility is fixed at
/// construction: a governing element that carries a clause opens hidden and
/// is shown by its emitted records.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page {
    pub id: String,
    pub visible: bool,
    pub branch: bool,
    /// Id of the item this page slots in after, for master-list ordering.
    pub display_after: Option<String>,
    governing: ElementId,
    elements: Vec<ElementId>,
    index: HashMap<String, ElementId>,
}

impl Page {
    /// Build the page around its governing element, consuming the element's
    /// post-label as the display-after anchor. A hidden page with no stated
    /// anchor defaults to following the previous page.
    #[must_use]
    pub fn new(
        arena: &mut [PageElement],
        governing: ElementId,
        previous_page_id: Option<&str>,
    ) -> Self {
        let element = &mut arena[governing.0];
        let mut page = Self {
            id: element.id.clone(),
            visible: element.row_clause().is_none(),
            branch: element.is_branch_page(),
            display_after: element.post_label.take(),
            governing,
            elements: Vec::new(),
            index: HashMap::new(),
        };
        if page.display_after.is_none() && !page.visible {
            page.display_after = previous_page_id.map(str::to_owned);
        }
        page.add_element(arena, governing);
        page
    }

    #[must_use]
    pub fn governing_element(&self) -> ElementId {
        self.governing
    }

    #[must_use]
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    /// Add an element to this page. Repeating references are skipped; their
    /// master definition already belongs to a page.
    pub fn add_element(&mut self, arena: &[PageElement], id: ElementId) {
        let element = &arena[id.0];
        if element.is_repeating() {
            tracing::warn!(page = %self.id, element = %element.id, "skipping repeating element");
            return;
        }
        if let Some(table_id) = &element.lookup_table_id {
            self.index.insert(table_id.clone(), id);
        }
        self.index.insert(element.id.clone(), id);
        self.elements.push(id);
    }

    /// Look an id up on this page only. The index also answers lookup-table
    /// ids with the element that uses the table.
    #[must_use]
    pub fn find_element(&self, id: &str) -> Option<ElementId> {
        self.index.get(id).copied()
    }
}
