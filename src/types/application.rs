use std::collections::HashMap;

use crate::types::element::{ElementId, PageElement};
use crate::types::error::CompileError;
use crate::types::lookup::LookupTable;
use crate::types::page::Page;

/// The compiled questionnaire: element arena, page ordering, globals,
/// lookup tables and workbook metadata.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Application {
    pub id: String,
    pub name: String,
    pub completion_action: Option<String>,
    pub active_page: Option<String>,
    pub note: Option<String>,
    pub imports: Vec<String>,

    arena: Vec<PageElement>,
    pages: Vec<Page>,
    globals: Vec<ElementId>,
    tables: HashMap<String, LookupTable>,
    emitted_alternates: Vec<String>,
}

impl Application {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            completion_action: None,
            active_page: None,
            note: None,
            imports: Vec::new(),
            arena: Vec::new(),
            pages: Vec::new(),
            globals: Vec::new(),
            tables: HashMap::new(),
            emitted_alternates: Vec::new(),
        }
    }

    // --- arena ---

    /// Move an element into the arena and return its index.
    pub fn alloc(&mut self, element: PageElement) -> ElementId {
        let id = ElementId(self.arena.len());
        self.arena.push(element);
        id
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> &PageElement {
        &self.arena[id.0]
    }

    pub fn element_mut(&mut self, id: ElementId) -> &mut PageElement {
        &mut self.arena[id.0]
    }

    #[must_use]
    pub fn arena(&self) -> &[PageElement] {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut [PageElement] {
        &mut self.arena
    }

    /// Link `child` under `parent`, setting the child's previous-sibling to
    /// the parent's current last child.
    pub fn link_child(&mut self, parent: ElementId, child: ElementId) {
        let previous = self.arena[parent.0].children.last().copied();
        self.arena[parent.0].children.push(child);
        let child_el = &mut self.arena[child.0];
        child_el.parent = Some(parent);
        child_el.previous_sibling = previous;
    }

    // --- pages and globals ---

    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Add an element to an existing page by index.
    pub fn add_element_to_page(&mut self, page: usize, id: ElementId) {
        self.pages[page].add_element(&self.arena, id);
    }

    pub fn add_global(&mut self, id: ElementId) {
        self.globals.push(id);
    }

    #[must_use]
    pub fn globals(&self) -> &[ElementId] {
        &self.globals
    }

    /// Search globals first, then every page, for an element id.
    #[must_use]
    pub fn find_element(&self, id: &str) -> Option<ElementId> {
        if id.is_empty() {
            return None;
        }
        if let Some(found) = self
            .globals
            .iter()
            .copied()
            .find(|g| self.arena[g.0].id == id)
        {
            return Some(found);
        }
        self.pages.iter().find_map(|p| p.find_element(id))
    }

    /// The master ordering of non-branch pages: each page with a
    /// display-after anchor slots in directly after it when the anchor is
    /// already placed and is not the current tail.
    ///
    /// # Errors
    ///
    /// [`CompileError::NoPages`] with no pages at all,
    /// [`CompileError::NoInitialPage`] when every page is a branch.
    pub fn page_item_list(&self) -> Result<Vec<String>, CompileError> {
        if self.pages.is_empty() {
            return Err(CompileError::NoPages);
        }
        let mut ordered: Vec<String> = Vec::new();
        for page in self.pages.iter().filter(|p| !p.branch) {
            match page
                .display_after
                .as_deref()
                .and_then(|after| ordered.iter().position(|id| id == after))
            {
                Some(pos) if pos + 1 < ordered.len() => ordered.insert(pos + 1, page.id.clone()),
                _ => ordered.push(page.id.clone()),
            }
        }
        if ordered.is_empty() {
            return Err(CompileError::NoInitialPage);
        }
        Ok(ordered)
    }

    // --- lookup tables ---

    pub fn add_table(&mut self, table: LookupTable) {
        self.tables.insert(table.id.clone(), table);
    }

    #[must_use]
    pub fn table(&self, id: &str) -> Option<&LookupTable> {
        self.tables.get(id)
    }

    /// Verify every referenced lookup-table id resolves.
    ///
    /// # Errors
    ///
    /// [`CompileError::UnknownLookupTable`] for the first dangling id.
    pub fn assign_tables(&self) -> Result<(), CompileError> {
        for element in &self.arena {
            if let Some(table_id) = &element.lookup_table_id {
                if !self.tables.contains_key(table_id) {
                    return Err(CompileError::UnknownLookupTable {
                        table: table_id.clone(),
                        element: element.id.clone(),
                        row: element.row,
                    });
                }
            }
        }
        Ok(())
    }

    /// Record an alternate-consequence id; returns `true` on first sight.
    /// Keeps one creation record per shared id no matter how many rows
    /// contribute values.
    pub fn first_alternate_use(&mut self, id: &str) -> bool {
        if self.emitted_alternates.iter().any(|seen| seen == id) {
            return false;
        }
        self.emitted_alternates.push(id.to_owned());
        true
    }
}
