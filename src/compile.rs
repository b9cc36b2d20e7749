//! Tree builder: turns depth-annotated item rows and lookup-table rows into
//! a linked [`Application`].

use std::collections::HashMap;

use crate::types::{
    Application, ApplicationMeta, ClauseCells, CompileError, ConditionClause, ConditionKind,
    ElementCondition, ElementId, ElementType, ListEntry, LookupTable, Page, PageElement, Row,
    TableRow,
};

/// Compile pre-mapped workbook rows into an application tree.
///
/// Lookup-table rows are processed first, then item rows in order; the
/// result is verified (lookup references, among others) before returning.
///
/// # Errors
///
/// The first [`CompileError`] encountered; compilation does not continue
/// past an error.
pub fn compile(
    meta: ApplicationMeta,
    tables: &[TableRow],
    rows: &[Row],
) -> Result<Application, CompileError> {
    let mut app = Application::new(meta.id, meta.name);
    app.completion_action = meta.completion_action;
    app.active_page = meta.active_page;
    app.note = meta.note;
    app.imports = meta.imports;

    compile_tables(&mut app, tables)?;

    let mut builder = TreeBuilder::new(app);
    for row in rows {
        builder.process_row(row)?;
    }
    let app = builder.finish();
    app.assign_tables()?;
    Ok(app)
}

fn compile_tables(app: &mut Application, rows: &[TableRow]) -> Result<(), CompileError> {
    let mut current: Option<LookupTable> = None;
    for row in rows {
        if let Some(table_id) = &row.table_id {
            if let Some(done) = current.take() {
                app.add_table(done);
            }
            current = Some(LookupTable::new(table_id.clone()));
            continue;
        }
        let Some(value) = &row.value else {
            if row.clause.is_empty() {
                continue;
            }
            // A clause with no value would be a second clause for the
            // previous entry; entries take exactly one.
            return Err(CompileError::MultiClauseTableEntry { row: row.row });
        };
        let Some(table) = current.as_mut() else {
            return Err(CompileError::OrphanTableRow { row: row.row });
        };
        let mut entry = ListEntry::new(value.clone(), row.label.clone(), row.row);
        if !row.clause.is_empty() {
            entry = entry.conditional(typed_clause(&row.clause, row.row)?);
        }
        table.push(entry);
    }
    if let Some(done) = current.take() {
        app.add_table(done);
    }
    Ok(())
}

/// Parse raw clause cells into a typed clause. A missing operation keyword
/// defaults to equality; the value keyword `empty` compares against "no
/// answer".
fn typed_clause(cells: &ClauseCells, row: u32) -> Result<ConditionClause, CompileError> {
    let op = crate::types::ClauseOp::from_keyword(cells.operation.as_deref()).ok_or_else(|| {
        CompileError::UnknownOperator {
            keyword: cells.operation.clone().unwrap_or_default(),
            row,
        }
    })?;
    let value = cells
        .value
        .as_deref()
        .filter(|v| !v.eq_ignore_ascii_case("empty"));
    Ok(ConditionClause::new(
        cells.subject.as_deref().unwrap_or_default(),
        cells.attribute.as_deref().unwrap_or_default(),
        op,
        value,
    ))
}

struct TreeBuilder {
    app: Application,
    /// Element governing each depth; index `d - 1` holds depth `d`.
    stack: Vec<ElementId>,
    /// Page index (into the application's page list) at each depth.
    page_stack: Vec<usize>,
    current_page: Option<usize>,
    current_depth: usize,
    /// The element the next continuation row's clause applies to.
    last_real: Option<ElementId>,
    seen_ids: HashMap<String, u32>,
}

impl TreeBuilder {
    fn new(app: Application) -> Self {
        Self {
            app,
            stack: Vec::new(),
            page_stack: Vec::new(),
            current_page: None,
            current_depth: 1,
            last_real: None,
            seen_ids: HashMap::new(),
        }
    }

    fn finish(self) -> Application {
        self.app
    }

    fn process_row(&mut self, row: &Row) -> Result<(), CompileError> {
        let placed = if row.id.is_some() {
            let element = self.build_element(row)?;
            let id = self.place_element(element, row)?;
            self.last_real = Some(id);
            Some(id)
        } else {
            None
        };

        if row.clause.is_empty() {
            return Ok(());
        }
        let Some(target) = self.last_real else {
            return Ok(());
        };
        // A functional consequence's own clause cells are its aggregation
        // spec and stay raw on the element.
        if placed.is_some()
            && self.app.element(target).element_type == ElementType::FunctionalImpact
        {
            return Ok(());
        }
        self.process_clause(target, placed.is_some(), row)
    }

    /// Stage an element from an id-bearing row.
    fn build_element(&mut self, row: &Row) -> Result<PageElement, CompileError> {
        let id = row.id.as_deref().unwrap_or_default().trim().to_owned();
        if id.contains(char::is_whitespace) {
            return Err(CompileError::WhitespaceId { id, row: row.row });
        }
        let keyword = row
            .type_keyword
            .as_deref()
            .ok_or_else(|| CompileError::MissingType {
                id: id.clone(),
                row: row.row,
            })?;
        let element_type =
            ElementType::from_keyword(keyword).ok_or_else(|| CompileError::UnknownType {
                keyword: keyword.to_owned(),
                row: row.row,
            })?;

        // Alternate consequences share one id across their value rows, and
        // a repeating reference reuses the id of the element it repeats.
        match element_type {
            ElementType::AlternateImpact => {
                self.seen_ids.entry(id.clone()).or_insert(row.row);
            }
            ElementType::Reuse => {
                if !self.seen_ids.contains_key(&id) {
                    return Err(CompileError::UnknownRepeatTarget { id, row: row.row });
                }
            }
            _ => {
                if let Some(&first) = self.seen_ids.get(&id) {
                    return Err(CompileError::DuplicateId {
                        id,
                        row: row.row,
                        first,
                    });
                }
                self.seen_ids.insert(id.clone(), row.row);
            }
        }

        let mut element = PageElement::new(id, element_type, row.depth, row.row);
        element.answer_kind = crate::types::AnswerKind::from_keyword(row.field_type.as_deref());
        element.required = row
            .required
            .as_deref()
            .is_some_and(|r| r.trim().to_ascii_uppercase().starts_with('Y'));
        element.pre_label = row.pre_label.clone();
        element.post_label = row.post_label.clone();
        element.default_value = row.default_value.clone();
        element.styles = row.styles.clone();
        element.category = row.category.clone();
        element.lookup_table_id = row.lookup_table.clone();
        for group in &row.groups {
            element.add_group_id(group);
        }
        if !row.clause.is_empty() {
            // First attachment on a fresh element cannot fail.
            let _ = element.set_row_clause(row.clause.clone());
        }

        self.inherit_consequence_condition(&mut element, row)?;
        Ok(element)
    }

    /// A consequence row with no clause of its own clones the nearest
    /// conditioned ancestor's condition (depth stack outward, then the page
    /// governing element).
    fn inherit_consequence_condition(
        &self,
        element: &mut PageElement,
        row: &Row,
    ) -> Result<(), CompileError> {
        if !element.element_type.is_consequence() || element.row_clause().is_some() {
            return Ok(());
        }
        let Some(page) = self.current_page else {
            // No page yet: the element becomes a global and needs none.
            return Ok(());
        };
        let mut depth = self.current_depth;
        while depth > 0 {
            if let Some(&ancestor) = self.stack.get(depth - 1) {
                if let Some(cond) = self.app.element(ancestor).condition() {
                    element.inherit_condition(cond.clone());
                    return Ok(());
                }
            }
            depth -= 1;
        }
        let governing = self.app.pages()[page].governing_element();
        if let Some(cond) = self.app.element(governing).condition() {
            element.inherit_condition(cond.clone());
            return Ok(());
        }
        Err(CompileError::UnconditionedConsequence {
            id: element.id.clone(),
            row: row.row,
        })
    }

    /// Port of the depth-stack placement: consequences and validations hang
    /// off the current scope without entering the stack, pages open scopes,
    /// everything else nests under the element one level up.
    fn place_element(
        &mut self,
        element: PageElement,
        row: &Row,
    ) -> Result<ElementId, CompileError> {
        let depth = element.depth;
        if depth < 1 || depth > self.stack.len() + 1 {
            return Err(CompileError::DepthJump {
                depth,
                have: self.stack.len(),
                row: row.row,
            });
        }

        // A validation annotates the question above it; nesting one deeper
        // must not bridge with a group that would display nothing.
        if element.element_type.is_consequence() || element.element_type == ElementType::Validation
        {
            let id = self.app.alloc(element);
            let Some(page) = self.current_page else {
                self.app.add_global(id);
                return Ok(id);
            };
            let parent = if depth == 1 {
                self.app.pages()[page].governing_element()
            } else {
                self.stack[depth - 2]
            };
            self.app.link_child(parent, id);
            self.app.add_element_to_page(page, id);
            return Ok(id);
        }

        // Nesting under a non-group at a deeper level needs a bridge group.
        if depth > 1 && depth > self.current_depth && !element.is_branch_page() {
            if let Some(&top) = self.stack.get(self.current_depth - 1) {
                if self.app.element(top).element_type != ElementType::Group {
                    self.make_implicit_group(row.row)?;
                }
            }
        }

        let is_page = element.element_type.is_page();
        let previous_page_id = self
            .current_page
            .map(|p| self.app.pages()[p].id.clone());

        if !is_page && self.stack.is_empty() {
            // Item rows with no page at all get a synthesized one.
            let master = self
                .app
                .alloc(PageElement::new("DefaultPage", ElementType::Page, 0, 0));
            let page = Page::new(self.app.arena_mut(), master, previous_page_id.as_deref());
            self.app.add_page(page);
            self.current_page = Some(self.app.pages().len() - 1);
        }

        let id = self.app.alloc(element);

        if is_page {
            let page = Page::new(self.app.arena_mut(), id, previous_page_id.as_deref());
            self.app.add_page(page);
            self.current_page = Some(self.app.pages().len() - 1);
        }

        let page = self
            .current_page
            .expect("every placed element has a page by now");
        if depth > self.stack.len() {
            self.stack.push(id);
            self.page_stack.push(page);
        } else {
            self.stack[depth - 1] = id;
            self.stack.truncate(depth);
            self.page_stack.truncate(depth);
            if is_page {
                self.page_stack[depth - 1] = page;
            } else {
                self.current_page = Some(self.page_stack[depth - 1]);
            }
        }

        if !is_page {
            let page = self.current_page.expect("checked above");
            self.app.add_element_to_page(page, id);
            let parent = if depth == 1 {
                self.app.pages()[page].governing_element()
            } else {
                self.stack[depth - 2]
            };
            self.app.link_child(parent, id);
        }
        self.current_depth = depth;
        Ok(id)
    }

    fn make_implicit_group(&mut self, row: u32) -> Result<(), CompileError> {
        let top = self.stack[self.current_depth - 1];
        let group_id = format!("{}_CHILDREN", self.app.element(top).id);
        tracing::warn!(group = %group_id, depth = self.current_depth, "creating intermediate group");
        let group = self.app.alloc(PageElement::new(
            group_id,
            ElementType::Group,
            self.current_depth,
            row,
        ));
        let page = self
            .current_page
            .expect("implicit groups only arise inside a page");
        let parent = if self.current_depth == 1 {
            self.app.pages()[page].governing_element()
        } else {
            self.stack[self.current_depth - 2]
        };
        self.app.add_element_to_page(page, group);
        self.app.link_child(parent, group);
        self.stack[self.current_depth - 1] = group;
        Ok(())
    }

    /// Fold a row's clause cells into the target element's condition,
    /// opening the condition on the first clause-bearing row.
    fn process_clause(
        &mut self,
        target: ElementId,
        own_row: bool,
        row: &Row,
    ) -> Result<(), CompileError> {
        let mut clause = typed_clause(&row.clause, row.row)?;

        let element_type = self.app.element(target).element_type;
        if own_row && element_type.is_consequence() {
            // A consequence stating its own condition stands alone; it must
            // not depend on its parent being visible.
            self.app.element_mut(target).required = true;
        }

        if self.app.element(target).condition().is_none() {
            let condition = if element_type == ElementType::Validation {
                ElementCondition::new(
                    self.app.element(target).id.clone(),
                    ConditionKind::Validation,
                    row.row,
                )
            } else if element_type.is_page() {
                let page = &self.app.pages()[self
                    .current_page
                    .expect("a page element always has a current page")];
                ElementCondition::for_page(
                    self.app.element(target).id.clone(),
                    row.row,
                    page.id.clone(),
                    page.branch,
                    page.display_after.clone(),
                )
            } else if element_type == ElementType::AlternateImpact {
                clause.explanation = row.post_label.clone();
                ElementCondition::new(
                    format!("{}{}", self.app.element(target).id, row.row),
                    ConditionKind::Inclusion,
                    row.row,
                )
            } else {
                ElementCondition::new(
                    self.app.element(target).id.clone(),
                    ConditionKind::Inclusion,
                    row.row,
                )
            };
            if self.app.element_mut(target).set_condition(condition).is_err() {
                return Err(CompileError::ConditionReattached {
                    id: self.app.element(target).id.clone(),
                    row: row.row,
                });
            }
        } else if own_row {
            return Err(CompileError::ConditionReattached {
                id: self.app.element(target).id.clone(),
                row: row.row,
            });
        }

        let _ = clause.mark_processed();
        self.app
            .element_mut(target)
            .condition_mut()
            .expect("condition was just ensured")
            .push_clause(clause);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClauseOp;

    fn meta() -> ApplicationMeta {
        ApplicationMeta::new("app1", "Test Application")
    }

    fn q(row: u32, depth: usize, id: &str) -> Row {
        Row::element(row, depth, id, "Question").field_type("text")
    }

    #[test]
    fn pages_scope_their_elements() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 1, "p2", "Page"),
            q(4, 1, "q2"),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        assert_eq!(app.pages().len(), 2);
        let p1 = &app.pages()[0];
        assert!(p1.find_element("q1").is_some());
        assert!(p1.find_element("q2").is_none());
        let q1 = p1.find_element("q1").unwrap();
        assert_eq!(app.element(q1).parent, Some(p1.governing_element()));
    }

    #[test]
    fn nesting_follows_depth() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            Row::element(2, 1, "g1", "Group"),
            q(3, 2, "q1"),
            q(4, 2, "q2"),
            q(5, 1, "q3"),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        let g1 = app.find_element("g1").unwrap();
        let children: Vec<&str> = app
            .element(g1)
            .children
            .iter()
            .map(|c| app.element(*c).id.as_str())
            .collect();
        assert_eq!(children, vec!["q1", "q2"]);
        let q2 = app.find_element("q2").unwrap();
        let q1 = app.find_element("q1").unwrap();
        assert_eq!(app.element(q2).previous_sibling, Some(q1));
        // q3 pops back to depth 1, under the page itself
        let q3 = app.find_element("q3").unwrap();
        let page_el = app.pages()[0].governing_element();
        assert_eq!(app.element(q3).parent, Some(page_el));
    }

    #[test]
    fn deepening_under_a_question_bridges_with_implicit_group() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            q(3, 2, "q2"),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        let bridge = app.find_element("q1_CHILDREN").unwrap();
        assert_eq!(app.element(bridge).element_type, ElementType::Group);
        let q2 = app.find_element("q2").unwrap();
        assert_eq!(app.element(q2).parent, Some(bridge));
    }

    #[test]
    fn missing_page_is_synthesized() {
        let rows = vec![q(1, 1, "q1")];
        let app = compile(meta(), &[], &rows).unwrap();
        assert_eq!(app.pages()[0].id, "DefaultPage");
        assert!(app.pages()[0].find_element("q1").is_some());
    }

    #[test]
    fn depth_jump_is_an_error() {
        let rows = vec![Row::element(1, 1, "p1", "Page"), q(2, 3, "q1")];
        let err = compile(meta(), &[], &rows).unwrap_err();
        assert!(matches!(err, CompileError::DepthJump { depth: 3, row: 2, .. }));
    }

    #[test]
    fn id_hygiene() {
        let err = compile(meta(), &[], &[Row::element(1, 1, "bad id", "Page")]).unwrap_err();
        assert!(matches!(err, CompileError::WhitespaceId { .. }));

        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            q(3, 1, "q1"),
        ];
        let err = compile(meta(), &[], &rows).unwrap_err();
        assert!(matches!(
            err,
            CompileError::DuplicateId { row: 3, first: 2, .. }
        ));
    }

    #[test]
    fn type_keyword_is_mandatory_and_checked() {
        let mut row = Row::continuation(1);
        row.id = Some("x".into());
        row.depth = 1;
        let err = compile(meta(), &[], &[row]).unwrap_err();
        assert!(matches!(err, CompileError::MissingType { .. }));

        let err = compile(meta(), &[], &[Row::element(1, 1, "x", "Widget")]).unwrap_err();
        assert!(matches!(err, CompileError::UnknownType { .. }));
    }

    #[test]
    fn continuation_rows_extend_the_condition() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 1, "g1", "Group").condition("q1", "answer", Some("is"), Some("yes")),
            Row::continuation(4).condition("q1", "answered", None, Some("true")),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        let g1 = app.find_element("g1").unwrap();
        let cond = app.element(g1).condition().unwrap();
        assert_eq!(cond.kind, ConditionKind::Inclusion);
        assert_eq!(cond.clauses().len(), 2);
        assert_eq!(cond.clauses()[1].attribute, "answered");
        assert!(cond.clauses().iter().all(ConditionClause::is_processed));
    }

    #[test]
    fn page_condition_records_page_linkage() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 1, "p2", "Branch")
                .post_label("q1")
                .condition("q1", "answer", Some("is"), Some("yes")),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        let p2 = app.find_element("p2").unwrap();
        let cond = app.element(p2).condition().unwrap();
        assert_eq!(cond.page_id.as_deref(), Some("p2"));
        assert!(cond.branch);
        assert_eq!(cond.display_after.as_deref(), Some("q1"));
    }

    #[test]
    fn validation_rows_open_a_validation_condition() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 2, "v1", "Validation")
                .pre_label("Too large")
                .condition("q1", "answer", Some(">"), Some("10")),
            Row::continuation(4).condition("q1", "answered", None, Some("true")),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        let v1 = app.find_element("v1").unwrap();
        let cond = app.element(v1).condition().unwrap();
        assert_eq!(cond.kind, ConditionKind::Validation);
        assert_eq!(cond.clauses().len(), 2);
    }

    #[test]
    fn nested_validation_hangs_off_the_question_without_a_bridge_group() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 2, "v1", "Validation")
                .pre_label("Too large")
                .condition("q1", "answer", Some(">"), Some("10")),
            q(4, 1, "q2"),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        assert!(app.find_element("q1_CHILDREN").is_none());
        let v1 = app.find_element("v1").unwrap();
        let q1 = app.find_element("q1").unwrap();
        assert_eq!(app.element(v1).parent, Some(q1));
        // the validation never entered the depth stack
        let q2 = app.find_element("q2").unwrap();
        let page_el = app.pages()[0].governing_element();
        assert_eq!(app.element(q2).parent, Some(page_el));
    }

    #[test]
    fn consequence_without_page_becomes_global() {
        let rows = vec![Row::element(1, 1, "imp1", "Impact").default_value("42")];
        let app = compile(meta(), &[], &rows).unwrap();
        assert_eq!(app.globals().len(), 1);
        assert!(app.pages().is_empty());
    }

    #[test]
    fn consequence_inherits_nearest_condition() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 1, "g1", "Group").condition("q1", "answer", Some("is"), Some("yes")),
            Row::element(4, 2, "imp1", "Impact").default_value("done"),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        let imp = app.find_element("imp1").unwrap();
        let cond = app.element(imp).condition().unwrap();
        assert_eq!(cond.clauses()[0].subject, "q1");
        // hangs off the group, outside the depth stack
        let g1 = app.find_element("g1").unwrap();
        assert_eq!(app.element(imp).parent, Some(g1));
    }

    #[test]
    fn consequence_with_no_inheritable_condition_fails() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 2, "imp1", "Impact"),
        ];
        let err = compile(meta(), &[], &rows).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnconditionedConsequence { row: 3, .. }
        ));
    }

    #[test]
    fn conditioned_consequence_is_forced_required() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 1, "imp1", "Impact")
                .default_value("x")
                .condition("q1", "answer", Some("is"), Some("yes")),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        let imp = app.find_element("imp1").unwrap();
        assert!(app.element(imp).required);
        assert_eq!(app.element(imp).condition().unwrap().clauses().len(), 1);
    }

    #[test]
    fn alternate_rows_share_an_id_with_per_row_conditions() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 1, "disc1", "AlternateImpact")
                .default_value("low")
                .post_label("because low")
                .condition("q1", "answer", Some("is"), Some("a")),
            Row::element(4, 1, "disc1", "AlternateImpact")
                .default_value("high")
                .condition("q1", "answer", Some("is"), Some("b")),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        // the second row produced its own element with its own condition id
        let page = &app.pages()[0];
        let alternates: Vec<_> = page
            .elements()
            .iter()
            .filter(|e| app.element(**e).element_type == ElementType::AlternateImpact)
            .collect();
        assert_eq!(alternates.len(), 2);
        let first = app.element(*alternates[0]).condition().unwrap();
        assert_eq!(first.id, "disc13");
        assert_eq!(first.clauses()[0].explanation.as_deref(), Some("because low"));
        let second = app.element(*alternates[1]).condition().unwrap();
        assert_eq!(second.id, "disc14");
    }

    #[test]
    fn functional_consequence_keeps_raw_aggregation_cells() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 1, "total", "FunctionalImpact")
                .field_type("number")
                .condition("Question", "category", Some("sum"), Some("score")),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        let total = app.find_element("total").unwrap();
        assert!(app.element(total).condition().is_none());
        let cells = app.element(total).row_clause().unwrap();
        assert_eq!(cells.operation.as_deref(), Some("sum"));
    }

    #[test]
    fn reuse_requires_a_known_target() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            Row::element(2, 1, "ghost", "Reuse"),
        ];
        let err = compile(meta(), &[], &rows).unwrap_err();
        assert!(matches!(err, CompileError::UnknownRepeatTarget { row: 2, .. }));
    }

    #[test]
    fn reuse_links_into_tree_but_not_page() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            Row::element(2, 1, "g1", "Group"),
            q(3, 2, "q1"),
            Row::element(4, 1, "p2", "Page"),
            Row::element(5, 1, "g1", "Reuse"),
        ];
        let app = compile(meta(), &[], &rows).unwrap();
        let p2 = &app.pages()[1];
        assert!(p2.find_element("g1").is_none());
        let governing = p2.governing_element();
        assert_eq!(app.element(governing).children.len(), 1);
        let reuse = app.element(governing).children[0];
        assert!(app.element(reuse).is_repeating());
    }

    #[test]
    fn tables_compile_with_conditional_entries() {
        let tables = vec![
            TableRow::table(1, "states"),
            TableRow::entry(2, "NSW").label("New South Wales"),
            TableRow::entry(3, "ACT").condition("federal", "answer", None, Some("yes")),
        ];
        let rows = vec![
            Row::element(10, 1, "p1", "Page"),
            Row::element(11, 1, "q1", "MultipleChoiceQuestion").lookup_table("states"),
        ];
        let app = compile(meta(), &tables, &rows).unwrap();
        let table = app.table("states").unwrap();
        assert_eq!(table.default_entries().len(), 1);
        let entry = table.conditional_entries()[0];
        assert_eq!(entry.clause.as_ref().unwrap().op, ClauseOp::Eq);
    }

    #[test]
    fn dangling_lookup_reference_fails() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            Row::element(2, 1, "q1", "MultipleChoiceQuestion").lookup_table("missing"),
        ];
        let err = compile(meta(), &[], &rows).unwrap_err();
        assert!(matches!(err, CompileError::UnknownLookupTable { .. }));
    }

    #[test]
    fn table_entry_outside_a_table_fails() {
        let tables = vec![TableRow::entry(1, "NSW")];
        let err = compile(meta(), &tables, &[]).unwrap_err();
        assert!(matches!(err, CompileError::OrphanTableRow { row: 1 }));
    }

    #[test]
    fn unknown_operator_is_reported_with_its_row() {
        let rows = vec![
            Row::element(1, 1, "p1", "Page"),
            q(2, 1, "q1"),
            Row::element(3, 1, "g1", "Group").condition("q1", "answer", Some("between"), Some("x")),
        ];
        let err = compile(meta(), &[], &rows).unwrap_err();
        assert!(matches!(err, CompileError::UnknownOperator { row: 3, .. }));
    }
}
