//! Condition & consequence emitter: walks a compiled [`Application`] and
//! produces the declarative directive list a forward-chaining engine
//! consumes. Directives are plain data; nothing here evaluates them.

use crate::serial::PossibleOption;
use crate::types::{
    AggregateOp, Answer, AnswerKind, Application, ClauseOp, CompileError, ConditionClause,
    ElementCondition, ElementId, ElementType, PageElement,
};

/// The element vocabulary of the consuming engine. Page and branch elements
/// surface as groups; all consequences surface as data items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuntimeType {
    Questionnaire,
    Group,
    Question,
    MultipleChoiceQuestion,
    Note,
    DataItem,
    /// Marker fact recording that a conditional option is currently live.
    ListEntry,
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RuntimeType::Questionnaire => "Questionnaire",
            RuntimeType::Group => "Group",
            RuntimeType::Question => "Question",
            RuntimeType::MultipleChoiceQuestion => "MultipleChoiceQuestion",
            RuntimeType::Note => "Note",
            RuntimeType::DataItem => "DataItem",
            RuntimeType::ListEntry => "ListEntry",
        };
        write!(f, "{name}")
    }
}

/// When a directive fires: a group-membership guard, a boolean condition,
/// or both. A directive with no trigger fires unconditionally at start-up.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trigger {
    pub group_ids: Vec<String>,
    pub condition: Option<ElementCondition>,
}

impl Trigger {
    fn from_condition(condition: ElementCondition) -> Self {
        Self {
            group_ids: Vec::new(),
            condition: Some(condition),
        }
    }
}

/// Everything needed to materialise one runtime element.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementSpec {
    pub id: String,
    pub label: Option<String>,
    pub post_label: Option<String>,
    pub required: bool,
    pub answer_kind: Option<AnswerKind>,
    pub default: Option<Answer>,
    /// Display explanation for a consequence, from its post-label.
    pub reason: Option<String>,
    pub category: Option<String>,
    pub styles: Vec<String>,
    /// Ordered child ids for groups, pages and the questionnaire root.
    pub items: Option<Vec<String>>,
    /// Default option list for a multiple-choice question.
    pub options: Option<Vec<PossibleOption>>,
    pub completion_action: Option<String>,
    pub active_item: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    CreateElement {
        runtime_type: RuntimeType,
        spec: ElementSpec,
    },
    /// Write a value into an existing data item.
    SetField {
        target: String,
        value: Answer,
        reason: Option<String>,
    },
    /// Splice an option into a multiple-choice question at a stable position.
    IncludeOption {
        question: String,
        option: PossibleOption,
        position: usize,
    },
    /// The retract mirror of [`Action::IncludeOption`].
    ExcludeOption {
        question: String,
        value: String,
    },
    /// Filter, project and fold answers into a temporary fact.
    Aggregate {
        fact: String,
        source_type: String,
        attribute: String,
        value: Option<String>,
        field: AnswerKind,
        op: AggregateOp,
    },
    /// Copy the aggregated value onto its target and discard the fact.
    AssignAggregate {
        target: String,
        fact: String,
    },
    FlagInvalid {
        question: String,
        message: String,
    },
    /// Open a navigation branch holding the page.
    EnterBranch {
        page: String,
    },
    /// Splice the page into the already-open branch.
    ExtendBranch {
        page: String,
        after: Option<String>,
    },
}

/// One output record: an action, an optional trigger, and an optional
/// idempotency guard naming an item that must not already be present.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Directive {
    pub trigger: Option<Trigger>,
    pub action: Action,
    pub unless_present: Option<String>,
}

impl Directive {
    fn unconditional(action: Action) -> Self {
        Self {
            trigger: None,
            action,
            unless_present: None,
        }
    }

    fn when(trigger: Trigger, action: Action) -> Self {
        Self {
            trigger: Some(trigger),
            action,
            unless_present: None,
        }
    }
}

/// Emit the directive list: the questionnaire root first, then globals,
/// then every page's elements in order, then the conditional lookup-entry
/// maintenance records.
///
/// Takes the application by mutable reference because emission consumes
/// labels (a validation message is used once) and tracks which alternate
/// consequences have been created.
///
/// # Errors
///
/// [`CompileError`] for structural defects only visible at emission time:
/// childless groups, empty default option lists, invalid aggregation
/// operators, default values that do not parse as their answer kind.
pub fn emit(app: &mut Application) -> Result<Vec<Directive>, CompileError> {
    let mut out = Vec::new();

    let items = app.page_item_list()?;
    out.push(Directive::unconditional(Action::CreateElement {
        runtime_type: RuntimeType::Questionnaire,
        spec: ElementSpec {
            id: app.id.clone(),
            label: Some(app.name.clone()),
            completion_action: app.completion_action.clone(),
            active_item: app.active_page.clone(),
            items: Some(items),
            ..ElementSpec::default()
        },
    }));

    for global in app.globals().to_vec() {
        emit_element(app, global, &mut out)?;
    }
    for page in 0..app.pages().len() {
        for element in app.pages()[page].elements().to_vec() {
            emit_element(app, element, &mut out)?;
        }
    }
    for page in 0..app.pages().len() {
        let governing = app.pages()[page].governing_element();
        emit_conditional_entries(app, governing, &mut out)?;
    }
    Ok(out)
}

fn runtime_type(element_type: ElementType) -> RuntimeType {
    match element_type {
        ElementType::Page | ElementType::Branch | ElementType::Group => RuntimeType::Group,
        ElementType::Question => RuntimeType::Question,
        ElementType::MultipleChoiceQuestion => RuntimeType::MultipleChoiceQuestion,
        ElementType::Note => RuntimeType::Note,
        ElementType::Impact
        | ElementType::FunctionalImpact
        | ElementType::AlternateImpact
        | ElementType::Validation
        | ElementType::Reuse => RuntimeType::DataItem,
    }
}

fn emit_element(
    app: &mut Application,
    id: ElementId,
    out: &mut Vec<Directive>,
) -> Result<(), CompileError> {
    let element_type = app.element(id).element_type;
    match element_type {
        // Already materialised where it was defined.
        ElementType::Reuse => Ok(()),
        ElementType::FunctionalImpact => emit_functional(app, id, out),
        ElementType::Validation => emit_validation(app, id, out),
        ElementType::AlternateImpact => {
            let element_id = app.element(id).id.clone();
            if app.first_alternate_use(&element_id) {
                out.push(Directive::unconditional(Action::CreateElement {
                    runtime_type: RuntimeType::DataItem,
                    spec: consequence_spec(app.element(id), false)?,
                }));
            }
            let element = app.element(id);
            let trigger = make_trigger(element);
            let value = parse_default(element)?;
            let reason = element
                .condition()
                .and_then(|c| c.clauses().first())
                .and_then(|c| c.explanation.clone());
            out.push(Directive {
                trigger,
                action: Action::SetField {
                    target: element_id,
                    value,
                    reason,
                },
                unless_present: None,
            });
            Ok(())
        }
        ElementType::Impact if app.element(id).condition().is_none() => {
            // Promoted to a free-standing data item.
            out.push(Directive::unconditional(Action::CreateElement {
                runtime_type: RuntimeType::DataItem,
                spec: consequence_spec(app.element(id), false)?,
            }));
            Ok(())
        }
        _ => emit_general(app, id, out),
    }
}

/// The standard creation record, preceded by the branch pair when the
/// element opens a branch page.
fn emit_general(
    app: &mut Application,
    id: ElementId,
    out: &mut Vec<Directive>,
) -> Result<(), CompileError> {
    if app.element(id).is_branch_page() {
        emit_branch_pair(app.element(id), out);
    }

    let element = app.element(id);
    let trigger = make_trigger(element);
    let spec = if element.element_type.is_consequence() {
        consequence_spec(element, true)?
    } else {
        let mut spec = base_spec(element)?;
        spec.post_label = element.post_label.clone();
        spec.styles = element.styles.clone();
        match element.element_type {
            ElementType::MultipleChoiceQuestion => {
                spec.options = default_options(app, element)?;
            }
            ElementType::Page | ElementType::Branch | ElementType::Group => {
                spec.items = Some(child_items(app, id)?);
            }
            _ => {}
        }
        spec
    };
    out.push(Directive {
        trigger,
        action: Action::CreateElement {
            runtime_type: runtime_type(app.element(id).element_type),
            spec,
        },
        unless_present: None,
    });
    Ok(())
}

/// A branch page needs two records against the same trigger: enter a fresh
/// branch, or splice into the branch already open. Both are guarded so the
/// page is never added twice.
fn emit_branch_pair(element: &PageElement, out: &mut Vec<Directive>) {
    let trigger = element.condition().cloned().map(Trigger::from_condition);
    let after = element
        .condition()
        .and_then(|c| c.display_after.clone());
    out.push(Directive {
        trigger: trigger.clone(),
        action: Action::EnterBranch {
            page: element.id.clone(),
        },
        unless_present: Some(element.id.clone()),
    });
    out.push(Directive {
        trigger,
        action: Action::ExtendBranch {
            page: element.id.clone(),
            after,
        },
        unless_present: Some(element.id.clone()),
    });
}

fn emit_functional(
    app: &Application,
    id: ElementId,
    out: &mut Vec<Directive>,
) -> Result<(), CompileError> {
    let element = app.element(id);
    let cells = element
        .row_clause()
        .ok_or_else(|| CompileError::UnconditionedConsequence {
            id: element.id.clone(),
            row: element.row,
        })?;
    let keyword = cells.operation.clone().unwrap_or_default();
    let op: AggregateOp = keyword
        .parse()
        .map_err(|()| CompileError::InvalidAggregateOp {
            keyword: keyword.clone(),
            element: element.id.clone(),
            row: element.row,
        })?;

    out.push(Directive::unconditional(Action::CreateElement {
        runtime_type: RuntimeType::DataItem,
        spec: consequence_spec(element, false)?,
    }));

    let fact = format!("Temp{}", element.id);
    let source = cells.subject.clone().unwrap_or_default();
    let source_type = if source.eq_ignore_ascii_case("impact") {
        RuntimeType::DataItem.to_string()
    } else {
        source
    };
    out.push(Directive::unconditional(Action::Aggregate {
        fact: fact.clone(),
        source_type,
        attribute: cells.attribute.clone().unwrap_or_default(),
        value: cells.value.clone(),
        field: element.answer_kind,
        op,
    }));
    out.push(Directive::unconditional(Action::AssignAggregate {
        target: element.id.clone(),
        fact,
    }));
    Ok(())
}

fn emit_validation(
    app: &mut Application,
    id: ElementId,
    out: &mut Vec<Directive>,
) -> Result<(), CompileError> {
    let element = app.element(id);
    let condition = element
        .condition()
        .cloned()
        .ok_or_else(|| CompileError::ValidationWithoutQuestion {
            id: element.id.clone(),
            row: element.row,
        })?;
    let question = crate::types::element::find_previous_question(app.arena(), id)
        .map(|q| app.element(q).id.clone())
        .ok_or_else(|| CompileError::ValidationWithoutQuestion {
            id: element.id.clone(),
            row: element.row,
        })?;
    let element = app.element_mut(id);
    let message = match element.pre_label.take() {
        Some(message) => message,
        None => {
            tracing::warn!(validation = %element.id, "no validation message defined");
            "Invalid value".to_owned()
        }
    };
    out.push(Directive::when(
        Trigger::from_condition(condition),
        Action::FlagInvalid { question, message },
    ));
    Ok(())
}

/// Group-membership guards apply to questions always, and to anything else
/// only while it is optional; a required non-question stands on its own.
fn make_trigger(element: &PageElement) -> Option<Trigger> {
    let use_group_ids = !element.group_ids.is_empty()
        && (element.element_type.is_question() || !element.required);
    let condition = element.condition().cloned();
    if !use_group_ids && condition.is_none() {
        return None;
    }
    Some(Trigger {
        group_ids: if use_group_ids {
            element.group_ids.clone()
        } else {
            Vec::new()
        },
        condition,
    })
}

fn base_spec(element: &PageElement) -> Result<ElementSpec, CompileError> {
    let is_answerable =
        element.element_type.is_question() || element.element_type.is_consequence();
    Ok(ElementSpec {
        id: element.id.clone(),
        label: element.pre_label.clone(),
        required: element.element_type.is_question() && element.required,
        answer_kind: is_answerable.then_some(element.answer_kind),
        default: if is_answerable && element.default_value.is_some() {
            Some(parse_default(element)?)
        } else {
            None
        },
        category: element.category.clone(),
        ..ElementSpec::default()
    })
}

fn consequence_spec(element: &PageElement, show_reason: bool) -> Result<ElementSpec, CompileError> {
    let mut spec = base_spec(element)?;
    if show_reason {
        spec.reason = element.post_label.clone();
    }
    Ok(spec)
}

fn parse_default(element: &PageElement) -> Result<Answer, CompileError> {
    let raw = element.default_value.as_deref().unwrap_or_default();
    Answer::parse(element.answer_kind, raw).map_err(|raw| CompileError::InvalidValue {
        id: element.id.clone(),
        raw,
        kind: element.answer_kind.to_string(),
        row: element.row,
    })
}

/// Child id list for a group-like element. Repeating references resolve to
/// their master definition; only displayable children count.
fn child_items(app: &Application, id: ElementId) -> Result<Vec<String>, CompileError> {
    let element = app.element(id);
    let mut items = Vec::new();
    for &child in &element.children {
        let mut child_el = app.element(child);
        if child_el.is_repeating() {
            let master = app
                .find_element(&child_el.id)
                .ok_or_else(|| CompileError::UnknownRepeatTarget {
                    id: child_el.id.clone(),
                    row: child_el.row,
                })?;
            child_el = app.element(master);
        }
        match child_el.element_type {
            ElementType::Group
            | ElementType::Question
            | ElementType::MultipleChoiceQuestion
            | ElementType::Note => items.push(child_el.id.clone()),
            _ => {}
        }
    }
    if items.is_empty() {
        return Err(CompileError::EmptyGroup {
            id: element.id.clone(),
        });
    }
    Ok(items)
}

/// The unconditional option list of a multiple-choice question. A question
/// without a lookup table gets none; a table whose every entry is guarded
/// cannot seed the question.
fn default_options(
    app: &Application,
    element: &PageElement,
) -> Result<Option<Vec<PossibleOption>>, CompileError> {
    let Some(table_id) = &element.lookup_table_id else {
        return Ok(None);
    };
    let Some(table) = app.table(table_id) else {
        return Ok(None);
    };
    if table.entries.is_empty() {
        tracing::warn!(question = %element.id, table = %table_id, "lookup table has no entries");
        return Ok(None);
    }
    let defaults: Vec<PossibleOption> = table
        .default_entries()
        .into_iter()
        .map(|e| PossibleOption {
            value: Some(e.value.clone()),
            label: e.label.clone(),
        })
        .collect();
    if defaults.is_empty() {
        return Err(CompileError::NoUnconditionalEntries {
            table: table_id.clone(),
            element: element.id.clone(),
        });
    }
    Ok(Some(defaults))
}

/// Walk the element tree under `id` and emit the maintenance records for
/// every conditional lookup entry: a guarded marker fact, an include while
/// the marker is present, an exclude while it is absent.
fn emit_conditional_entries(
    app: &Application,
    id: ElementId,
    out: &mut Vec<Directive>,
) -> Result<(), CompileError> {
    let element = app.element(id);
    if let Some(table) = element.lookup_table_id.as_deref().and_then(|t| app.table(t)) {
        for (n, entry) in table.entries.iter().enumerate() {
            let position = n + 1;
            let Some(clause) = &entry.clause else {
                continue;
            };
            let marker_id = format!("{}row{}", element.id, position);

            let mut marker_condition = ElementCondition::new(
                marker_id.clone(),
                crate::types::ConditionKind::Inclusion,
                entry.row,
            );
            marker_condition.push_clause(clause.clone());
            out.push(Directive::when(
                Trigger::from_condition(marker_condition),
                Action::CreateElement {
                    runtime_type: RuntimeType::ListEntry,
                    spec: ElementSpec {
                        id: marker_id.clone(),
                        ..ElementSpec::default()
                    },
                },
            ));

            let mut present = ElementCondition::new(
                marker_id.clone(),
                crate::types::ConditionKind::Inclusion,
                entry.row,
            );
            present.push_clause(ConditionClause::new(
                &marker_id,
                "id",
                ClauseOp::Eq,
                Some(&marker_id),
            ));
            out.push(Directive::when(
                Trigger::from_condition(present),
                Action::IncludeOption {
                    question: element.id.clone(),
                    option: PossibleOption {
                        value: Some(entry.value.clone()),
                        label: entry.label.clone(),
                    },
                    position,
                },
            ));

            let mut absent = ElementCondition::new(
                marker_id.clone(),
                crate::types::ConditionKind::Inclusion,
                entry.row,
            );
            absent.push_clause(
                ConditionClause::new(&marker_id, "id", ClauseOp::Eq, Some(&marker_id)).negate(),
            );
            out.push(Directive::when(
                Trigger::from_condition(absent),
                Action::ExcludeOption {
                    question: element.id.clone(),
                    value: entry.value.clone(),
                },
            ));
        }
    }
    for child in app.element(id).children.clone() {
        emit_conditional_entries(app, child, out)?;
    }
    Ok(())
}
