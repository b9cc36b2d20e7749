use std::fmt;

use crate::types::condition::ElementCondition;
use crate::types::row::ClauseCells;
use crate::types::value::AnswerKind;

/// Index of an element in the [`Application`](crate::types::Application)
/// arena. Tree links are stored as these indices rather than references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The type keyword of an item row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementType {
    Page,
    Branch,
    Group,
    Question,
    MultipleChoiceQuestion,
    Note,
    /// Plain consequence.
    Impact,
    /// Aggregating consequence.
    FunctionalImpact,
    /// Value-per-condition consequence; several rows may share one id.
    AlternateImpact,
    Validation,
    /// Repeating reference back to an element defined elsewhere.
    Reuse,
}

impl ElementType {
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "page" => Some(ElementType::Page),
            "branch" => Some(ElementType::Branch),
            "group" => Some(ElementType::Group),
            "question" => Some(ElementType::Question),
            "multiplechoicequestion" => Some(ElementType::MultipleChoiceQuestion),
            "note" => Some(ElementType::Note),
            "impact" => Some(ElementType::Impact),
            "functionalimpact" => Some(ElementType::FunctionalImpact),
            "alternateimpact" => Some(ElementType::AlternateImpact),
            "validation" => Some(ElementType::Validation),
            "reuse" => Some(ElementType::Reuse),
            _ => None,
        }
    }

    /// Page and branch elements open a new page scope.
    #[must_use]
    pub fn is_page(self) -> bool {
        matches!(self, ElementType::Page | ElementType::Branch)
    }

    #[must_use]
    pub fn is_question(self) -> bool {
        matches!(
            self,
            ElementType::Question | ElementType::MultipleChoiceQuestion
        )
    }

    #[must_use]
    pub fn is_consequence(self) -> bool {
        matches!(
            self,
            ElementType::Impact | ElementType::FunctionalImpact | ElementType::AlternateImpact
        )
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Page => "Page",
            ElementType::Branch => "Branch",
            ElementType::Group => "Group",
            ElementType::Question => "Question",
            ElementType::MultipleChoiceQuestion => "MultipleChoiceQuestion",
            ElementType::Note => "Note",
            ElementType::Impact => "Impact",
            ElementType::FunctionalImpact => "FunctionalImpact",
            ElementType::AlternateImpact => "AlternateImpact",
            ElementType::Validation => "Validation",
            ElementType::Reuse => "Reuse",
        };
        write!(f, "{name}")
    }
}

/// One node of the compiled element tree.
///
/// Tree links (`parent`, `children`, `previous_sibling`) are arena indices
/// owned by the application, so the tree needs no interior mutability or
/// reference counting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageElement {
    pub id: String,
    pub element_type: ElementType,
    pub answer_kind: AnswerKind,
    pub required: bool,
    pub pre_label: Option<String>,
    pub post_label: Option<String>,
    pub default_value: Option<String>,
    pub styles: Vec<String>,
    pub category: Option<String>,
    pub lookup_table_id: Option<String>,
    pub group_ids: Vec<String>,
    pub depth: usize,
    pub row: u32,

    /// The clause cells carried on this element's own row, if any. For most
    /// elements this seeds the display condition; for a functional
    /// consequence it is the aggregation spec and is read directly.
    row_clause: Option<ClauseCells>,
    condition: Option<ElementCondition>,

    pub parent: Option<ElementId>,
    pub children: Vec<ElementId>,
    pub previous_sibling: Option<ElementId>,
}

impl PageElement {
    #[must_use]
    pub fn new(id: impl Into<String>, element_type: ElementType, depth: usize, row: u32) -> Self {
        Self {
            id: id.into(),
            element_type,
            answer_kind: AnswerKind::Text,
            required: false,
            pre_label: None,
            post_label: None,
            default_value: None,
            styles: Vec::new(),
            category: None,
            lookup_table_id: None,
            group_ids: Vec::new(),
            depth,
            row,
            row_clause: None,
            condition: None,
            parent: None,
            children: Vec::new(),
            previous_sibling: None,
        }
    }

    #[must_use]
    pub fn is_branch_page(&self) -> bool {
        self.element_type == ElementType::Branch
    }

    #[must_use]
    pub fn is_repeating(&self) -> bool {
        self.element_type == ElementType::Reuse
    }

    /// A group id is recorded once no matter how often the row repeats it.
    pub fn add_group_id(&mut self, group_id: &str) {
        if !self.group_ids.iter().any(|g| g == group_id) {
            self.group_ids.push(group_id.to_owned());
        }
    }

    #[must_use]
    pub fn row_clause(&self) -> Option<&ClauseCells> {
        self.row_clause.as_ref()
    }

    /// Attach the element's own row clause. At most one per element.
    pub fn set_row_clause(&mut self, cells: ClauseCells) -> Result<(), ClauseCells> {
        if self.row_clause.is_some() {
            return Err(cells);
        }
        self.row_clause = Some(cells);
        Ok(())
    }

    #[must_use]
    pub fn condition(&self) -> Option<&ElementCondition> {
        self.condition.as_ref()
    }

    pub fn condition_mut(&mut self) -> Option<&mut ElementCondition> {
        self.condition.as_mut()
    }

    /// Attach the display (or validation) condition. Attaching twice is a
    /// caller error surfaced as `Err` so the compiler can report the row.
    pub fn set_condition(&mut self, condition: ElementCondition) -> Result<(), ElementCondition> {
        if self.condition.is_some() {
            return Err(condition);
        }
        self.condition = Some(condition);
        Ok(())
    }

    /// Replace the condition wholesale. Used only for inherited consequence
    /// conditions, which clone an ancestor's already-built condition.
    pub fn inherit_condition(&mut self, condition: ElementCondition) {
        self.condition = Some(condition);
    }
}

/// Walk previous-sibling links, then the parent chain, for the nearest
/// question. Standalone so it can borrow the arena immutably.
#[must_use]
pub fn find_previous_question(arena: &[PageElement], from: ElementId) -> Option<ElementId> {
    let element = &arena[from.0];
    if let Some(sibling) = element.previous_sibling {
        if arena[sibling.0].element_type.is_question() {
            return Some(sibling);
        }
        return find_previous_question(arena, sibling);
    }
    let parent = element.parent?;
    if arena[parent.0].element_type.is_question() {
        return Some(parent);
    }
    find_previous_question(arena, parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(id: &str, ty: ElementType) -> PageElement {
        PageElement::new(id, ty, 1, 1)
    }

    #[test]
    fn type_keywords_are_case_insensitive() {
        assert_eq!(ElementType::from_keyword("page"), Some(ElementType::Page));
        assert_eq!(
            ElementType::from_keyword("MULTIPLECHOICEQUESTION"),
            Some(ElementType::MultipleChoiceQuestion)
        );
        assert_eq!(
            ElementType::from_keyword("AlternateImpact"),
            Some(ElementType::AlternateImpact)
        );
        assert_eq!(ElementType::from_keyword("widget"), None);
    }

    #[test]
    fn classification() {
        assert!(ElementType::Branch.is_page());
        assert!(!ElementType::Group.is_page());
        assert!(ElementType::MultipleChoiceQuestion.is_question());
        assert!(ElementType::FunctionalImpact.is_consequence());
        assert!(!ElementType::Validation.is_consequence());
    }

    #[test]
    fn group_ids_deduplicate() {
        let mut el = make("q1", ElementType::Question);
        el.add_group_id("g1");
        el.add_group_id("g2");
        el.add_group_id("g1");
        assert_eq!(el.group_ids, vec!["g1", "g2"]);
    }

    #[test]
    fn condition_attaches_once() {
        use crate::types::condition::{ConditionKind, ElementCondition};
        let mut el = make("q1", ElementType::Question);
        let cond = ElementCondition::new("q1", ConditionKind::Inclusion, 2);
        assert!(el.set_condition(cond.clone()).is_ok());
        assert!(el.set_condition(cond).is_err());
    }

    #[test]
    fn previous_question_walks_siblings_then_parents() {
        // g (question-less group)
        //   q1  n1  v1      v1's previous question is q1, via n1.
        let mut arena = vec![
            make("g", ElementType::Group),
            make("q1", ElementType::Question),
            make("n1", ElementType::Note),
            make("v1", ElementType::Validation),
        ];
        arena[1].parent = Some(ElementId(0));
        arena[2].parent = Some(ElementId(0));
        arena[2].previous_sibling = Some(ElementId(1));
        arena[3].parent = Some(ElementId(0));
        arena[3].previous_sibling = Some(ElementId(2));

        assert_eq!(find_previous_question(&arena, ElementId(3)), Some(ElementId(1)));
        assert_eq!(find_previous_question(&arena, ElementId(1)), None);
    }

    #[test]
    fn previous_question_finds_question_parent() {
        let mut arena = vec![make("q1", ElementType::Question), make("v1", ElementType::Validation)];
        arena[1].parent = Some(ElementId(0));
        assert_eq!(find_previous_question(&arena, ElementId(1)), Some(ElementId(0)));
    }
}
