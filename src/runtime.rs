//! Session-side state machine: the ordered item list, the master-list
//! positional oracle, and the navigation stack for branch pages.

use thiserror::Error;

use crate::serial;

/// The completion action a branch is created with unless one is stated:
/// finish by returning to the previous navigation frame.
pub const COMPLETION_ACTION_RETURN: &str = "#return";

/// Fatal-to-request runtime errors. State is never mutated before one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("navigation return with no open branch")]
    ReturnOnEmptyStack,

    #[error("cannot branch to an empty item list")]
    EmptyBranch,

    #[error("\"{item}\" is not in the current item list")]
    UnknownActiveItem { item: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Frame {
    items: Vec<String>,
    active_item: Option<String>,
    completion_action: String,
    master_list: Option<Vec<String>>,
}

/// A live questionnaire session.
///
/// `items` is the ordered, duplicate-free list of currently visible
/// top-level items. The optional master list records the full intended
/// ordering, so items that come and go can be spliced back where they
/// belong rather than appended.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Questionnaire {
    pub id: String,
    items: Vec<String>,
    master_list: Option<Vec<String>>,
    active_item: Option<String>,
    last_active_item: Option<String>,
    completion_action: String,
    stack: Vec<Frame>,
}

impl Questionnaire {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            master_list: None,
            active_item: None,
            last_active_item: None,
            completion_action: COMPLETION_ACTION_RETURN.to_owned(),
            stack: Vec::new(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn set_items<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.items = items.into_iter().map(Into::into).collect();
    }

    #[must_use]
    pub fn master_list(&self) -> Option<&[String]> {
        self.master_list.as_deref()
    }

    pub fn set_master_list<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.master_list = Some(items.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn active_item(&self) -> Option<&str> {
        self.active_item.as_deref()
    }

    /// The active item prior to the last [`set_active_item`]; cleared by
    /// branching and returning.
    ///
    /// [`set_active_item`]: Questionnaire::set_active_item
    #[must_use]
    pub fn last_active_item(&self) -> Option<&str> {
        self.last_active_item.as_deref()
    }

    /// Make an item active, or pass `None` to treat every item as active.
    ///
    /// # Errors
    ///
    /// [`StateError::UnknownActiveItem`] if the item is not in the list;
    /// the active item is unchanged.
    pub fn set_active_item(&mut self, item: Option<&str>) -> Result<(), StateError> {
        if let Some(item) = item {
            if !self.items.iter().any(|i| i == item) {
                return Err(StateError::UnknownActiveItem {
                    item: item.to_owned(),
                });
            }
        }
        self.last_active_item = self.active_item.take();
        self.active_item = item.map(str::to_owned);
        Ok(())
    }

    #[must_use]
    pub fn completion_action(&self) -> &str {
        &self.completion_action
    }

    pub fn set_completion_action(&mut self, action: impl Into<String>) {
        self.completion_action = action.into();
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|i| i == id)
    }

    /// Add `id` directly after `anchor`. When the anchor is not visible,
    /// the master list places the item after the nearest earlier master
    /// entry that is visible. With no visible earlier entry, or an anchor
    /// unknown to the master list, the item is appended at the end.
    pub fn append_item(&mut self, id: &str, anchor: &str) {
        if self.position(id).is_some() {
            tracing::debug!(item = id, "item already present, not appending");
            return;
        }
        if let Some(pos) = self.position(anchor) {
            self.items.insert(pos + 1, id.to_owned());
            return;
        }
        if let Some(master) = &self.master_list {
            if let Some(mpos) = master.iter().position(|m| m == anchor) {
                for candidate in master[..mpos].iter().rev() {
                    if let Some(pos) = self.items.iter().position(|i| i == candidate) {
                        self.items.insert(pos + 1, id.to_owned());
                        return;
                    }
                }
            }
        }
        self.items.push(id.to_owned());
    }

    /// Add `id` directly before `anchor`. When the anchor is not visible,
    /// the master list places the item before the nearest later master
    /// entry that is visible (or last, if none are). An anchor unknown to
    /// the master list too falls back to a plain append.
    pub fn insert_item(&mut self, id: &str, anchor: &str) {
        if self.position(id).is_some() {
            tracing::debug!(item = id, "item already present, not inserting");
            return;
        }
        if let Some(pos) = self.position(anchor) {
            self.items.insert(pos, id.to_owned());
            return;
        }
        if let Some(master) = &self.master_list {
            if let Some(mpos) = master.iter().position(|m| m == anchor) {
                for candidate in &master[mpos + 1..] {
                    if let Some(pos) = self.items.iter().position(|i| i == candidate) {
                        self.items.insert(pos, id.to_owned());
                        return;
                    }
                }
            }
        }
        self.items.push(id.to_owned());
    }

    /// Remove an item. Removing the last remaining item is refused; a user
    /// must always have somewhere to stand. Removing the active item moves
    /// activity to its predecessor (or the new first item).
    pub fn remove_item(&mut self, id: &str) {
        let Some(pos) = self.position(id) else {
            return;
        };
        if self.items.len() == 1 {
            tracing::warn!(item = id, "refusing to remove the only item");
            return;
        }
        self.items.remove(pos);
        if self.active_item.as_deref() == Some(id) {
            let repaired = if pos == 0 {
                self.items[0].clone()
            } else {
                self.items[pos - 1].clone()
            };
            self.active_item = Some(repaired);
        }
    }

    /// Push the current navigation state and enter a branch whose
    /// completion returns here.
    ///
    /// # Errors
    ///
    /// [`StateError::EmptyBranch`] for an empty item list; nothing is
    /// pushed.
    pub fn navigation_branch(
        &mut self,
        items: Vec<String>,
        active_item: &str,
    ) -> Result<(), StateError> {
        self.navigation_branch_with_action(items, active_item, COMPLETION_ACTION_RETURN)
    }

    /// [`navigation_branch`](Questionnaire::navigation_branch) with an
    /// explicit completion action for the branch.
    pub fn navigation_branch_with_action(
        &mut self,
        items: Vec<String>,
        active_item: &str,
        completion_action: &str,
    ) -> Result<(), StateError> {
        if items.is_empty() {
            return Err(StateError::EmptyBranch);
        }
        self.stack.push(Frame {
            items: std::mem::take(&mut self.items),
            active_item: self.active_item.take(),
            completion_action: std::mem::replace(
                &mut self.completion_action,
                completion_action.to_owned(),
            ),
            master_list: self.master_list.take(),
        });
        self.items = items;
        self.active_item = Some(active_item.to_owned());
        self.last_active_item = None;
        Ok(())
    }

    /// Pop back to the navigation state the current branch was entered
    /// from, exactly as it was.
    ///
    /// # Errors
    ///
    /// [`StateError::ReturnOnEmptyStack`] when no branch is open.
    pub fn navigation_return(&mut self) -> Result<(), StateError> {
        let frame = self.stack.pop().ok_or(StateError::ReturnOnEmptyStack)?;
        self.items = frame.items;
        self.active_item = frame.active_item;
        self.completion_action = frame.completion_action;
        self.master_list = frame.master_list;
        self.last_active_item = None;
        Ok(())
    }

    #[must_use]
    pub fn is_branched(&self) -> bool {
        !self.stack.is_empty()
    }

    #[must_use]
    pub fn branch_depth(&self) -> usize {
        self.stack.len()
    }

    /// The item list in wire form.
    #[must_use]
    pub fn items_encoded(&self) -> String {
        serial::encode_ids(&self.items)
    }

    /// The master list in wire form, empty when unset.
    #[must_use]
    pub fn master_list_encoded(&self) -> String {
        self.master_list
            .as_deref()
            .map(serial::encode_ids)
            .unwrap_or_default()
    }
}
