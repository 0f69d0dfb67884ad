use super::event::StatusEvent;
use crate::error::FeedError;
use chrono::{DateTime, Local};
use std::collections::HashMap;

/// Id of the container new status rows are appended to.
pub const UPDATE_LIST_ID: &str = "update-list";

/// Element id of the row that shows `target`.
pub fn element_id(target: &str) -> String {
    format!("target-{target}")
}

/// A single row of a list container.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: String,
    /// Rendered content, replaced as a whole on every update.
    pub text: String,
    /// Last reported state, `None` until the first update lands.
    pub up: Option<bool>,
    pub updated_at: Option<DateTime<Local>>,
}

impl ListItem {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            text: String::new(),
            up: None,
            updated_at: None,
        }
    }

    pub fn set_status(&mut self, event: &StatusEvent) {
        self.text = event.display_text();
        self.up = Some(event.up);
        self.updated_at = Some(Local::now());
    }
}

/// Ordered list of rows with an id index. Rows keep their first-seen position.
#[derive(Debug, Clone, Default)]
pub struct ListContainer {
    pub id: String,
    items: Vec<ListItem>,
    index: HashMap<String, usize>,
}

impl ListContainer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    fn push(&mut self, item: ListItem) -> &mut ListItem {
        let pos = self.items.len();
        self.index.insert(item.id.clone(), pos);
        self.items.push(item);
        &mut self.items[pos]
    }
}

/// Retained model of the status window: a set of list containers whose rows
/// are addressed by element id.
#[derive(Debug, Clone)]
pub struct Page {
    containers: Vec<ListContainer>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// A page holding the empty `update-list` container.
    pub fn new() -> Self {
        Self {
            containers: vec![ListContainer::new(UPDATE_LIST_ID)],
        }
    }

    /// A page without any container.
    pub fn blank() -> Self {
        Self {
            containers: Vec::new(),
        }
    }

    #[cfg(test)]
    fn add_container(&mut self, container: ListContainer) {
        self.containers.retain(|c| c.id != container.id);
        self.containers.push(container);
    }

    fn container(&self, id: &str) -> Option<&ListContainer> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn update_list(&self) -> Option<&ListContainer> {
        self.container(UPDATE_LIST_ID)
    }

    pub fn element_by_id(&self, id: &str) -> Option<&ListItem> {
        let (c, i) = self.locate(id)?;
        Some(&self.containers[c].items[i])
    }

    /// Returns the row with `id`, appending a new one to `update-list` if no
    /// container holds it yet.
    ///
    /// Fails with [`FeedError::ContainerMissing`] when the row is new and the
    /// page has no `update-list` container. Nothing is appended in that case.
    pub fn get_or_add_element_by_id(&mut self, id: &str) -> Result<&mut ListItem, FeedError> {
        if let Some((c, i)) = self.locate(id) {
            return Ok(&mut self.containers[c].items[i]);
        }

        let list = self
            .containers
            .iter_mut()
            .find(|c| c.id == UPDATE_LIST_ID)
            .ok_or_else(|| FeedError::ContainerMissing(UPDATE_LIST_ID.to_string()))?;
        Ok(list.push(ListItem::new(id)))
    }

    fn locate(&self, id: &str) -> Option<(usize, usize)> {
        self.containers
            .iter()
            .enumerate()
            .find_map(|(c, container)| container.position(id).map(|i| (c, i)))
    }
}

#[cfg(test)]
#[path = "page_tests.rs"]
mod tests;
