use crate::checklist::{default_database, Database, List};
use crate::storage::{self, Storage, StorageError};
use log::{debug, info};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("no list at position {0}")]
    NoSuchList(usize),
    #[error("list {list} has no item at position {item}")]
    NoSuchItem { list: usize, item: usize },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// The in-memory database together with the slot it is flushed to after every change.
pub struct Store {
    db: Database,
    storage: Box<dyn Storage>,
    slot: String,
}

impl Store {
    /// Loads `slot`, falling back to the starter database when it has never been written.
    pub fn open(backend: Box<dyn Storage>, slot: impl Into<String>) -> Result<Self> {
        let slot = slot.into();
        let db = match storage::load(backend.as_ref(), &slot)? {
            Some(db) => {
                info!("loaded {} lists from slot `{}`", db.len(), slot);
                db
            }
            None => {
                info!("slot `{}` is empty, starting from the default lists", slot);
                default_database()
            }
        };
        Ok(Self {
            db,
            storage: backend,
            slot,
        })
    }

    pub fn lists(&self) -> &[List] {
        &self.db
    }

    pub fn save(&mut self) -> Result<()> {
        storage::save(self.storage.as_mut(), &self.slot, &self.db)?;
        Ok(())
    }

    /// Appends a new empty list. Empty names are ignored and return `None`.
    pub fn add_list(&mut self, name: &str) -> Result<Option<usize>> {
        let Some(name) = accepted_name(name) else {
            return Ok(None);
        };
        debug!("adding list `{}`", name);
        self.db.push(List::new(name));
        self.save()?;
        Ok(Some(self.db.len() - 1))
    }

    /// Appends a new incomplete item to `list`. Empty names are ignored and return `None`.
    pub fn add_item(&mut self, list: usize, name: &str) -> Result<Option<usize>> {
        let target = self.db.get_mut(list).ok_or(StoreError::NoSuchList(list))?;
        let Some(name) = accepted_name(name) else {
            return Ok(None);
        };
        debug!("adding item `{}` to list `{}`", name, target.name);
        target.push_item(name);
        let index = target.items.len() - 1;
        self.save()?;
        Ok(Some(index))
    }

    /// Flips the completion of one item and returns whether it is now complete.
    pub fn toggle_item(&mut self, list: usize, item: usize) -> Result<bool> {
        let target = self
            .db
            .get_mut(list)
            .ok_or(StoreError::NoSuchList(list))?
            .items
            .get_mut(item)
            .ok_or(StoreError::NoSuchItem { list, item })?;
        let completed = target.toggle();
        debug!(
            "item `{}` marked {}",
            target.name,
            if completed { "complete" } else { "incomplete" }
        );
        self.save()?;
        Ok(completed)
    }
}

fn accepted_name(name: &str) -> Option<&str> {
    (!name.is_empty()).then_some(name)
}
