//! Draft service: the record editor's state container.
//!
//! Owns the list of record drafts and every transition the editor performs on
//! them. Field edits revalidate synchronously so submission can be disabled the
//! moment any draft turns invalid.

use crate::models::{DataType, DraftField, RecordDraft, RemoteRecord, SortDirection, SortField};
use crate::services::type_registry::{self, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("No draft with id {0}")]
    UnknownDraft(Uuid),
    #[error("{0}")]
    UnknownType(String),
}

/// Counters shown above the record table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftStats {
    pub total: usize,
    pub modified: usize,
    pub new: usize,
    pub errors: usize,
    pub deleted: usize,
}

/// Search, filter and sort settings of the record table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftView {
    pub search: String,
    /// `None` shows every type.
    pub type_filter: Option<DataType>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
}

/// Validate a draft's name, then its value against its type.
pub fn validate_draft(draft: &RecordDraft) -> Result<(), ValidationError> {
    type_registry::validate_name(&draft.name)?;
    type_registry::validate_value(&draft.value, draft.data_type)
}

/// Service holding the record drafts of one cluster.
#[derive(Debug, Clone, Default)]
pub struct DraftService {
    drafts: Vec<RecordDraft>,
    selected: HashSet<Uuid>,
    view: DraftView,
}

impl DraftService {
    /// Create an empty draft service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a draft service from the backend's record listing.
    pub fn from_remote(records: &[RemoteRecord]) -> Self {
        let mut service = Self::new();
        service.load_remote(records);
        service
    }

    /// All drafts in list order, deleted ones included.
    pub fn drafts(&self) -> &[RecordDraft] {
        &self.drafts
    }

    pub fn get(&self, client_id: Uuid) -> Option<&RecordDraft> {
        self.drafts.iter().find(|d| d.client_id == client_id)
    }

    pub(crate) fn get_mut(&mut self, client_id: Uuid) -> Option<&mut RecordDraft> {
        self.drafts.iter_mut().find(|d| d.client_id == client_id)
    }

    fn require_mut(&mut self, client_id: Uuid) -> Result<&mut RecordDraft, DraftError> {
        self.get_mut(client_id)
            .ok_or(DraftError::UnknownDraft(client_id))
    }

    /// Drafts that have not been marked for deletion.
    pub fn live(&self) -> impl Iterator<Item = &RecordDraft> {
        self.drafts.iter().filter(|d| d.is_live())
    }

    /// Replace every draft with the backend's records.
    pub fn load_remote(&mut self, records: &[RemoteRecord]) {
        self.drafts = records.iter().map(RecordDraft::from_remote).collect();
        self.selected.clear();
        info!("Loaded {} records into the editor", self.drafts.len());
    }

    /// Replace the drafts with a fresh listing, keeping client ids of drafts whose name matches.
    pub fn reconcile(&mut self, records: &[RemoteRecord]) {
        let mut known: HashMap<&str, Uuid> = self
            .drafts
            .iter()
            .map(|d| (d.name.as_str(), d.client_id))
            .collect();

        let reconciled: Vec<RecordDraft> = records
            .iter()
            .map(|record| {
                let mut draft = RecordDraft::from_remote(record);
                if let Some(client_id) = known.remove(record.name.as_str()) {
                    draft.client_id = client_id;
                }
                draft
            })
            .collect();

        let ids: HashSet<Uuid> = reconciled.iter().map(|d| d.client_id).collect();
        self.selected.retain(|id| ids.contains(id));
        self.drafts = reconciled;
        debug!("Reconciled editor with {} remote records", self.drafts.len());
    }

    /// Fold a fresh listing into the drafts without discarding local edits.
    ///
    /// Whatever the backend already reflects is marked synced; everything else
    /// stays pending. Deletions whose record is gone leave the list, new drafts
    /// whose name now exists remotely become persisted, and renames, retypes and
    /// revalues that match the listing are advanced.
    pub fn merge_remote(&mut self, records: &[RemoteRecord]) {
        let remote: HashMap<&str, &RemoteRecord> =
            records.iter().map(|r| (r.name.as_str(), r)).collect();

        let gone: Vec<Uuid> = self
            .drafts
            .iter()
            .filter(|d| d.is_deleted && !remote.contains_key(d.original_name.as_str()))
            .map(|d| d.client_id)
            .collect();
        for client_id in gone {
            self.remove(client_id);
        }

        for draft in self.drafts.iter_mut().filter(|d| d.is_live()) {
            if draft.is_new {
                if let Some(record) = remote.get(draft.name.as_str()) {
                    draft.adopt(record);
                }
                continue;
            }

            if draft.differs(DraftField::Name)
                && remote.contains_key(draft.name.as_str())
                && !remote.contains_key(draft.original_name.as_str())
            {
                draft.advance(DraftField::Name);
            }
            if let Some(record) = remote.get(draft.original_name.as_str()) {
                if draft.modified_fields.contains(&DraftField::Type)
                    && record.resolved_type() == draft.data_type
                {
                    draft.advance(DraftField::Type);
                }
                if draft.modified_fields.contains(&DraftField::Value)
                    && record.value == draft.value
                {
                    draft.advance(DraftField::Value);
                }
            }
        }
        debug!("Merged {} remote records into pending drafts", records.len());
    }

    /// Append a new, empty `STRING` draft.
    ///
    /// It is not validated yet: the empty name only fails once the user submits
    /// or leaves the field.
    pub fn add_draft(&mut self) -> &RecordDraft {
        self.drafts.push(RecordDraft::new_empty());
        &self.drafts[self.drafts.len() - 1]
    }

    /// Set one field from its raw text.
    ///
    /// Changing the type clears the value, since the old value is unlikely to
    /// validate against the new type.
    pub fn update_field(
        &mut self,
        client_id: Uuid,
        field: DraftField,
        new_value: &str,
    ) -> Result<(), DraftError> {
        let new_type = match field {
            DraftField::Type => Some(
                new_value
                    .parse::<DataType>()
                    .map_err(DraftError::UnknownType)?,
            ),
            _ => None,
        };

        let draft = self.require_mut(client_id)?;
        match field {
            DraftField::Name => draft.name = new_value.to_string(),
            DraftField::Value => draft.value = new_value.to_string(),
            DraftField::Type => {
                if let Some(data_type) = new_type {
                    draft.data_type = data_type;
                }
                draft.value = type_registry::default_value_for(draft.data_type);
            }
        }

        draft.recompute_modified();
        if field == DraftField::Type && !draft.is_new {
            draft.modified_fields.insert(DraftField::Value);
        }

        draft.error_message = validate_draft(draft).err().map(|e| e.to_string());
        Ok(())
    }

    pub fn set_name(&mut self, client_id: Uuid, name: &str) -> Result<(), DraftError> {
        self.update_field(client_id, DraftField::Name, name)
    }

    pub fn set_type(&mut self, client_id: Uuid, data_type: DataType) -> Result<(), DraftError> {
        self.update_field(client_id, DraftField::Type, data_type.as_str())
    }

    pub fn set_value(&mut self, client_id: Uuid, value: &str) -> Result<(), DraftError> {
        self.update_field(client_id, DraftField::Value, value)
    }

    /// Delete a draft. Never-synced drafts disappear immediately; persisted ones
    /// stay in the list, hidden, until the next sync removes them remotely.
    pub fn mark_deleted(&mut self, client_id: Uuid) -> Result<(), DraftError> {
        let index = self
            .drafts
            .iter()
            .position(|d| d.client_id == client_id)
            .ok_or(DraftError::UnknownDraft(client_id))?;

        if self.drafts[index].is_new {
            self.drafts.remove(index);
        } else {
            self.drafts[index].is_deleted = true;
        }
        self.selected.remove(&client_id);
        Ok(())
    }

    /// Undo a pending deletion.
    pub fn restore(&mut self, client_id: Uuid) -> Result<(), DraftError> {
        self.require_mut(client_id)?.is_deleted = false;
        Ok(())
    }

    /// Reset a draft to its last-synced fields.
    pub fn revert(&mut self, client_id: Uuid) -> Result<(), DraftError> {
        self.require_mut(client_id)?.revert();
        Ok(())
    }

    /// Re-run validation on every live draft and return the failures by name.
    pub fn validate_all(&mut self) -> Vec<(String, ValidationError)> {
        let mut failures = Vec::new();
        for draft in self.drafts.iter_mut().filter(|d| d.is_live()) {
            match validate_draft(draft) {
                Ok(()) => draft.error_message = None,
                Err(e) => {
                    draft.error_message = Some(e.to_string());
                    failures.push((draft.name.clone(), e));
                }
            }
        }
        failures
    }

    /// Drop deleted drafts and mark every survivor as synced.
    pub fn commit_all(&mut self) {
        self.drafts.retain(|d| d.is_live());
        for draft in &mut self.drafts {
            draft.commit();
        }
    }

    pub(crate) fn remove(&mut self, client_id: Uuid) {
        self.drafts.retain(|d| d.client_id != client_id);
        self.selected.remove(&client_id);
    }

    /// Whether any draft is new, modified or pending deletion.
    pub fn has_unsaved_changes(&self) -> bool {
        self.drafts
            .iter()
            .any(|d| d.is_new || d.is_deleted || d.is_modified())
    }

    /// Submission is allowed only while no live draft carries an error.
    pub fn can_submit(&self) -> bool {
        !self.live().any(RecordDraft::has_error)
    }

    pub fn stats(&self) -> DraftStats {
        let mut stats = DraftStats::default();
        for draft in &self.drafts {
            if draft.is_deleted {
                stats.deleted += 1;
                continue;
            }
            stats.total += 1;
            if draft.is_modified() {
                stats.modified += 1;
            }
            if draft.is_new {
                stats.new += 1;
            }
            if draft.has_error() {
                stats.errors += 1;
            }
        }
        stats
    }

    pub fn view(&self) -> &DraftView {
        &self.view
    }

    pub fn set_search(&mut self, search: &str) {
        self.view.search = search.to_string();
    }

    pub fn set_type_filter(&mut self, type_filter: Option<DataType>) {
        self.view.type_filter = type_filter;
    }

    /// Sort by `field`; sorting by the current field again flips the direction.
    pub fn sort_by(&mut self, field: SortField) {
        if self.view.sort_field == field {
            self.view.sort_direction = self.view.sort_direction.toggled();
        } else {
            self.view.sort_field = field;
            self.view.sort_direction = SortDirection::Asc;
        }
    }

    /// Live drafts after search, type filter and sort.
    pub fn visible(&self) -> Vec<&RecordDraft> {
        let search = self.view.search.to_lowercase();
        let mut visible: Vec<&RecordDraft> = self
            .live()
            .filter(|d| {
                search.is_empty()
                    || d.name.to_lowercase().contains(&search)
                    || d.value.to_lowercase().contains(&search)
            })
            .filter(|d| self.view.type_filter.is_none_or(|t| d.data_type == t))
            .collect();

        let key = |d: &RecordDraft| match self.view.sort_field {
            SortField::Name => d.name.to_lowercase(),
            SortField::Type => d.data_type.as_str().to_lowercase(),
            SortField::Value => d.value.to_lowercase(),
        };
        visible.sort_by(|a, b| {
            let ordering = key(a).cmp(&key(b));
            match self.view.sort_direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        visible
    }

    pub fn selected(&self) -> &HashSet<Uuid> {
        &self.selected
    }

    pub fn toggle_selection(&mut self, client_id: Uuid) {
        if self.selected.remove(&client_id) {
            return;
        }
        if self.get(client_id).is_some_and(RecordDraft::is_live) {
            self.selected.insert(client_id);
        }
    }

    pub fn select_all_visible(&mut self) {
        self.selected = self.visible().iter().map(|d| d.client_id).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Delete every selected draft.
    pub fn delete_selected(&mut self) {
        let selected: Vec<Uuid> = self.selected.drain().collect();
        for client_id in selected {
            if let Err(e) = self.mark_deleted(client_id) {
                debug!("Skipping selected draft: {}", e);
            }
        }
    }
}
