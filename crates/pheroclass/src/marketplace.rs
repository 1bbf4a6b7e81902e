//! Notes marketplace of one class
//!
//! Three views over the notes of a notes contract, relative to the current
//! account: notes it created, notes it bought, and approved notes on sale.
//! Teachers additionally see every note for approval.

use pheroclass_classroom::{Classroom, ClassroomError, ContractAddress, NewNote, Note, NoteKey};
use pheroclass_storage::{DEFAULT_GATEWAY, FileStore, gateway_url, strip_ipfs_scheme};
use std::sync::Arc;
use tracing::{info, warn};

use crate::fanout::{DEFAULT_FETCH_CONCURRENCY, fan_out};
use crate::forms::{Form, NoteUpload, PriceForm, UploadNotesForm};
use crate::state::{BusySet, EntityMap, StatusMessage};

/// What the user can do with a listed note
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteAffordance {
    /// Buy at the listed price; the binding re-reads the price when buying
    Purchase { price: String },
    /// Already owned: open the document
    View { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListing {
    pub note: Note,
    pub affordance: NoteAffordance,
}

impl NoteListing {
    pub fn is_purchased(&self) -> bool {
        matches!(self.affordance, NoteAffordance::View { .. })
    }
}

pub struct NotesBoard {
    classroom: Arc<dyn Classroom>,
    notes_contract: ContractAddress,
    account: ContractAddress,
    gateway: String,
    concurrency: usize,
    listings: Vec<NoteListing>,
    created: Vec<Note>,
    purchased: Vec<Note>,
    all_notes: Vec<Note>,
    busy: BusySet<NoteKey>,
    uploading: bool,
    status: Option<StatusMessage>,
}

impl NotesBoard {
    pub fn new(classroom: Arc<dyn Classroom>, notes_contract: ContractAddress, account: ContractAddress) -> Self {
        Self {
            classroom,
            notes_contract,
            account,
            gateway: DEFAULT_GATEWAY.to_string(),
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            listings: Vec::new(),
            created: Vec::new(),
            purchased: Vec::new(),
            all_notes: Vec::new(),
            busy: BusySet::new(),
            uploading: false,
            status: None,
        }
    }

    pub fn with_gateway(mut self, gateway: impl Into<String>) -> Self {
        self.gateway = gateway.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn notes_contract(&self) -> &ContractAddress {
        &self.notes_contract
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Approved notes, each with its affordance
    pub fn listings(&self) -> &[NoteListing] {
        &self.listings
    }

    /// Approved notes the account has not bought yet
    pub fn available(&self) -> impl Iterator<Item = &NoteListing> {
        self.listings.iter().filter(|l| !l.is_purchased())
    }

    pub fn listing(&self, note_id: u64) -> Option<&NoteListing> {
        self.listings.iter().find(|l| l.note.id == note_id)
    }

    pub fn created(&self) -> &[Note] {
        &self.created
    }

    pub fn purchased(&self) -> &[Note] {
        &self.purchased
    }

    /// Every note of the contract, approved or not
    pub fn all_notes(&self) -> &[Note] {
        &self.all_notes
    }

    pub fn is_busy(&self, note_id: u64) -> bool {
        self.busy.is_busy(&self.key(note_id))
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Gateway URL of a note's document
    pub fn document_url(&self, note: &Note) -> String {
        gateway_url(&self.gateway, &note.ipfs_hash)
    }

    fn key(&self, note_id: u64) -> NoteKey {
        NoteKey::new(self.notes_contract.clone(), note_id)
    }

    async fn read_notes(&self, ids: Vec<u64>) -> Vec<Note> {
        let classroom = &self.classroom;
        let contract = &self.notes_contract;
        fan_out("note details", ids, self.concurrency, |id| async move {
            classroom.fetch_note(contract, id).await
        })
        .await
        .into_iter()
        .map(|(_, note)| note)
        .collect()
    }

    async fn read_listings(&self, lecture_id: Option<u64>) -> Result<Vec<NoteListing>, ClassroomError> {
        let ids = self.classroom.fetch_approved_note_ids(&self.notes_contract).await?;
        let classroom = &self.classroom;
        let contract = &self.notes_contract;
        let account = &self.account;

        let listings = fan_out("note listing", ids, self.concurrency, |id| async move {
            let note = classroom.fetch_note(contract, id).await?;
            let purchased = classroom.has_purchased_note(contract, id, account).await?;
            Ok::<_, ClassroomError>((note, purchased))
        })
        .await;

        Ok(listings
            .into_iter()
            .map(|(_, (note, purchased))| note_listing(note, purchased, &self.gateway))
            .filter(|l| lecture_id.is_none_or(|id| l.note.lecture_id == id))
            .collect())
    }

    /// Reload the approved listings, optionally for one lecture only
    pub async fn refresh_marketplace(&mut self, lecture_id: Option<u64>) {
        match self.read_listings(lecture_id).await {
            Ok(listings) => self.listings = listings,
            Err(e) => {
                warn!("Failed to load notes of {}: {}", self.notes_contract, e);
                self.status = Some(StatusMessage::error("Failed to load notes. Please try again."));
            }
        }
    }

    /// Reload the notes the account created and bought
    pub async fn refresh_my_notes(&mut self) {
        let created_ids = self
            .classroom
            .fetch_created_note_ids(&self.notes_contract, &self.account)
            .await;
        let purchased_ids = self
            .classroom
            .fetch_purchased_note_ids(&self.notes_contract, &self.account)
            .await;

        match (created_ids, purchased_ids) {
            (Ok(created), Ok(purchased)) => {
                self.created = self.read_notes(created).await;
                self.purchased = self.read_notes(purchased).await;
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to load own notes of {}: {}", self.notes_contract, e);
                self.status = Some(StatusMessage::error("Failed to load your notes. Please try again."));
            }
        }
    }

    /// Reload every note for the approval view
    pub async fn refresh_all(&mut self) {
        match self.classroom.fetch_all_note_ids(&self.notes_contract).await {
            Ok(ids) => self.all_notes = self.read_notes(ids).await,
            Err(e) => {
                warn!("Failed to load notes of {}: {}", self.notes_contract, e);
                self.status = Some(StatusMessage::error("Failed to load notes. Please try again."));
            }
        }
    }

    /// Buy a note
    ///
    /// The value attached is whatever the contract asks at call time, not the
    /// listed price.
    pub async fn purchase(&mut self, note_id: u64) {
        let key = self.key(note_id);
        if !self.busy.begin(key.clone()) {
            return;
        }
        let title = self
            .listing(note_id)
            .map(|l| l.note.title.clone())
            .unwrap_or_else(|| format!("note {}", note_id));

        let outcome = self.classroom.purchase_note(&self.notes_contract, note_id).await;
        self.busy.finish(&key);

        match outcome {
            Ok(tx_hash) => {
                info!("Purchased note {} in {}", key, tx_hash);
                self.status = Some(StatusMessage::success(format!("You have purchased \"{}\"", title)));
                self.refresh_marketplace(None).await;
            }
            Err(e) => {
                warn!("Failed to purchase note {}: {}", key, e);
                self.status = Some(StatusMessage::from_error(
                    "There was an error purchasing the note. Please try again.",
                    &e,
                ));
            }
        }
    }

    /// Set a new price on one of the account's notes
    pub async fn update_price(&mut self, note_id: u64, form: &PriceForm) {
        let price = match form.submission() {
            Ok(price) => price,
            Err(e) => {
                self.status = Some(StatusMessage::error(e.to_string()));
                return;
            }
        };
        let key = self.key(note_id);
        if !self.busy.begin(key.clone()) {
            return;
        }

        let outcome = self
            .classroom
            .update_note_price(&self.notes_contract, note_id, &price)
            .await;
        self.busy.finish(&key);

        match outcome {
            Ok(_) => {
                let shown = match self.classroom.fetch_note(&self.notes_contract, note_id).await {
                    Ok(note) => note.price,
                    Err(e) => {
                        warn!("Failed to re-read note {} after price update: {}", key, e);
                        price
                    }
                };
                if let Some(note) = self.created.iter_mut().find(|n| n.id == note_id) {
                    note.price = shown;
                }
                self.status = Some(StatusMessage::success("Your note price has been updated successfully"));
            }
            Err(e) => {
                warn!("Failed to update price of note {}: {}", key, e);
                self.status = Some(StatusMessage::from_error(
                    "There was an error updating the price. Please try again.",
                    &e,
                ));
            }
        }
    }

    /// Upload a document and register it as a note pending approval
    ///
    /// Returns the new note id when the creation event was found.
    pub async fn upload(&mut self, store: &dyn FileStore, form: &UploadNotesForm) -> Option<u64> {
        let upload = match form.submission() {
            Ok(upload) => upload,
            Err(e) => {
                self.status = Some(StatusMessage::error(e.to_string()));
                return None;
            }
        };
        if self.uploading {
            return None;
        }
        self.uploading = true;
        let created = self.store_and_create(store, upload).await;
        self.uploading = false;

        match created {
            Ok(note_id) => {
                self.status = Some(StatusMessage::success(
                    "Notes uploaded successfully! They will be reviewed by the instructor.",
                ));
                self.refresh_my_notes().await;
                note_id
            }
            Err(e) => {
                warn!("Failed to upload notes to {}: {}", self.notes_contract, e);
                self.status = Some(StatusMessage::from_error(
                    "There was an error uploading your notes. Please try again.",
                    &e,
                ));
                None
            }
        }
    }

    async fn store_and_create(
        &self,
        store: &dyn FileStore,
        upload: NoteUpload,
    ) -> Result<Option<u64>, ClassroomError> {
        let uri = store
            .upload(&upload.file.name, &upload.file.content_type, upload.file.bytes)
            .await
            .map_err(|e| ClassroomError::storage(e.to_string()))?;
        let ipfs_hash = strip_ipfs_scheme(&uri).to_string();
        info!("Stored '{}' as {}", upload.file.name, ipfs_hash);

        let note = NewNote {
            title: upload.title,
            description: upload.description,
            ipfs_hash,
            price: upload.price,
            lecture_id: upload.lecture_id,
        };
        self.classroom.create_note(&self.notes_contract, &note).await
    }

    /// Approve or reject a note (teacher)
    pub async fn set_approval(&mut self, note_id: u64, approved: bool) {
        let key = self.key(note_id);
        if !self.busy.begin(key.clone()) {
            return;
        }
        let title = self
            .all_notes
            .iter()
            .find(|n| n.id == note_id)
            .map(|n| n.title.clone())
            .unwrap_or_else(|| format!("note {}", note_id));

        let outcome = self
            .classroom
            .approve_note(&self.notes_contract, note_id, approved)
            .await;
        self.busy.finish(&key);

        match outcome {
            Ok(_) => {
                let verdict = if approved { "approved" } else { "rejected" };
                self.status = Some(StatusMessage::success(format!(
                    "The note \"{}\" has been {}.",
                    title, verdict
                )));
                self.refresh_all().await;
            }
            Err(e) => {
                warn!("Failed to update approval of note {}: {}", key, e);
                self.status = Some(StatusMessage::from_error(
                    "There was an error updating the note status. Please try again.",
                    &e,
                ));
            }
        }
    }

    /// Sales count per note, for the account's own notes
    pub async fn sales(&self) -> EntityMap<NoteKey, u64> {
        let classroom = &self.classroom;
        let contract = &self.notes_contract;
        let ids = self.created.iter().map(|n| n.id).collect();
        fan_out("note sales", ids, self.concurrency, |id| async move {
            classroom.note_sales(contract, id).await
        })
        .await
        .into_iter()
        .map(|(id, sales)| (self.key(id), sales))
        .collect()
    }
}

fn note_listing(note: Note, purchased: bool, gateway: &str) -> NoteListing {
    let affordance = if purchased {
        NoteAffordance::View {
            url: gateway_url(gateway, &note.ipfs_hash),
        }
    } else {
        NoteAffordance::Purchase {
            price: note.price.clone(),
        }
    };
    NoteListing { note, affordance }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: u64) -> Note {
        Note {
            id,
            title: format!("Note {}", id),
            description: String::new(),
            ipfs_hash: "bafynote".to_string(),
            creator: ContractAddress::zero(),
            price: "0.01".to_string(),
            created_at: 0,
            lecture_id: 1,
            is_approved: true,
            sales_count: 0,
        }
    }

    #[test]
    fn test_listing_affordance() {
        let unsold = note_listing(note(1), false, "ipfs.io");
        assert_eq!(
            unsold.affordance,
            NoteAffordance::Purchase {
                price: "0.01".to_string()
            }
        );
        assert!(!unsold.is_purchased());

        let owned = note_listing(note(2), true, "ipfs.io");
        assert_eq!(
            owned.affordance,
            NoteAffordance::View {
                url: "https://ipfs.io/ipfs/bafynote".to_string()
            }
        );
        assert!(owned.is_purchased());
    }
}
