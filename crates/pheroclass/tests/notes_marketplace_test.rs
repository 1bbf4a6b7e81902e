//! Notes marketplace: listing, buying, pricing and uploading notes
//!
//! Run with: cargo test -p pheroclass --test notes_marketplace_test

mod common;

use common::*;
use pheroclass::{Modal, NoteAffordance, PriceForm, StudentDashboard, UploadNotesForm};
use pheroclass_classroom::ContractAddress;
use std::sync::Arc;

struct TestFixture {
    classroom: FakeClassroom,
    class: ContractAddress,
    notes_contract: ContractAddress,
}

impl TestFixture {
    /// A class with a notes contract and one approved 0.01 note by another student
    fn new() -> Self {
        let classroom = FakeClassroom::new(student());
        let (class, notes_contract) = {
            let mut world = classroom.world();
            let class = world.add_class(&teacher(), "Intro to CS", "CS101");
            world.enroll(&class, &student(), "Ada");
            world.enroll(&class, &other_student(), "Alan");
            world.add_lecture(&class, "Variables");
            let notes_contract = world.add_notes_contract(&teacher(), &class);
            world.add_note(&notes_contract, &other_student(), "Week 1", "0.01", true);
            world.add_note(&notes_contract, &other_student(), "Draft", "0.05", false);
            (class, notes_contract)
        };
        Self {
            classroom,
            class,
            notes_contract,
        }
    }

    async fn dashboard(&self) -> StudentDashboard {
        let mut dashboard = StudentDashboard::new(Arc::new(self.classroom.clone()), student()).with_clock(clock);
        dashboard.load().await;
        dashboard
    }

    fn board_status(dashboard: &StudentDashboard, class: &ContractAddress) -> String {
        dashboard
            .notes_board(class)
            .and_then(|b| b.status())
            .map(|s| s.text.clone())
            .unwrap_or_default()
    }
}

fn upload_form(price: &str) -> UploadNotesForm {
    let mut form = UploadNotesForm::default();
    form.title = "My notes".to_string();
    form.description = "Lecture one summary".to_string();
    form.price = price.to_string();
    form.lecture_id = Some(1);
    form.attach(pdf(2048)).unwrap();
    form
}

#[tokio::test]
async fn test_only_approved_notes_are_listed() {
    let fixture = TestFixture::new();
    let dashboard = fixture.dashboard().await;

    let board = dashboard.notes_board(&fixture.class).unwrap();
    assert_eq!(board.notes_contract(), &fixture.notes_contract);
    assert_eq!(board.listings().len(), 1);
    let listing = &board.listings()[0];
    assert_eq!(listing.note.title, "Week 1");
    assert_eq!(
        listing.affordance,
        NoteAffordance::Purchase {
            price: "0.01".to_string()
        }
    );
}

#[tokio::test]
async fn test_bought_note_can_only_be_viewed() {
    let fixture = TestFixture::new();
    let mut dashboard = fixture.dashboard().await;

    dashboard.purchase_note(&fixture.class, 1).await;

    assert_eq!(
        TestFixture::board_status(&dashboard, &fixture.class),
        "You have purchased \"Week 1\""
    );
    let has_purchased = pheroclass::Classroom::has_purchased_note(
        &fixture.classroom,
        &fixture.notes_contract,
        1,
        &student(),
    )
    .await
    .unwrap();
    assert!(has_purchased);

    let board = dashboard.notes_board(&fixture.class).unwrap();
    let listing = board.listing(1).unwrap();
    assert!(listing.is_purchased());
    assert_eq!(
        listing.affordance,
        NoteAffordance::View {
            url: "https://ipfs.io/ipfs/bafy1".to_string()
        }
    );
    assert!(!board.is_busy(1));
}

#[tokio::test]
async fn test_refused_purchase_shows_revert_reason() {
    let fixture = TestFixture::new();
    let mut dashboard = fixture.dashboard().await;
    fixture
        .classroom
        .revert("purchase_note", "insufficient funds for gas * price + value");

    dashboard.purchase_note(&fixture.class, 1).await;

    assert_eq!(
        TestFixture::board_status(&dashboard, &fixture.class),
        "Error: Insufficient funds for transaction"
    );
    let board = dashboard.notes_board(&fixture.class).unwrap();
    assert!(!board.listing(1).unwrap().is_purchased());
    assert!(!board.is_busy(1));
}

#[tokio::test]
async fn test_class_without_notes_contract() {
    let fixture = TestFixture::new();
    let bare = {
        let mut world = fixture.classroom.world();
        let bare = world.add_class(&teacher(), "Networks", "NET");
        world.enroll(&bare, &student(), "Ada");
        bare
    };
    let mut dashboard = fixture.dashboard().await;

    assert!(dashboard.notes_board_mut(&bare).is_none());
    assert_eq!(
        dashboard.status().map(|s| s.text.as_str()),
        Some("Notes feature is not available for this class.")
    );
    assert!(!dashboard.open_upload_notes(&bare));
}

#[tokio::test]
async fn test_upload_creates_pending_note() {
    let fixture = TestFixture::new();
    let mut dashboard = fixture.dashboard().await;
    let store = FakeFileStore::default();

    assert!(dashboard.open_upload_notes(&fixture.class));
    let note_id = dashboard
        .upload_notes(&fixture.class, &store, &upload_form("0.02"))
        .await
        .unwrap();

    assert_eq!(note_id, 3);
    assert!(!dashboard.modal().is_open());
    assert_eq!(
        TestFixture::board_status(&dashboard, &fixture.class),
        "Notes uploaded successfully! They will be reviewed by the instructor."
    );
    assert_eq!(store.uploads.lock().unwrap().as_slice(), &[("week1.pdf".to_string(), 2048usize)]);

    let board = dashboard.notes_board(&fixture.class).unwrap();
    let created = &board.created()[0];
    assert_eq!(created.title, "My notes");
    assert_eq!(created.ipfs_hash, "bafyupload1");
    assert!(!created.is_approved);
    assert!(board.listing(note_id).is_none());
}

#[tokio::test]
async fn test_failed_upload_keeps_popup_open() {
    let fixture = TestFixture::new();
    let mut dashboard = fixture.dashboard().await;
    let store = FakeFileStore {
        fail: true,
        ..Default::default()
    };

    assert!(dashboard.open_upload_notes(&fixture.class));
    assert!(
        dashboard
            .upload_notes(&fixture.class, &store, &upload_form("0.02"))
            .await
            .is_none()
    );

    assert!(matches!(dashboard.modal().current(), Some(Modal::UploadNotes { .. })));
    assert_eq!(
        TestFixture::board_status(&dashboard, &fixture.class),
        "There was an error uploading your notes. Please try again."
    );
    assert_eq!(fixture.classroom.calls("create_note"), 0);
    assert!(!dashboard.notes_board(&fixture.class).unwrap().is_uploading());
}

#[tokio::test]
async fn test_upload_needs_every_field() {
    let fixture = TestFixture::new();
    let mut dashboard = fixture.dashboard().await;
    let store = FakeFileStore::default();
    let mut form = upload_form("0.02");
    form.description.clear();

    assert!(dashboard.open_upload_notes(&fixture.class));
    assert!(dashboard.upload_notes(&fixture.class, &store, &form).await.is_none());

    assert!(store.uploads.lock().unwrap().is_empty());
    assert!(dashboard.modal().is_open());
}

#[tokio::test]
async fn test_price_update_rereads_the_note() {
    let fixture = TestFixture::new();
    fixture
        .classroom
        .world()
        .add_note(&fixture.notes_contract, &student(), "Own notes", "0.01", true);
    let mut dashboard = fixture.dashboard().await;

    let board = dashboard.notes_board_mut(&fixture.class).unwrap();
    assert_eq!(board.created().len(), 1);
    board
        .update_price(
            3,
            &PriceForm {
                price: "0.025".to_string(),
            },
        )
        .await;

    assert_eq!(
        board.status().map(|s| s.text.as_str()),
        Some("Your note price has been updated successfully")
    );
    assert_eq!(board.created()[0].price, "0.025");
    assert!(fixture.classroom.calls("fetch_note") > 0);
}

#[tokio::test]
async fn test_zero_price_is_rejected_before_any_write() {
    let fixture = TestFixture::new();
    fixture
        .classroom
        .world()
        .add_note(&fixture.notes_contract, &student(), "Own notes", "0.01", true);
    let mut dashboard = fixture.dashboard().await;

    let board = dashboard.notes_board_mut(&fixture.class).unwrap();
    board
        .update_price(3, &PriceForm { price: "0.0".to_string() })
        .await;

    assert!(board.status().is_some_and(|s| s.is_error()));
    assert_eq!(board.created()[0].price, "0.01");
    assert_eq!(fixture.classroom.calls("update_note_price"), 0);
}

#[tokio::test]
async fn test_sales_of_own_notes() {
    let fixture = TestFixture::new();
    fixture
        .classroom
        .world()
        .add_note(&fixture.notes_contract, &student(), "Own notes", "0.01", true);
    let buyer = fixture.classroom.as_account(other_student());
    pheroclass::Classroom::purchase_note(&buyer, &fixture.notes_contract, 3)
        .await
        .unwrap();
    let dashboard = fixture.dashboard().await;

    let sales = dashboard.notes_board(&fixture.class).unwrap().sales().await;

    let key = pheroclass_classroom::NoteKey::new(fixture.notes_contract.clone(), 3);
    assert_eq!(sales.get(&key), Some(&1));
}
