use anyhow::{Context, Result, anyhow};
use pheroclass::export::format_timestamp;
use pheroclass::forms::PDF_CONTENT_TYPE;
use pheroclass::quiz::QUIZ_EXPIRED_MESSAGE;
use pheroclass::{
    Modal, NoteAffordance, NoteFile, PriceForm, QuizStatus, Role, StudentDashboard, StudentTab, UploadNotesForm,
};
use pheroclass_classroom::{LectureKey, QuizKey};
use pheroclass_storage::{IpfsClient, StorageConfig};

use super::{Cli, StudentCommands, connect, report, yes_no};

pub async fn handle_student_command(cli: &Cli, command: StudentCommands) -> Result<()> {
    let (classroom, mut session) = connect(cli, Role::Student).await?;
    let storage = StorageConfig::from_env();
    let mut dashboard =
        StudentDashboard::new(classroom.clone(), session.account.clone()).with_gateway(storage.gateway.clone());
    dashboard.load().await;
    report(dashboard.status())?;

    match command {
        StudentCommands::Classes { tab } => {
            if let Some(tab) = tab {
                dashboard.set_tab(tab);
            }
            print_classes(&dashboard, tab.is_some())
        }

        StudentCommands::Attend { class, lecture } => {
            if let Some(receipt) = dashboard.mark_attendance(LectureKey::new(class, lecture)).await {
                println!("🧾 Transaction {}", receipt.tx_hash);
                println!("   Signed check-in: {}", receipt.signature);
            }
            report(dashboard.status())
        }

        StudentCommands::Scan { class, payload } => {
            if !dashboard.select_class(&class) {
                return Err(anyhow!("Not enrolled in class {}", class));
            }
            dashboard.open_qr_scanner();
            if let Some(receipt) = dashboard.scan_qr(&payload).await {
                println!("🧾 Transaction {}", receipt.tx_hash);
            }
            report(dashboard.status())
        }

        StudentCommands::TakeQuiz {
            quiz_contract,
            quiz_id,
            answers,
        } => {
            let key = QuizKey::new(quiz_contract, quiz_id);
            dashboard.take_quiz(key).await;
            report(dashboard.status())?;

            if let Some(Modal::TakeQuiz { title, session, .. }) = dashboard.modal().current() {
                if answers.is_empty() {
                    println!("📝 {}", title);
                    if let pheroclass::QuizSession::InProgress { questions, .. } = session {
                        for (index, question) in questions.iter().enumerate() {
                            println!("{}. {}", index + 1, question.text);
                            for (option, text) in question.options.iter().enumerate() {
                                println!("   [{}] {}", option, text);
                            }
                        }
                    }
                    println!("Submit with --answers, one option index per question.");
                    return Ok(());
                }
            }
            for (question, option) in answers.into_iter().enumerate() {
                dashboard.answer(question, option);
            }
            report(dashboard.status())?;
            dashboard.submit_quiz().await;
            print_result_modal(&dashboard);
            report(dashboard.status())
        }

        StudentCommands::QuizResult { quiz_contract, quiz_id } => {
            dashboard.view_quiz_result(&QuizKey::new(quiz_contract, quiz_id)).await;
            print_result_modal(&dashboard);
            report(dashboard.status())
        }

        StudentCommands::Notes { class } => {
            let board = dashboard
                .notes_board_mut(&class)
                .ok_or_else(|| anyhow!("Notes feature is not available for this class."))?;
            println!("🛒 Notes for sale");
            for listing in board.listings() {
                let note = &listing.note;
                match &listing.affordance {
                    NoteAffordance::Purchase { price } => {
                        println!("   #{} {}  {} PTT  lecture {}", note.id, note.title, price, note.lecture_id)
                    }
                    NoteAffordance::View { url } => println!("   #{} {}  owned  {}", note.id, note.title, url),
                }
            }
            println!("✍️  Created");
            for note in board.created() {
                println!(
                    "   #{} {}  {} PTT  approved: {}  sales: {}",
                    note.id,
                    note.title,
                    note.price,
                    yes_no(note.is_approved),
                    note.sales_count
                );
            }
            println!("📦 Purchased");
            for note in board.purchased() {
                println!("   #{} {}  {}", note.id, note.title, board.document_url(note));
            }
            Ok(())
        }

        StudentCommands::BuyNote { class, note_id } => {
            dashboard.purchase_note(&class, note_id).await;
            report(dashboard.status())?;
            if let Some(board) = dashboard.notes_board(&class) {
                report(board.status())?;
            }
            session
                .refresh_balance(classroom.as_ref())
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("💰 Balance: {} PTT", session.balance);
            Ok(())
        }

        StudentCommands::UploadNote {
            class,
            file,
            title,
            description,
            price,
            lecture,
        } => {
            let bytes = std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "notes.pdf".to_string());
            let content_type = if name.to_lowercase().ends_with(".pdf") {
                PDF_CONTENT_TYPE.to_string()
            } else {
                "application/octet-stream".to_string()
            };

            let mut form = UploadNotesForm::default();
            form.title = title;
            form.description = description;
            form.price = price;
            form.lecture_id = Some(lecture);
            let note_file = NoteFile {
                name,
                content_type,
                bytes,
            };
            println!("📄 {} ({:.2} MB)", note_file.name, note_file.size_mb());
            form.attach(note_file)?;

            if !dashboard.open_upload_notes(&class) {
                return report(dashboard.status());
            }
            let store = IpfsClient::with_config(storage);
            if let Some(note_id) = dashboard.upload_notes(&class, &store, &form).await {
                println!("📄 Note #{}", note_id);
            }
            report(dashboard.status())?;
            match dashboard.notes_board(&class) {
                Some(board) => report(board.status()),
                None => Ok(()),
            }
        }

        StudentCommands::SetPrice { class, note_id, price } => {
            let board = dashboard
                .notes_board_mut(&class)
                .ok_or_else(|| anyhow!("Notes feature is not available for this class."))?;
            board.refresh_my_notes().await;
            board.update_price(note_id, &PriceForm { price }).await;
            report(board.status())
        }
    }
}

/// All sections, or only the active tab's when `active_only`
fn print_classes(dashboard: &StudentDashboard, active_only: bool) -> Result<()> {
    let shown = |tab: StudentTab| !active_only || dashboard.tab() == tab;
    let board = dashboard.board();
    if board.classes.is_empty() {
        println!("Not enrolled in any class yet.");
        return Ok(());
    }
    for class in &board.classes {
        println!("🏫 {} ({})  {}", class.name, class.symbol, class.address);
        if shown(StudentTab::Attendance) {
            for lecture in board.lectures_of(&class.address) {
                let attended = dashboard.has_attended(&LectureKey::new(class.address.clone(), lecture.id));
                println!(
                    "   {} #{} {}  {}",
                    if attended { "✅" } else { "⬜" },
                    lecture.id,
                    lecture.topic,
                    format_timestamp(lecture.date)
                );
            }
        }
        if shown(StudentTab::Quizzes) {
            for (key, quiz) in board.quizzes_of(&class.address) {
                let status = dashboard.quiz_status(&key).unwrap_or(QuizStatus::Available);
                let detail = match (status, dashboard.quiz_result(&key)) {
                    (QuizStatus::Completed, Some(result)) => {
                        format!("{}/{} ({}%)", result.score, result.total_questions, result.percentage())
                    }
                    (QuizStatus::Expired, _) => QUIZ_EXPIRED_MESSAGE.to_string(),
                    _ => format!("expires {}", format_timestamp(quiz.expires_at / 1000)),
                };
                println!(
                    "   📝 {} #{} {}  lecture {}  [{}]  {}",
                    key.contract.short(),
                    quiz.id,
                    quiz.title,
                    quiz.lecture_id,
                    status.label(),
                    detail
                );
            }
        }
        if shown(StudentTab::Notes) {
            match dashboard.notes_board(&class.address) {
                Some(notes) => println!(
                    "   📚 {} notes for sale, {} purchased",
                    notes.listings().len(),
                    notes.purchased().len()
                ),
                None => println!("   📚 Notes feature is not available for this class."),
            }
        }
    }
    Ok(())
}

fn print_result_modal(dashboard: &StudentDashboard) {
    if let Some(Modal::QuizResult(view)) = dashboard.modal().current() {
        println!("📊 {}", view.quiz_title);
        println!(
            "   Score: {}/{} ({}%)",
            view.score, view.total_questions, view.percentage
        );
        println!("   Attempted: {}", format_timestamp(view.attempted_at));
        println!("   {} {}", view.verdict.headline(), view.verdict.advice());
    }
}
