use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeDelta, Utc};
use pheroclass::export::{ATTENDANCE_FILE_NAME, format_timestamp};
use pheroclass::{
    CreateClassForm, LectureForm, QuizGenClient, QuizGenConfig, Role, StudentForm, TeacherDashboard, TeacherTab,
};
use pheroclass_classroom::{LectureKey, QuestionDraft, QuizKey};
use pheroclass_storage::StorageConfig;
use std::path::Path;

use super::{Cli, TeacherCommands, connect, report, yes_no};

pub async fn handle_teacher_command(cli: &Cli, command: TeacherCommands) -> Result<()> {
    let (classroom, session) = connect(cli, Role::Teacher).await?;
    let mut dashboard =
        TeacherDashboard::new(classroom, session.account).with_gateway(StorageConfig::from_env().gateway);
    dashboard.load().await;
    report(dashboard.status())?;

    match command {
        TeacherCommands::Classes { tab } => {
            if let Some(tab) = tab {
                dashboard.set_tab(tab);
            }
            print_classes(&dashboard, tab.is_some())
        }

        TeacherCommands::CreateClass { name, symbol } => {
            dashboard.open_create_class();
            dashboard.create_class(&CreateClassForm { name, symbol }).await;
            report(dashboard.status())
        }

        TeacherCommands::AddStudent { class, address, name } => {
            dashboard.open_add_student(class.clone());
            let form = StudentForm {
                address,
                name,
                details: String::new(),
            };
            dashboard.add_student(&class, &form).await;
            report(dashboard.status())
        }

        TeacherCommands::CreateLecture { class, topic } => {
            dashboard.create_lecture(&class, &LectureForm { topic }).await;
            report(dashboard.status())
        }

        TeacherCommands::AttendanceQr { class, lecture } => {
            dashboard.take_attendance(LectureKey::new(class, lecture));
            if let Some(pheroclass::Modal::AttendanceQr { payload, .. }) = dashboard.modal().current() {
                println!("📷 Lecture {} check-in code", lecture);
                println!("{}", payload.render()?);
                println!("   {}", payload.encode());
            }
            Ok(())
        }

        TeacherCommands::Attendance { class, lecture, csv } => {
            let key = LectureKey::new(class, lecture);
            dashboard.view_attendance(key.clone()).await;
            report(dashboard.status())?;
            let records = dashboard.attendance_records(&key).unwrap_or_default();
            println!("📋 {} attendees at lecture {}", records.len(), lecture);
            for record in records {
                println!("   {}  {}", record.address, record.name);
            }
            if let Some(path) = csv {
                match dashboard.attendance_csv(&key) {
                    Some(content) => {
                        let path = if path.is_dir() { path.join(ATTENDANCE_FILE_NAME) } else { path };
                        write_file(&path, &content)?;
                    }
                    None => report(dashboard.status())?,
                }
            }
            Ok(())
        }

        TeacherCommands::DeployQuizContract => {
            dashboard.deploy_quiz_contract().await;
            report(dashboard.status())
        }

        TeacherCommands::LinkQuiz { class, quiz_contract } => {
            match quiz_contract {
                Some(address) => dashboard.link_quiz_contract(&class, &address).await,
                None => dashboard.deploy_and_link(&class).await,
            }
            report(dashboard.status())
        }

        TeacherCommands::CreateQuiz {
            class,
            title,
            description,
            lecture,
            expires_in_hours,
            questions,
            generate,
        } => {
            if !dashboard.open_create_quiz(&class) {
                return report(dashboard.status());
            }
            let form = dashboard
                .modal_mut()
                .quiz_form_mut()
                .and_then(|state| state.form_mut())
                .ok_or_else(|| anyhow!("Quiz editor is not open"))?;
            form.title = title;
            form.description = description;
            form.lecture_id = Some(lecture);
            form.expires_at = Some(expiry_after_hours(Utc::now(), expires_in_hours)?);
            if let Some(path) = questions {
                form.replace_questions(read_questions(&path)?);
            }

            if generate {
                let generator = QuizGenClient::new(QuizGenConfig::from_env())?;
                dashboard.generate_questions(&generator).await;
                report(dashboard.status())?;
            }
            if let Some(key) = dashboard.submit_quiz_form().await {
                println!("📝 Quiz {} in {}", key.quiz_id, key.contract);
            }
            report(dashboard.status())
        }

        TeacherCommands::DeactivateQuiz { quiz_contract, quiz_id } => {
            dashboard.deactivate_quiz(&QuizKey::new(quiz_contract, quiz_id)).await;
            report(dashboard.status())
        }

        TeacherCommands::QuizResults {
            class,
            quiz_contract,
            quiz_id,
            csv_dir,
        } => {
            let key = QuizKey::new(quiz_contract, quiz_id);
            dashboard.view_quiz_results(&class, key.clone()).await;
            report(dashboard.status())?;
            let rows = dashboard.quiz_results(&key).unwrap_or_default();
            println!("📊 {} students attempted quiz {}", rows.len(), quiz_id);
            for row in rows {
                println!(
                    "   {:<20} {}  {}/{} ({}%)  {}",
                    row.name,
                    row.address.short(),
                    row.score,
                    row.total_questions,
                    row.percentage(),
                    format_timestamp(row.attempted_at)
                );
            }
            if let Some(dir) = csv_dir {
                match dashboard.quiz_results_csv(&key) {
                    Some((file_name, content)) => write_file(&dir.join(file_name), &content)?,
                    None => report(dashboard.status())?,
                }
            }
            Ok(())
        }

        TeacherCommands::CreateNotesContract { class } => {
            dashboard.create_notes_contract(&class).await;
            report(dashboard.status())
        }

        TeacherCommands::Notes { class } => {
            let board = dashboard
                .notes_board(&class)
                .ok_or_else(|| anyhow!("Notes feature is not available for this class."))?;
            println!("📚 Notes in {}", board.notes_contract());
            for note in board.all_notes() {
                println!(
                    "   #{} {}  {} PTT  lecture {}  approved: {}  sales: {}",
                    note.id,
                    note.title,
                    note.price,
                    note.lecture_id,
                    yes_no(note.is_approved),
                    note.sales_count
                );
                println!("      {}", board.document_url(note));
            }
            Ok(())
        }

        TeacherCommands::ApproveNote { class, note_id, reject } => {
            let board = dashboard
                .notes_board_mut(&class)
                .ok_or_else(|| anyhow!("Notes feature is not available for this class."))?;
            board.set_approval(note_id, !reject).await;
            report(board.status())
        }
    }
}

/// All sections, or only the active tab's when `active_only`
fn print_classes(dashboard: &TeacherDashboard, active_only: bool) -> Result<()> {
    let shown = |tab: TeacherTab| !active_only || dashboard.tab() == tab;
    let board = dashboard.board();
    if board.classes.is_empty() {
        println!("No classes yet. Create one with `pheroclass teacher create-class`.");
        return Ok(());
    }
    for class in &board.classes {
        println!("🏫 {} ({})  {}", class.name, class.symbol, class.address);
        if shown(TeacherTab::Lectures) {
            for lecture in board.lectures_of(&class.address) {
                println!(
                    "   📖 #{} {}  {}",
                    lecture.id,
                    lecture.topic,
                    format_timestamp(lecture.date)
                );
            }
        }
        if shown(TeacherTab::Quizzes) {
            for (key, quiz) in board.quizzes_of(&class.address) {
                println!(
                    "   📝 {} #{} {}  lecture {}  {} questions",
                    key.contract.short(),
                    quiz.id,
                    quiz.title,
                    quiz.lecture_id,
                    quiz.question_count
                );
            }
        }
        if shown(TeacherTab::Notes) {
            match board.notes_contract_of(&class.address) {
                Some(notes) => println!("   📚 Notes contract {}", notes),
                None => println!("   📚 No notes contract"),
            }
        }
    }
    if shown(TeacherTab::Quizzes) && !dashboard.owned_quiz_contracts().is_empty() {
        println!("Quiz contracts owned:");
        for contract in dashboard.owned_quiz_contracts() {
            println!("   {}", contract);
        }
    }
    Ok(())
}

/// Quiz expiry `hours` from `now`, in milliseconds since the epoch
fn expiry_after_hours(now: DateTime<Utc>, hours: u64) -> Result<u64> {
    let expires_at = i64::try_from(hours)
        .ok()
        .and_then(TimeDelta::try_hours)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| anyhow!("Quiz expiry of {} hours is out of range", hours))?;
    u64::try_from(expires_at.timestamp_millis()).context("Quiz expiry is before the epoch")
}

fn read_questions(path: &Path) -> Result<Vec<QuestionDraft>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid questions in {}", path.display()))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("💾 Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_after_hours() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(expiry_after_hours(now, 24).unwrap(), 1_700_086_400_000);
        assert_eq!(expiry_after_hours(now, 0).unwrap(), 1_700_000_000_000);
    }

    #[test]
    fn test_expiry_out_of_range_is_an_error() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        assert!(expiry_after_hours(now, 100_000_000_000).is_err());
        assert!(expiry_after_hours(now, u64::MAX).is_err());
    }
}
