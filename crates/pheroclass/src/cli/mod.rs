pub mod network;
pub mod student;
pub mod teacher;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use pheroclass::{Classroom, Role, Router, StatusKind, StatusMessage, StudentTab, TeacherTab, WalletSession};
use pheroclass_classroom::ContractAddress;
use pheroclass_ethereum::{EthereumClassroom, EthereumClassroomConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "pheroclass")]
#[command(about = "PheroClass classroom client", long_about = None)]
pub struct Cli {
    /// TOML file with the network and factory addresses
    #[arg(long, global = true, env = "PHEROCLASS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the JSON-RPC endpoint
    #[arg(long, global = true, env = "PHEROCLASS_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Private key of the account to act as
    #[arg(long, global = true, env = "PHEROCLASS_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the network, the account and its balance
    Network,

    /// Run classes as their owner
    Teacher {
        #[command(subcommand)]
        command: TeacherCommands,
    },

    /// Attend classes, take quizzes and trade notes
    Student {
        #[command(subcommand)]
        command: StudentCommands,
    },
}

#[derive(Subcommand, Clone)]
pub enum TeacherCommands {
    /// List owned classes with their lectures, quizzes and notes contract
    Classes {
        /// Only show this section of each class
        #[arg(long, value_enum)]
        tab: Option<TeacherTab>,
    },

    /// Create a class
    CreateClass { name: String, symbol: String },

    /// Enroll a student in a class
    AddStudent {
        class: ContractAddress,
        address: String,
        name: String,
    },

    /// Add a lecture to a class
    CreateLecture { class: ContractAddress, topic: String },

    /// Print the check-in code of a lecture
    AttendanceQr { class: ContractAddress, lecture: u64 },

    /// Show who attended a lecture
    Attendance {
        class: ContractAddress,
        lecture: u64,

        /// Also write the records to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Deploy a quiz contract owned by the account
    DeployQuizContract,

    /// Link a quiz contract to a class, deploying a new one when none is given
    LinkQuiz {
        class: ContractAddress,
        quiz_contract: Option<String>,
    },

    /// Create a quiz in the first quiz contract linked to a class
    CreateQuiz {
        class: ContractAddress,
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Lecture the quiz belongs to
        #[arg(long)]
        lecture: u64,

        /// Hours until the quiz expires
        #[arg(long, default_value = "24")]
        expires_in_hours: u64,

        /// JSON file with an array of {text, options, correct_option_index}
        #[arg(long, conflicts_with = "generate")]
        questions: Option<PathBuf>,

        /// Generate the questions from the title and description
        #[arg(long)]
        generate: bool,
    },

    /// Stop a quiz from accepting submissions
    DeactivateQuiz { quiz_contract: ContractAddress, quiz_id: u64 },

    /// Show every student's result for a quiz
    QuizResults {
        class: ContractAddress,
        quiz_contract: ContractAddress,
        quiz_id: u64,

        /// Also write the results to a CSV file in this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },

    /// Create the notes contract of a class
    CreateNotesContract { class: ContractAddress },

    /// List every note of a class, approved or not
    Notes { class: ContractAddress },

    /// Approve a note for sale, or reject it
    ApproveNote {
        class: ContractAddress,
        note_id: u64,

        #[arg(long)]
        reject: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum StudentCommands {
    /// List enrolled classes with lectures, attendance and quizzes
    Classes {
        /// Only show this section of each class
        #[arg(long, value_enum)]
        tab: Option<StudentTab>,
    },

    /// Check in to a lecture
    Attend { class: ContractAddress, lecture: u64 },

    /// Check in with the text read from a lecture's QR code
    Scan {
        /// Class the code is expected to belong to
        class: ContractAddress,
        payload: String,
    },

    /// Show a quiz's questions, or submit answers to it
    TakeQuiz {
        quiz_contract: ContractAddress,
        quiz_id: u64,

        /// Zero-based option index per question, comma separated
        #[arg(long, value_delimiter = ',')]
        answers: Vec<u64>,
    },

    /// Show the result of an attempted quiz
    QuizResult { quiz_contract: ContractAddress, quiz_id: u64 },

    /// List approved notes of a class and the account's own notes
    Notes { class: ContractAddress },

    /// Buy a note
    BuyNote { class: ContractAddress, note_id: u64 },

    /// Upload a PDF as a note, pending the instructor's approval
    UploadNote {
        class: ContractAddress,
        file: PathBuf,
        title: String,

        #[arg(long)]
        description: String,

        /// Price in ether
        #[arg(long)]
        price: String,

        #[arg(long)]
        lecture: u64,
    },

    /// Change the price of one of the account's notes
    SetPrice {
        class: ContractAddress,
        note_id: u64,
        price: String,
    },
}

impl Cli {
    pub fn classroom_config(&self) -> Result<EthereumClassroomConfig> {
        let mut config = match &self.config {
            Some(path) => EthereumClassroomConfig::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => EthereumClassroomConfig::default(),
        };
        if let Some(rpc_url) = &self.rpc_url {
            config.rpc_url = rpc_url.clone();
        }
        if let Some(private_key) = &self.private_key {
            config.private_key = Some(private_key.clone());
        }
        config.validate().map_err(|e| anyhow!("Invalid configuration: {}", e))?;
        debug!("Using RPC {} on chain {}", config.rpc_url, config.chain_id);
        Ok(config)
    }

    pub fn classroom(&self) -> Result<Arc<dyn Classroom>> {
        let classroom = EthereumClassroom::new(self.classroom_config()?)?;
        Ok(Arc::new(classroom))
    }
}

/// Build the binding, connect the configured account and open `role`'s dashboard
pub async fn connect(cli: &Cli, role: Role) -> Result<(Arc<dyn Classroom>, WalletSession)> {
    let classroom = cli.classroom()?;
    let mut router = Router::new();
    router.connected(
        WalletSession::connect(classroom.as_ref())
            .await
            .map_err(|e| anyhow!(e.user_message()))?,
    );
    if !router.select_role(role) {
        return Err(anyhow!("Cannot open the {:?} dashboard from {:?}", role, router.route()));
    }
    debug!("Route {:?}", router.route());
    let session = router
        .session()
        .cloned()
        .ok_or_else(|| anyhow!("No wallet connected"))?;
    println!(
        "🔗 Connected {} on chain {} ({} PTT)",
        session.short_account(),
        session.chain_id,
        session.balance
    );
    Ok((classroom, session))
}

/// Print a dashboard status; an error status fails the command
pub fn report(status: Option<&StatusMessage>) -> Result<()> {
    match status {
        Some(status) => match status.kind {
            StatusKind::Success => {
                println!("✅ {}", status);
                Ok(())
            }
            StatusKind::Info => {
                println!("ℹ️  {}", status);
                Ok(())
            }
            StatusKind::Error => {
                eprintln!("❌ {}", status);
                Err(anyhow!(status.text.clone()))
            }
        },
        None => Ok(()),
    }
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
