//! Ingestion dispatch for uploaded files.
//!
//! [`filter_file`] is the hand-off point after the upload handler has
//! confirmed the brain has room: it classifies the file by extension,
//! rejects duplicates by content digest, and records the file for the
//! downstream ingestion pipeline. Parsing, chunking, embedding, and
//! summary generation happen outside this service; the record (and its
//! summarization flag) is what the pipeline picks up.

use crate::{
    api::models::messages::IngestMessage,
    db::{
        handlers::{BrainFiles, Repository},
        models::files::{BrainFileCreateDBRequest, FileStatus},
    },
    errors::Result,
    types::{BrainId, UserId, abbrev_uuid},
};
use bytes::Bytes;
use sha2::{Digest, Sha256};
use sqlx::PgConnection;
use tracing::{info, instrument};

/// File kinds the ingestion pipeline understands, keyed by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Txt,
    Markdown,
    Csv,
    Html,
    Json,
    Jsonl,
    Pdf,
    Docx,
    Epub,
    Odt,
    Pptx,
    Xlsx,
}

impl FileKind {
    /// Classify a file extension (case-insensitive). Returns None for
    /// extensions the pipeline cannot process.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(FileKind::Txt),
            "md" | "markdown" => Some(FileKind::Markdown),
            "csv" => Some(FileKind::Csv),
            "html" | "htm" => Some(FileKind::Html),
            "json" => Some(FileKind::Json),
            "jsonl" => Some(FileKind::Jsonl),
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            "epub" => Some(FileKind::Epub),
            "odt" => Some(FileKind::Odt),
            "pptx" => Some(FileKind::Pptx),
            "xlsx" => Some(FileKind::Xlsx),
            _ => None,
        }
    }
}

/// An upload wrapped as a domain object, ready for ingestion dispatch.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    /// Content type declared by the client, if any
    pub declared_content_type: Option<String>,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, declared_content_type: Option<String>, content: Bytes) -> Self {
        Self {
            filename: filename.into(),
            declared_content_type,
            content,
        }
    }

    pub fn size_bytes(&self) -> i64 {
        self.content.len() as i64
    }

    /// The filename's extension, if it has one.
    pub fn extension(&self) -> Option<&str> {
        std::path::Path::new(&self.filename).extension().and_then(|e| e.to_str())
    }

    /// Hex-encoded SHA-256 digest of the content.
    pub fn sha256_hex(&self) -> String {
        let digest = Sha256::digest(&self.content);
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// The declared content type, falling back to a guess from the filename.
    pub fn content_type(&self) -> String {
        self.declared_content_type
            .clone()
            .unwrap_or_else(|| mime_guess::from_path(&self.filename).first_or_octet_stream().to_string())
    }
}

/// Dispatch an admitted upload into the ingestion pipeline.
///
/// Returns the outcome as an [`IngestMessage`]; only infrastructure failures
/// (database errors) surface as `Err`.
#[instrument(skip(conn, file, openai_api_key), fields(filename = %file.filename, brain = %abbrev_uuid(&brain_id)))]
pub async fn filter_file(
    conn: &mut PgConnection,
    file: &UploadedFile,
    enable_summarization: bool,
    brain_id: BrainId,
    openai_api_key: Option<&str>,
    uploaded_by: UserId,
) -> Result<IngestMessage> {
    let Some(_kind) = file.extension().and_then(FileKind::from_extension) else {
        return Ok(IngestMessage::error(format!("❌ File {} not supported.", file.filename)));
    };

    let mut repo = BrainFiles::new(conn);

    let sha256 = file.sha256_hex();
    if repo.find_by_digest(brain_id, &sha256).await?.is_some() {
        return Ok(IngestMessage::warning(format!("🤔 {} already exists.", file.filename)));
    }

    let record = repo
        .create(&BrainFileCreateDBRequest {
            brain_id,
            filename: file.filename.clone(),
            content_type: file.content_type(),
            size_bytes: file.size_bytes(),
            sha256,
            enable_summarization,
            openai_api_key_provided: openai_api_key.is_some(),
            status: FileStatus::Pending,
            uploaded_by,
        })
        .await?;

    info!(
        file_id = %record.id,
        size_bytes = record.size_bytes,
        enable_summarization,
        caller_key = openai_api_key.is_some(),
        "File recorded for ingestion"
    );

    Ok(IngestMessage::success(format!("✅ File {} has been uploaded.", file.filename)))
}
