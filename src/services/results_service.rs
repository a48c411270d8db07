use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::models::submission::SubmissionRecord;
use crate::services::submission_service::SubmissionBuilder;
use crate::utils::time::file_stamp;

const MAX_NAME_ATTEMPTS: usize = 100;

#[cfg_attr(test, mockall::automock)]
pub trait PersistenceSink: Send + Sync {
    /// Durably stores one record and returns where it went.
    fn save(&self, record: &SubmissionRecord) -> Result<String>;
}

/// Writes each submission to its own workbook under `results_dir`.
#[derive(Debug, Clone)]
pub struct XlsxResultSink {
    results_dir: PathBuf,
}

impl XlsxResultSink {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    /// `{candidate_id}_{YYYYMMDD_HHMMSS}`, without the extension.
    pub fn file_stem(record: &SubmissionRecord) -> String {
        format!(
            "{}_{}",
            sanitize_file_component(&record.candidate_id),
            file_stamp(record.completed_at)
        )
    }

    /// Claims the first free name among the stem, the stem plus the start of
    /// the session id, then numbered variants of the latter. The file is
    /// created exclusively.
    fn create_target(&self, record: &SubmissionRecord) -> io::Result<(PathBuf, File)> {
        let stem = Self::file_stem(record);
        let session = record.session_id.simple().to_string();
        let suffixed = format!("{}_{}", stem, &session[..8]);

        let names = std::iter::once(stem)
            .chain(std::iter::once(suffixed.clone()))
            .chain((2..=MAX_NAME_ATTEMPTS).map(|n| format!("{}_{}", suffixed, n)));
        for name in names {
            let path = self.results_dir.join(format!("{}.xlsx", name));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e),
            }
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "no free result file name for this submission",
        ))
    }

    fn write_workbook(record: &SubmissionRecord, file: File) -> std::result::Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Submission")?;

        let border_color = Color::RGB(0xE2E8F0);
        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x4F0202))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);
        let value_format = Format::new()
            .set_font_size(10)
            .set_align(FormatAlign::Top)
            .set_text_wrap()
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        let columns = SubmissionBuilder::columns(record);
        worksheet.set_row_height(0, 30)?;
        for (col, (header, value)) in columns.iter().enumerate() {
            let col = col as u16;
            let is_question_text = header.starts_with('Q') && !header.contains(' ');
            let width = if is_question_text || header.ends_with(" Answer") { 50.0 } else { 20.0 };
            worksheet.set_column_width(col, width)?;
            worksheet.write_string_with_format(0, col, header, &header_format)?;
            worksheet.write_string_with_format(1, col, value, &value_format)?;
        }
        worksheet.set_freeze_panes(1, 3)?;

        workbook.save_to_writer(file)?;
        Ok(())
    }
}

impl PersistenceSink for XlsxResultSink {
    fn save(&self, record: &SubmissionRecord) -> Result<String> {
        std::fs::create_dir_all(&self.results_dir).map_err(|e| {
            Error::Submission(format!(
                "Cannot create results directory {}: {}",
                self.results_dir.display(),
                e
            ))
        })?;

        let (path, file) = self.create_target(record).map_err(|e| {
            Error::Submission(format!(
                "Cannot create a result file in {}: {}",
                self.results_dir.display(),
                e
            ))
        })?;
        if let Err(e) = Self::write_workbook(record, file) {
            // Release the claimed name.
            std::fs::remove_file(&path).ok();
            return Err(Error::Submission(format!("Cannot write {}: {}", path.display(), e)));
        }

        tracing::info!(
            session_id = %record.session_id,
            candidate_id = %record.candidate_id,
            path = %path.display(),
            "Submission archived"
        );
        Ok(path.display().to_string())
    }
}

fn sanitize_file_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "candidate".to_string()
    } else {
        cleaned
    }
}
