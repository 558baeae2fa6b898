//! Text extraction for uploaded documents.
//!
//! Two formats: PDF (via pdf-extract, in memory) and UTF-8 plain text.
//! Extraction failures are data problems the admin can correct, so they
//! surface as 422s rather than server errors.

use std::path::Path;

use crate::errors::AppError;

/// Extracts plain text from an uploaded document, dispatching on the
/// file extension. Anything without a `.pdf` extension is treated as
/// plain text.
pub fn extract_text(filename: &str, data: &[u8]) -> Result<String, AppError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let text = match extension.as_deref() {
        Some("pdf") => pdf_extract::extract_text_from_mem(data).map_err(|e| {
            AppError::UnprocessableEntity(format!(
                "Could not extract text from '{filename}': {e}"
            ))
        })?,
        _ => String::from_utf8(data.to_vec()).map_err(|_| {
            AppError::UnprocessableEntity(format!(
                "'{filename}' is not valid UTF-8; upload plain text or a PDF"
            ))
        })?,
    };

    if text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "'{filename}' contained no extractable text"
        )));
    }
    Ok(text)
}
