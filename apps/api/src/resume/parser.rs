//! Resume text extraction.

use crate::errors::AppError;

/// Below this many characters the PDF is assumed to be a scanned image.
pub const MIN_RESUME_CHARS: usize = 50;

/// Extracts text from every page of a PDF held in memory.
pub fn parse_pdf(bytes: &[u8]) -> Result<String, AppError> {
    pdf_extract::extract_text_from_mem(bytes)
        .map(|t| t.trim().to_string())
        .map_err(|e| AppError::Validation(format!("Error parsing PDF: {e:?}")))
}

/// Collapses every whitespace run (including newlines) into a single space.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts and cleans resume text, rejecting documents with too little text.
pub fn extract_resume_text(bytes: &[u8]) -> Result<String, AppError> {
    let text = clean_text(&parse_pdf(bytes)?);
    if text.chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::Validation(
            "Could not extract meaningful text from PDF. Make sure it's a text-based PDF, not a scanned image.".to_string(),
        ));
    }
    Ok(text)
}

/// Last path segment of a storage URL, without any query string.
pub fn filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("resume.pdf")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let raw = "  Jane Doe\n\nSoftware   Engineer\t\tRust \r\n";
        assert_eq!(clean_text(raw), "Jane Doe Software Engineer Rust");
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text(" \n\t "), "");
    }

    #[test]
    fn test_garbage_bytes_are_a_validation_error() {
        let err = parse_pdf(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://x.supabase.co/storage/v1/object/public/resumes/abc/cv.pdf"),
            "cv.pdf"
        );
        assert_eq!(
            filename_from_url("https://cdn.example.com/r/jane.pdf?token=123"),
            "jane.pdf"
        );
        assert_eq!(filename_from_url("https://cdn.example.com/"), "cdn.example.com");
    }
}
