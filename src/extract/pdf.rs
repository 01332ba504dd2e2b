use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::ExtractError;

/// Concatenates the extracted text of every page, in page order.
pub fn pdf_text(path: &Path) -> Result<String, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::MissingPdf(path.to_path_buf()));
    }

    let pdf_error = |err: lopdf::Error| ExtractError::Pdf {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let document = Document::load(path).map_err(pdf_error)?;
    let pages: Vec<u32> = document.get_pages().into_keys().collect();
    debug!(path = %path.display(), pages = pages.len(), "extracting pdf text");

    join_pages(pages, |page| {
        document.extract_text(&[page]).map_err(pdf_error)
    })
}

fn join_pages<I, F>(pages: I, mut page_text: F) -> Result<String, ExtractError>
where
    I: IntoIterator<Item = u32>,
    F: FnMut(u32) -> Result<String, ExtractError>,
{
    let mut text = String::new();
    for page in pages {
        text.push_str(&page_text(page)?);
    }
    Ok(text)
}
