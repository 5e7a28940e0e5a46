
use fancy_regex::Regex;
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::{QaError, Result};

const DOCX_BODY_PART: &str = "word/document.xml";

/// Matches text runs, paragraph ends, tabs and line breaks in WordprocessingML
static DOCX_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|</w:p>|<w:tab\s*/>|<w:(?:br|cr)(?:\s[^>]*)?/>")
        .expect("valid regex")
});

static XML_ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#x([0-9a-fA-F]+)|#([0-9]+)|(amp|lt|gt|quot|apos));").expect("valid regex")
});

/// Document formats that can be turned into plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    pub const SUPPORTED_EXTENSIONS: [&'static str; 3] = ["pdf", "docx", "txt"];

    /// Select the format from a file extension, ignoring case
    #[inline]
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" => Ok(Self::Txt),
            _ => Err(QaError::UnsupportedFormat(path.display().to_string())),
        }
    }

    #[inline]
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }
}

impl fmt::Display for DocumentFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "PDF"),
            Self::Docx => write!(f, "DOCX"),
            Self::Txt => write!(f, "TXT"),
        }
    }
}

/// Produces the plain text of a document on disk
pub trait TextExtractor {
    fn extract(&self, path: &Path) -> Result<String>;
}

impl<T: TextExtractor + ?Sized> TextExtractor for &T {
    #[inline]
    fn extract(&self, path: &Path) -> Result<String> {
        (**self).extract(path)
    }
}

/// Extracts PDF, DOCX and plain-text files from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileExtractor;

impl TextExtractor for FileExtractor {
    #[inline]
    fn extract(&self, path: &Path) -> Result<String> {
        let format = DocumentFormat::from_path(path)?;
        debug!("Extracting {} text from {}", format, path.display());

        let text = match format {
            DocumentFormat::Txt => fs::read_to_string(path)?,
            DocumentFormat::Pdf => extract_pdf(path)?,
            DocumentFormat::Docx => extract_docx(path)?,
        };

        if text.trim().is_empty() {
            warn!("No text extracted from {}", path.display());
        }
        debug!("Extracted {} characters from {}", text.len(), path.display());
        Ok(text)
    }
}

fn extract_pdf(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(QaError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    pdf_extract::extract_text(path)
        .map_err(|e| QaError::Extraction(format!("PDF extraction failed for {}: {}", path.display(), e)))
}

fn extract_docx(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| QaError::Extraction(format!("{} is not a valid DOCX archive: {}", path.display(), e)))?;

    let mut body = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| QaError::Extraction(format!("{} has no document body: {}", path.display(), e)))?
        .read_to_string(&mut body)?;

    docx_body_text(&body)
}

/// Convert the body part of a DOCX archive into plain text, one line per paragraph
#[inline]
pub fn docx_body_text(xml: &str) -> Result<String> {
    let mut text = String::new();

    for token in DOCX_TOKEN_REGEX.captures_iter(xml) {
        let captures = token.map_err(|e| QaError::Extraction(format!("Failed to scan DOCX body: {}", e)))?;

        if let Some(run) = captures.get(1) {
            text.push_str(&decode_xml_entities(run.as_str())?);
            continue;
        }

        let Some(whole) = captures.get(0) else {
            continue;
        };
        match whole.as_str() {
            "</w:p>" => text.push('\n'),
            tag if tag.starts_with("<w:tab") => text.push('\t'),
            _ => text.push('\n'),
        }
    }

    Ok(text)
}

fn decode_xml_entities(raw: &str) -> Result<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut decoded = String::with_capacity(raw.len());
    let mut last_end = 0;

    for entity in XML_ENTITY_REGEX.captures_iter(raw) {
        let captures =
            entity.map_err(|e| QaError::Extraction(format!("Failed to decode XML entity: {}", e)))?;
        let Some(whole) = captures.get(0) else {
            continue;
        };

        decoded.push_str(raw.get(last_end..whole.start()).unwrap_or_default());
        last_end = whole.end();

        let code_point = if let Some(hex) = captures.get(1) {
            u32::from_str_radix(hex.as_str(), 16).ok()
        } else {
            captures.get(2).and_then(|dec| dec.as_str().parse().ok())
        };

        let replacement = match (code_point, captures.get(3).map(|m| m.as_str())) {
            (Some(code), _) => char::from_u32(code),
            (None, Some("amp")) => Some('&'),
            (None, Some("lt")) => Some('<'),
            (None, Some("gt")) => Some('>'),
            (None, Some("quot")) => Some('"'),
            (None, Some("apos")) => Some('\''),
            _ => None,
        };

        match replacement {
            Some(c) => decoded.push(c),
            None => decoded.push_str(whole.as_str()),
        }
    }

    decoded.push_str(raw.get(last_end..).unwrap_or_default());
    Ok(decoded)
}
