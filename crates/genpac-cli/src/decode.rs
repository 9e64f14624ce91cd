use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use genpac_core::split_lines;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("gfwlist is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedList {
    pub lines: Vec<String>,
    /// Value of the `! Last Modified:` header, if present.
    pub modified: Option<String>,
}

/// Decode the base64 gfwlist body into rule lines.
///
/// The first decoded line is the `[AutoProxy x.y.z]` banner, so the text is
/// prefixed with `! ` to turn it into a comment.
pub fn decode_gfwlist(raw: &str) -> Result<DecodedList, DecodeError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact.as_bytes())?;
    let text = format!("! {}", String::from_utf8_lossy(&bytes));

    let lines: Vec<String> = split_lines(&text).into_iter().map(str::to_string).collect();
    let modified = last_modified(&lines);

    log::debug!("Decoded gfwlist: {} lines, last modified {:?}", lines.len(), modified);

    Ok(DecodedList { lines, modified })
}

fn last_modified(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .find(|line| line.starts_with('!') && line.contains("Last Modified"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, value)| value.trim().to_string())
}
