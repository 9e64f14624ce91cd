use std::fs;
use std::path::Path;

use genpac_core::split_lines;

/// Inline rules first, then every file in order.
///
/// A file that cannot be read is logged and skipped.
pub fn load_user_rules<P: AsRef<Path>>(inline: &[String], files: &[P]) -> Vec<String> {
    let mut rules = inline.to_vec();

    for path in files {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Failed to read user rule file '{}': {}", path.display(), e);
                continue;
            }
        };
        let before = rules.len();
        rules.extend(split_lines(&content).into_iter().map(str::to_string));
        log::debug!("Read {} user rule lines from '{}'", rules.len() - before, path.display());
    }

    rules
}
