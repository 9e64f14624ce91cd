/// Characters escaped before a glob is used as a regex.
const REGEX_META: &[char] = &['\\', '+', '|', '{', '}', '[', ']', '(', ')', '^', '$', '.', '#'];

/// Full-width question mark, the rule dialect's single-character wildcard.
/// ASCII `?` is a literal (query string separator).
const FULLWIDTH_QUESTION: char = '\u{FF1F}';

/// Translate a glob into an unanchored regex source fragment.
///
/// Metacharacters are escaped first, then `*` becomes `.*` and `？` becomes `.`.
pub fn wildcard_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() + glob.len() / 2);

    for ch in glob.chars() {
        match ch {
            '*' => out.push_str(".*"),
            FULLWIDTH_QUESTION => out.push('.'),
            c if REGEX_META.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }

    out
}
