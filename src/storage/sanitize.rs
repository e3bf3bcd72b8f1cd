//! Filename sanitizer
//!
//! Untrusted filenames become safe path components: only the final path
//! segment survives, characters are restricted to an allowlist, and leading
//! dots are stripped so the result can never traverse out of the directory
//! it is joined to. Idempotent by construction.

/// Normalize an untrusted filename into a safe path component.
///
/// Returns `None` for input that reduces to nothing (empty, whitespace-only,
/// or consisting entirely of rejected characters).
pub fn sanitize(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();

    let mut name = String::with_capacity(base.len());
    for ch in base.chars() {
        match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => name.push(ch),
            c if c.is_whitespace() => name.push('_'),
            _ => {}
        }
    }

    let name = name.trim_start_matches('.');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn keeps_ordinary_names() {
        assert_eq!(sanitize("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(sanitize("My-File_2.pdf").as_deref(), Some("My-File_2.pdf"));
    }

    #[test]
    fn strips_directory_traversal() {
        assert_eq!(sanitize("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(sanitize("a/b/c.pdf").as_deref(), Some("c.pdf"));
        assert_eq!(sanitize("..\\..\\boot.ini").as_deref(), Some("boot.ini"));
    }

    #[test]
    fn rejects_empty_and_whitespace_input() {
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("   "), None);
        assert_eq!(sanitize("..."), None);
        assert_eq!(sanitize("///"), None);
    }

    #[test]
    fn replaces_inner_whitespace() {
        assert_eq!(sanitize("my report.pdf").as_deref(), Some("my_report.pdf"));
    }

    #[test]
    fn drops_unsafe_characters() {
        assert_eq!(sanitize("a<b>c:d.pdf").as_deref(), Some("abcd.pdf"));
        assert_eq!(sanitize(".hidden.pdf").as_deref(), Some("hidden.pdf"));
    }

    #[test]
    fn is_idempotent() {
        for raw in ["../../etc/passwd", "a/b/c.pdf", "my file.pdf", "..x.pdf", "ünïcode.pdf"] {
            let once = sanitize(raw).unwrap();
            assert_eq!(sanitize(&once).as_deref(), Some(once.as_str()));
        }
    }

    #[test]
    fn result_never_escapes_its_parent() {
        let parent = Path::new("/srv/uploads/session");
        for raw in ["../../etc/passwd", "..\\..\\x", "a/b/../c.pdf", "....//x.pdf"] {
            if let Some(safe) = sanitize(raw) {
                let joined = parent.join(&safe);
                assert!(joined.starts_with(parent), "{raw} escaped as {safe}");
                assert!(!safe.contains('/') && !safe.contains('\\'));
                assert_ne!(safe, "..");
            }
        }
    }
}
