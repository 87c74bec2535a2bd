//! `sourceMappingURL` comments.

use std::sync::LazyLock;

use regex::Regex;

static MAPPING_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*//[#@]\s*sourceMappingURL=(\S+)\s*$").expect("valid sourceMappingURL pattern")
});

/// The last `sourceMappingURL` in `content`, if any.
pub fn mapping_url(content: &str) -> Option<&str> {
    MAPPING_URL
        .captures_iter(content)
        .last()
        .and_then(|captures| captures.get(1))
        .map(|url| url.as_str())
        .filter(|url| !url.starts_with("data:"))
}

/// Append a `sourceMappingURL` comment for `map_file`.
///
/// A newline is inserted first when `content` does not end with one, and a
/// trailing newline is kept after the comment.
pub fn append_mapping_url(content: &mut String, map_file: &str) {
    let had_trailing_newline = content.ends_with('\n');
    if !had_trailing_newline {
        content.push('\n');
    }
    content.push_str("//# sourceMappingURL=");
    content.push_str(map_file);
    if had_trailing_newline {
        content.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_the_last_mapping_url() {
        let content = "a();\n//# sourceMappingURL=old.js.map\nb();\n//# sourceMappingURL=new.js.map\n";
        assert_eq!(mapping_url(content), Some("new.js.map"));
    }

    #[test]
    fn ignores_inline_maps_and_prose() {
        assert_eq!(mapping_url("//# sourceMappingURL=data:application/json;base64,e30="), None);
        assert_eq!(mapping_url("const s = 'sourceMappingURL=x.map';"), None);
    }

    #[test]
    fn appends_with_newline_handling() {
        let mut without = String::from("x();");
        append_mapping_url(&mut without, "a.js.map");
        assert_eq!(without, "x();\n//# sourceMappingURL=a.js.map");

        let mut with = String::from("x();\n");
        append_mapping_url(&mut with, "a.js.map");
        assert_eq!(with, "x();\n//# sourceMappingURL=a.js.map\n");
    }
}
