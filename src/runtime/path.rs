//! Path utilities for script-facing file helpers.
//!
//! Paths are treated as POSIX strings regardless of host platform: relative
//! targets are joined onto the caller's directory and `.`/`..` segments are
//! removed lexically. Symlinks are left for the OS to resolve.

/// Forms the path a script means by `target`, given the directory of the
/// script that asked for it.
///
/// # Arguments
/// * `dirname` - Directory of the calling script (absolute or relative)
/// * `target` - Path as written by the script
///
/// # Returns
/// An absolute `target` unchanged; otherwise `dirname/target` with dot
/// segments removed.
pub fn canonicalize_path(dirname: &str, target: &str) -> String {
    if target.starts_with('/') {
        // Absolute targets resolve from the file system root.
        return target.to_string();
    }

    remove_dots(&posix_join(dirname, target))
}

fn posix_join(base: &str, target: &str) -> String {
    if base.is_empty() {
        return target.to_string();
    }
    if target.is_empty() {
        return base.to_string();
    }
    if base.ends_with('/') {
        format!("{base}{target}")
    } else {
        format!("{base}/{target}")
    }
}

/// Lexically removes `.` and `..` segments.
///
/// `..` consumes the previous segment; at the root of an absolute path it is
/// dropped, and at the front of a relative path it is kept.
fn remove_dots(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.last().is_some_and(|last| *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push(segment);
                }
            }
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_target_is_joined_and_normalized() {
        assert_eq!(canonicalize_path("/a/b", "../c/./d"), "/a/c/d");
    }

    #[test]
    fn test_absolute_target_ignores_base() {
        assert_eq!(canonicalize_path("/a/b", "/x/y"), "/x/y");
        assert_eq!(canonicalize_path("", "/x/y"), "/x/y");
    }

    #[test]
    fn test_absolute_target_keeps_dot_segments() {
        assert_eq!(canonicalize_path("/a", "/x/../y"), "/x/../y");
        assert_eq!(canonicalize_path("/a", "/./x"), "/./x");
    }

    #[test]
    fn test_plain_file_name() {
        assert_eq!(canonicalize_path("/srv/app", "index.js"), "/srv/app/index.js");
        assert_eq!(canonicalize_path("/srv/app/", "index.js"), "/srv/app/index.js");
    }

    #[test]
    fn test_dot_dot_cannot_escape_root() {
        assert_eq!(canonicalize_path("/a", "../../../etc/hosts"), "/etc/hosts");
        assert_eq!(canonicalize_path("/", ".."), "/");
    }

    #[test]
    fn test_relative_base_keeps_leading_dot_dot() {
        assert_eq!(canonicalize_path("lib", "../../x"), "../x");
        assert_eq!(canonicalize_path("lib/sub", "./../y"), "lib/y");
    }

    #[test]
    fn test_repeated_separators_collapse() {
        assert_eq!(canonicalize_path("/a//b", "c//d"), "/a/b/c/d");
    }

    #[test]
    fn test_empty_target_normalizes_base() {
        assert_eq!(canonicalize_path("/a/./b/..", ""), "/a");
    }
}
