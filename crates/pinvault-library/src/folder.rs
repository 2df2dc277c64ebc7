//! Virtual folder paths.
//!
//! Folders are absolute `/`-separated paths with `/` as the root. They exist
//! only in the library; the content store is flat.

use serde::Serialize;

use crate::error::{LibraryError, LibraryResult};

pub const ROOT: &str = "/";

/// One step of a breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub name: String,
    pub path: String,
}

/// Normalize user input into a canonical folder path.
///
/// `""`, `"/"` and `"//"` are all the root; `"a/b/"` becomes `"/a/b"`.
pub fn normalize(path: &str) -> String {
    let parts: Vec<&str> = path
        .split('/')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        ROOT.to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Path of a new folder `name` under `parent`.
pub fn child_path(parent: &str, name: &str) -> LibraryResult<String> {
    let name = name.trim();
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(LibraryError::InvalidFolderName(name.to_string()));
    }
    let parent = normalize(parent);
    if parent == ROOT {
        Ok(format!("/{name}"))
    } else {
        Ok(format!("{parent}/{name}"))
    }
}

/// Parent of a folder path; the root is its own parent.
pub fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => ROOT.to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Last component of a folder path.
pub fn folder_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether `path` is `ancestor` or lies beneath it, comparing whole components.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return true;
    }
    match path.strip_prefix(ancestor) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

/// Breadcrumb trail from the root ("Home") down to `path`.
pub fn breadcrumbs(path: &str) -> Vec<Breadcrumb> {
    let mut crumbs = vec![Breadcrumb {
        name: "Home".into(),
        path: ROOT.into(),
    }];
    let mut current = String::new();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        current.push('/');
        current.push_str(part);
        crumbs.push(Breadcrumb {
            name: part.to_string(),
            path: current.clone(),
        });
    }
    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("a/b/"), "/a/b");
        assert_eq!(normalize("//a//b"), "/a/b");
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("/", "Photos").unwrap(), "/Photos");
        assert_eq!(child_path("/Photos", " 2024 ").unwrap(), "/Photos/2024");
        assert!(child_path("/", "  ").is_err());
        assert!(child_path("/", "a/b").is_err());
        assert!(child_path("/", "..").is_err());
    }

    #[test]
    fn test_parent_of() {
        assert_eq!(parent_of("/"), "/");
        assert_eq!(parent_of("/a"), "/");
        assert_eq!(parent_of("/a/b"), "/a");
    }

    #[test]
    fn test_is_within_matches_whole_components() {
        assert!(is_within("/a", "/a"));
        assert!(is_within("/a/b", "/a"));
        assert!(!is_within("/ab", "/a"));
        assert!(!is_within("/ab/c", "/a"));
        assert!(is_within("/anything", "/"));
    }

    #[test]
    fn test_breadcrumbs() {
        assert_eq!(
            breadcrumbs("/"),
            vec![Breadcrumb {
                name: "Home".into(),
                path: "/".into()
            }]
        );

        let crumbs = breadcrumbs("/Work/2024");
        let paths: Vec<&str> = crumbs.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/Work", "/Work/2024"]);
        assert_eq!(crumbs[2].name, "2024");
    }

    proptest! {
        #[test]
        fn child_is_within_parent_and_parent_of_child_is_parent(
            segs in prop::collection::vec("[a-z]{1,6}", 0..4),
            name in "[a-z]{1,6}",
        ) {
            let parent = normalize(&segs.join("/"));
            let child = child_path(&parent, &name).unwrap();
            prop_assert!(is_within(&child, &parent));
            prop_assert_eq!(parent_of(&child), parent);
            prop_assert_eq!(folder_name(&child), name.as_str());
        }
    }
}
