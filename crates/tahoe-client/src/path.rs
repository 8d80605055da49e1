//! Capability-relative paths

/// Build the path addressing `name` inside the directory `dircap`.
///
/// `subdirs` is the chain of directory names between the root and `name`,
/// pass `&[]` when `name` lives directly in `dircap`.
///
/// The result is the human-readable form. It is not URL-escaped:
/// [`TahoeClient`](crate::TahoeClient) escapes each segment on its own.
///
/// ```
/// use tahoe_client::build_path;
///
/// assert_eq!(build_path("URI:DIR2:ab:cd", &[], "foo.txt"), "URI:DIR2:ab:cd/foo.txt");
/// assert_eq!(build_path("URI:DIR2:ab:cd", &["a", "b"], "foo.txt"), "URI:DIR2:ab:cd/a/b/foo.txt");
/// ```
pub fn build_path(dircap: &str, subdirs: &[&str], name: &str) -> String {
    if subdirs.is_empty() {
        return format!("{}/{}", dircap, name);
    }

    format!("{}/{}/{}", dircap, subdirs.join("/"), name)
}
