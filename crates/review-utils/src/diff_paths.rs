//! Changed-file extraction from a unified diff (spec §4.1 step 7).
//!
//! The core only ever needs the destination path out of each
//! `diff --git a/<from> b/<to>` header; hunk bodies are passed through
//! opaquely. This intentionally does not understand hunks, quoting of
//! unusual filenames, or binary-patch markers — that parsing level is a
//! non-goal (spec §1).

use indexmap::IndexSet;

const HEADER_PREFIX: &str = "diff --git a/";

/// Extracts the set of destination file paths touched by a unified diff.
/// A null or blank diff yields an empty set. Renames are handled because
/// only the `b/<to>` side is kept.
pub fn extract_changed_files(raw_diff: &str) -> IndexSet<String> {
  let mut paths = IndexSet::new();

  if raw_diff.trim().is_empty() {
    return paths;
  }

  for line in raw_diff.lines() {
    let Some(rest) = line.strip_prefix(HEADER_PREFIX) else {
      continue;
    };

    if let Some(to_path) = split_header_tail(rest) {
      paths.insert(to_path.to_string());
    }
  }

  paths
}

/// Given the text after `diff --git a/`, finds the ` b/` separator and
/// returns the destination path. Handles the common case where the source
/// path itself doesn't contain the literal sequence ` b/` by scanning for
/// the last occurrence, which is how real diffs avoid ambiguity when paths
/// contain spaces.
fn split_header_tail(rest: &str) -> Option<&str> {
  rest.rfind(" b/").map(|pos| &rest[pos + " b/".len()..])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_diff_yields_empty_set() {
    assert!(extract_changed_files("").is_empty());
    assert!(extract_changed_files("   \n  ").is_empty());
  }

  #[test]
  fn single_file_header() {
    let diff = "diff --git a/src/App.tsx b/src/App.tsx\n@@ -1,3 +1,4 @@\n+line\n";
    let paths = extract_changed_files(diff);
    assert_eq!(paths.into_iter().collect::<Vec<_>>(), vec!["src/App.tsx".to_string()]);
  }

  #[test]
  fn multiple_files_preserve_order_and_dedup() {
    let diff = "diff --git a/a.rs b/a.rs\n@@ -1 +1 @@\n-x\n+y\ndiff --git a/b.rs b/b.rs\n@@ -1 +1 @@\n-x\n+y\ndiff --git a/a.rs b/a.rs\n@@ -2 +2 @@\n-x\n+y\n";
    let paths = extract_changed_files(diff);
    assert_eq!(paths.into_iter().collect::<Vec<_>>(), vec!["a.rs".to_string(), "b.rs".to_string()]);
  }

  #[test]
  fn rename_keeps_destination_path_only() {
    let diff = "diff --git a/old/name.rs b/new/name.rs\nsimilarity index 100%\nrename from old/name.rs\nrename to new/name.rs\n";
    let paths = extract_changed_files(diff);
    assert_eq!(paths.into_iter().collect::<Vec<_>>(), vec!["new/name.rs".to_string()]);
  }

  #[test]
  fn ignores_non_header_lines() {
    let diff = "this is not a diff\njust some text mentioning diff --git a/x b/y in a comment body\n";
    // The header must start the line to count.
    assert!(extract_changed_files(diff).is_empty());
  }
}
