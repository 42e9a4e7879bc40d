//! Line-annotated change sets parsed from unified diff text.
//!
//! The raw diff is parsed into one [`DiffFile`] per changed file so that the
//! reviewing agent sees explicit old/new line numbers for every line instead of
//! having to count hunk offsets itself.

use serde::Serialize;
use unidiff::{Hunk, PatchSet, PatchedFile};

use crate::error::ReviewError;

/// Kind of a single diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Line added by the change.
    Insert,
    /// Line removed by the change.
    Delete,
    /// Unchanged context line.
    Normal,
}

/// One line of a hunk with its position on each side of the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    /// Whether the line was added, removed, or kept.
    pub kind: ChangeKind,
    /// Line number before the change, absent for insertions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_line: Option<usize>,
    /// Line number after the change, absent for deletions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_line: Option<usize>,
    /// Line text without the diff marker.
    pub content: String,
}

/// A contiguous block of changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffHunk {
    /// Text following the `@@ ... @@` range, often the enclosing symbol.
    pub header: String,
    /// First line of the hunk before the change.
    pub old_start: usize,
    /// Number of lines the hunk spans before the change.
    pub old_lines: usize,
    /// First line of the hunk after the change.
    pub new_start: usize,
    /// Number of lines the hunk spans after the change.
    pub new_lines: usize,
    /// Lines in order.
    pub changes: Vec<DiffLine>,
}

/// All changes to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffFile {
    /// Path before the change, `/dev/null` for added files.
    pub old_path: String,
    /// Path after the change, `/dev/null` for removed files.
    pub new_path: String,
    /// Hunks in order.
    pub hunks: Vec<DiffHunk>,
}

impl DiffFile {
    /// Returns true when either side of the file matches one of `paths`
    /// exactly.
    #[must_use]
    pub fn matches_any(&self, paths: &[String]) -> bool {
        paths
            .iter()
            .any(|path| *path == self.old_path || *path == self.new_path)
    }
}

/// The structured diff of a pull request.
///
/// Treated as an immutable value once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    files: Vec<DiffFile>,
}

impl ChangeSet {
    /// Builds a change set from already structured files.
    #[must_use]
    pub const fn new(files: Vec<DiffFile>) -> Self {
        Self { files }
    }

    /// Parses unified diff text. Blank input yields an empty change set.
    ///
    /// Files without hunks, such as pure renames and binary changes, are kept
    /// with an empty hunk list.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Upstream`] when the text is not a parseable
    /// unified diff.
    pub fn parse(diff_text: &str) -> Result<Self, ReviewError> {
        if diff_text.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut files = Vec::new();
        for entry in split_entries(diff_text) {
            files.extend(parse_entry(&entry)?);
        }
        Ok(Self::new(files))
    }

    /// Removes every file whose old or new path is listed in `ignored_paths`.
    ///
    /// `None` and an empty list both leave the change set untouched.
    #[must_use]
    pub fn without_paths(self, ignored_paths: Option<&[String]>) -> Self {
        let Some(paths) = ignored_paths.filter(|paths| !paths.is_empty()) else {
            return self;
        };

        Self::new(
            self.files
                .into_iter()
                .filter(|file| !file.matches_any(paths))
                .collect(),
        )
    }

    /// Files in diff order.
    #[must_use]
    pub fn files(&self) -> &[DiffFile] {
        &self.files
    }

    /// Number of changed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true when no file changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

const GIT_HEADER: &str = "diff --git ";
const DEV_NULL: &str = "/dev/null";

/// Splits diff text at each `diff --git` line. Text before the first header
/// forms its own entry.
fn split_entries(diff_text: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for line in diff_text.split_inclusive('\n') {
        match entries.last_mut() {
            Some(current) if !line.starts_with(GIT_HEADER) => current.push_str(line),
            _ => entries.push(line.to_owned()),
        }
    }
    entries
}

/// Parses one entry. Renames, binary files, and mode changes carry no
/// `---`/`+++` lines, so their paths come from the git header instead.
fn parse_entry(entry: &str) -> Result<Vec<DiffFile>, ReviewError> {
    let mut patch_set = PatchSet::new();
    patch_set
        .parse(entry)
        .map_err(|error| ReviewError::Upstream {
            status: None,
            message: format!("diff could not be parsed: {error}"),
        })?;

    if patch_set.files().is_empty() {
        return Ok(header_only_file(entry).into_iter().collect());
    }
    Ok(patch_set.files().iter().map(convert_file).collect())
}

fn header_only_file(entry: &str) -> Option<DiffFile> {
    let mut lines = entry.lines();
    let (old_path, new_path) = lines.next()?.strip_prefix(GIT_HEADER)?.split_once(" b/")?;
    let mut file = DiffFile {
        old_path: strip_side_prefix(old_path, "a/").to_owned(),
        new_path: new_path.to_owned(),
        hunks: Vec::new(),
    };

    for line in lines {
        if let Some(path) = line.strip_prefix("rename from ") {
            path.clone_into(&mut file.old_path);
        } else if let Some(path) = line.strip_prefix("rename to ") {
            path.clone_into(&mut file.new_path);
        } else if line.starts_with("new file mode") {
            DEV_NULL.clone_into(&mut file.old_path);
        } else if line.starts_with("deleted file mode") {
            DEV_NULL.clone_into(&mut file.new_path);
        }
    }
    Some(file)
}

fn strip_side_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    path.strip_prefix(prefix).unwrap_or(path)
}

fn convert_file(file: &PatchedFile) -> DiffFile {
    DiffFile {
        old_path: strip_side_prefix(&file.source_file, "a/").to_owned(),
        new_path: strip_side_prefix(&file.target_file, "b/").to_owned(),
        hunks: file.hunks().iter().map(convert_hunk).collect(),
    }
}

fn convert_hunk(hunk: &Hunk) -> DiffHunk {
    let changes = hunk
        .lines()
        .iter()
        .filter_map(|line| {
            let kind = match line.line_type.as_str() {
                unidiff::LINE_TYPE_ADDED => ChangeKind::Insert,
                unidiff::LINE_TYPE_REMOVED => ChangeKind::Delete,
                unidiff::LINE_TYPE_CONTEXT => ChangeKind::Normal,
                _ => return None,
            };
            Some(DiffLine {
                kind,
                old_line: line.source_line_no,
                new_line: line.target_line_no,
                content: line.value.clone(),
            })
        })
        .collect();

    DiffHunk {
        header: hunk.section_header.trim().to_owned(),
        old_start: hunk.source_start,
        old_lines: hunk.source_length,
        new_start: hunk.target_start,
        new_lines: hunk.target_length,
        changes,
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{ChangeKind, ChangeSet};

    const TWO_FILE_DIFF: &str = "\
diff --git a/file1.ts b/file1.ts
index 1111111..2222222 100644
--- a/file1.ts
+++ b/file1.ts
@@ -8,3 +8,4 @@ export function greet() {
 const a = 1;
-const b = 2;
+const renamed = 2;
+const c = 3;
 return a;
diff --git a/package-lock.json b/package-lock.json
index 3333333..4444444 100644
--- a/package-lock.json
+++ b/package-lock.json
@@ -1,1 +1,1 @@
-{\"lockfileVersion\": 2}
+{\"lockfileVersion\": 3}
";

    #[fixture]
    fn change_set() -> ChangeSet {
        ChangeSet::parse(TWO_FILE_DIFF).expect("diff should parse")
    }

    #[rstest]
    fn parse_annotates_line_numbers(change_set: ChangeSet) {
        assert_eq!(change_set.len(), 2);
        let file = change_set.files().first().expect("first file");
        assert_eq!(file.old_path, "file1.ts");
        assert_eq!(file.new_path, "file1.ts");

        let hunk = file.hunks.first().expect("first hunk");
        assert_eq!((hunk.old_start, hunk.new_start), (8, 8));
        assert_eq!(hunk.header, "export function greet() {");

        let inserted: Vec<_> = hunk
            .changes
            .iter()
            .filter(|line| line.kind == ChangeKind::Insert)
            .map(|line| (line.new_line, line.content.as_str()))
            .collect();
        assert_eq!(
            inserted,
            [
                (Some(9), "const renamed = 2;"),
                (Some(10), "const c = 3;")
            ]
        );
    }

    #[rstest]
    fn blank_text_parses_to_empty_change_set() {
        let change_set = ChangeSet::parse("  \n").expect("blank diff should parse");
        assert!(change_set.is_empty());
    }

    #[rstest]
    fn no_ignore_list_and_empty_ignore_list_agree(change_set: ChangeSet) {
        let unfiltered = change_set.clone().without_paths(None);
        let empty_filter = change_set.clone().without_paths(Some(&[]));

        assert_eq!(unfiltered, change_set);
        assert_eq!(empty_filter, unfiltered);
    }

    #[rstest]
    fn unmatched_ignore_path_is_a_no_op(change_set: ChangeSet) {
        let ignored = vec!["yarn.lock".to_owned()];
        assert_eq!(change_set.clone().without_paths(Some(&ignored)), change_set);
    }

    #[rstest]
    fn matching_ignore_path_removes_file(change_set: ChangeSet) {
        let ignored = vec!["package-lock.json".to_owned()];
        let filtered = change_set.without_paths(Some(&ignored));

        let paths: Vec<_> = filtered
            .files()
            .iter()
            .map(|file| file.new_path.as_str())
            .collect();
        assert_eq!(paths, ["file1.ts"]);
    }

    #[rstest]
    #[case::matches_old_path("old/name.rs")]
    #[case::matches_new_path("new/name.rs")]
    fn renamed_file_is_removed_by_either_path(#[case] ignored_path: &str) {
        let diff = "\
--- a/old/name.rs
+++ b/new/name.rs
@@ -1,1 +1,1 @@
-fn old() {}
+fn new() {}
";
        let change_set = ChangeSet::parse(diff).expect("diff should parse");
        let ignored = vec![ignored_path.to_owned()];

        assert!(change_set.without_paths(Some(&ignored)).is_empty());
    }

    const HEADER_ONLY_DIFF: &str = "\
diff --git a/new.ts b/new.ts
new file mode 100644
index 0000000..1111111
--- /dev/null
+++ b/new.ts
@@ -0,0 +1,1 @@
+export const fresh = true;
diff --git a/old.ts b/moved.ts
similarity index 100%
rename from old.ts
rename to moved.ts
diff --git a/img.png b/img.png
new file mode 100644
index 0000000..2222222
Binary files /dev/null and b/img.png differ
diff --git a/run.sh b/run.sh
old mode 100644
new mode 100755
diff --git a/last.ts b/last.ts
index 3333333..4444444 100644
--- a/last.ts
+++ b/last.ts
@@ -1,1 +1,1 @@
-export const last = 1;
+export const last = 2;
\\ No newline at end of file
";

    #[rstest]
    fn entries_without_hunks_keep_their_paths_in_diff_order() {
        let change_set = ChangeSet::parse(HEADER_ONLY_DIFF).expect("diff should parse");

        let paths: Vec<_> = change_set
            .files()
            .iter()
            .map(|file| (file.old_path.as_str(), file.new_path.as_str(), file.hunks.len()))
            .collect();
        assert_eq!(
            paths,
            [
                ("/dev/null", "new.ts", 1),
                ("old.ts", "moved.ts", 0),
                ("/dev/null", "img.png", 0),
                ("run.sh", "run.sh", 0),
                ("last.ts", "last.ts", 1),
            ]
        );
    }

    #[rstest]
    #[case::matches_old_path("old.ts")]
    #[case::matches_new_path("moved.ts")]
    fn pure_rename_is_removed_by_either_path(#[case] ignored_path: &str) {
        let change_set = ChangeSet::parse(HEADER_ONLY_DIFF).expect("diff should parse");
        let ignored = vec![ignored_path.to_owned()];

        let filtered = change_set.without_paths(Some(&ignored));

        assert_eq!(filtered.len(), 4);
        assert!(
            filtered
                .files()
                .iter()
                .all(|file| file.old_path != "old.ts" && file.new_path != "moved.ts")
        );
    }

    #[rstest]
    fn serialises_as_file_list(change_set: ChangeSet) {
        let value = serde_json::to_value(&change_set).expect("change set should serialise");
        let first = value.get(0).expect("first file");
        assert_eq!(
            first.get("new_path").and_then(serde_json::Value::as_str),
            Some("file1.ts")
        );
    }
}
