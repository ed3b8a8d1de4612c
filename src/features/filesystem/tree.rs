use crate::shared::utils::display_name;
use log::debug;
use std::path::Path;
use walkdir::WalkDir;

const INDENT: &str = "  ";

/// Renders `folder_path` as an indented tree.
///
/// The root is printed as `name:`; every descendant is indented two spaces per
/// level, with directories suffixed by `:`. Siblings are sorted by name.
/// A path that is missing or not a directory renders as an empty string.
pub fn render_folder_tree(folder_path: &Path) -> String {
    if !folder_path.is_dir() {
        return String::new();
    }

    let mut lines = Vec::new();
    for entry in WalkDir::new(folder_path).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", folder_path.display(), e);
                continue;
            }
        };

        let indent = INDENT.repeat(entry.depth());
        let name = if entry.depth() == 0 {
            display_name(folder_path)
        } else {
            entry.file_name().to_string_lossy().into_owned()
        };

        if entry.file_type().is_dir() {
            lines.push(format!("{}{}:", indent, name));
        } else {
            lines.push(format!("{}{}", indent, name));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn flat_directory_has_one_line_per_file_plus_root() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.json", "c.log"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }

        let tree = render_folder_tree(dir.path());
        let lines: Vec<&str> = tree.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], format!("{}:", display_name(dir.path())));
        assert_eq!(&lines[1..], &["  a.json", "  b.json", "  c.log"]);
    }

    #[test]
    fn nested_directories_are_indented() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("logs").join("old")).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("logs").join("client.log"), "x").unwrap();
        fs::write(dir.path().join("logs").join("old").join("1.log"), "x").unwrap();
        fs::write(dir.path().join("settings.json"), "{}").unwrap();

        let tree = render_folder_tree(dir.path());
        let lines: Vec<&str> = tree.lines().skip(1).collect();
        assert_eq!(
            lines,
            vec![
                "  empty:",
                "  logs:",
                "    client.log",
                "    old:",
                "      1.log",
                "  settings.json",
            ]
        );
    }

    #[test]
    fn missing_directory_renders_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(render_folder_tree(&dir.path().join("nope")), "");
    }
}
