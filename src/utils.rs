use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

pub fn is_executable(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Names of the executable files directly inside each directory of `paths`,
/// a colon separated list like `$PATH`. Unreadable directories are skipped.
pub fn executables_on_path(paths: &str) -> Vec<String> {
    let mut names = Vec::new();
    for dir in paths.split(':').filter(|d| !d.is_empty()) {
        let Ok(entries) = fs::read_dir(dir) else {
            continue;
        };
        for entry in entries.filter_map(Result::ok) {
            if is_executable(&entry.path()) {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
    }
    names
}
