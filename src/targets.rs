use std::path::Path;

/// Load the newline-separated target list. A missing or unreadable file is
/// not fatal: it logs and yields no targets, leaving the fallback decision
/// to the caller. Lines are not filtered here either; blank or malformed
/// entries travel on and are rejected by the drain loop's validation.
pub async fn load_target_file(path: &Path) -> Vec<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => {
            let targets: Vec<String> = contents.lines().map(str::to_string).collect();
            tracing::info!(
                "Imported {} target address(es) from {}",
                targets.len(),
                path.display()
            );
            targets
        }
        Err(err) => {
            tracing::warn!("Could not read target file {}: {err}", path.display());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_loads_lines_without_filtering() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a@example.com\n\nb@example.com\n").unwrap();

        let targets = load_target_file(file.path()).await;
        // The blank line is kept; validation happens at drain time.
        assert_eq!(targets, vec!["a@example.com", "", "b@example.com"]);
    }

    #[tokio::test]
    async fn test_missing_file_yields_no_targets() {
        let targets = load_target_file(Path::new("/no/such/file.txt")).await;
        assert!(targets.is_empty());
    }
}
