// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for alias configuration loading.

#[cfg(test)]
mod tests {
    use super::super::Config;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn test_load_reads_aliases_from_json() {
        let file = write_config(
            r#"{
                "db.internal": ["q-s0.database.prod-network.prod.registry."],
                "_.apps": ["_.apps.prod-network.prod.registry."]
            }"#,
        );

        let config = Config::load(file.path()).expect("load alias config");
        assert_eq!(
            config.resolutions("db.internal."),
            vec!["q-s0.database.prod-network.prod.registry.".to_string()]
        );
        assert_eq!(
            config.resolutions("web.apps."),
            vec!["web.apps.prod-network.prod.registry.".to_string()]
        );
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let file = write_config("<not>json</not>");
        let err = Config::load(file.path()).unwrap_err();
        assert!(
            err.to_string().contains("decoding alias config"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_load_reports_missing_files() {
        let err = Config::load(std::path::Path::new("/nonexistent/aliases.json")).unwrap_err();
        assert!(
            err.to_string().contains("reading alias config"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_load_all_merges_with_later_files_winning() {
        let first = write_config(r#"{"shared": ["first-target."], "only-first": ["a."]}"#);
        let second = write_config(r#"{"shared": ["second-target."], "only-second": ["b."]}"#);

        let config =
            Config::load_all(&[first.path(), second.path()]).expect("load alias configs");
        assert_eq!(
            config.resolutions("shared."),
            vec!["second-target.".to_string()]
        );
        assert_eq!(config.resolutions("only-first."), vec!["a.".to_string()]);
        assert_eq!(config.resolutions("only-second."), vec!["b.".to_string()]);
    }

    #[test]
    fn test_load_all_of_nothing_is_empty() {
        let config = Config::load_all::<&std::path::Path>(&[]).expect("empty load");
        assert!(config.is_empty());
    }
}
