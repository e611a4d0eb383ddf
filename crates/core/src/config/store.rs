//! JSON project documents on disk, one `<name>.json` per project.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{ProjectDescription, default_root, validate_project_name};
use crate::error::{Error, Result};

const PROJECT_EXT: &str = "json";
const APP_DIR: &str = ".muster";

/// Directory holding project documents
#[derive(Debug, Clone)]
pub struct ProjectStore {
    dir: PathBuf,
}

impl ProjectStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.muster`, if the home directory is known
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(APP_DIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a project's document. Fails for names that are not a single
    /// path component.
    pub fn path(&self, name: &str) -> Result<PathBuf> {
        validate_project_name(name)?;
        Ok(self.dir.join(format!("{}.{}", name, PROJECT_EXT)))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_ok_and(|path| path.is_file())
    }

    fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))
    }

    /// Write the template document for a new project, with `overrides`
    /// applied on top, and return its path.
    pub fn create(&self, name: &str, overrides: &[(String, String)]) -> Result<PathBuf> {
        let path = self.path(name)?;
        let template = serde_json::to_value(ProjectDescription::template(name))?;
        let project = self.resolve(name, template, overrides)?;
        self.save(&project)?;
        Ok(path)
    }

    /// Read a project's document. `overrides` are `KEY VALUE` pairs that
    /// replace top-level keys of the document before it is interpreted.
    pub fn load(&self, name: &str, overrides: &[(String, String)]) -> Result<ProjectDescription> {
        let path = self.path(name)?;
        if !path.is_file() {
            return Err(Error::ProjectNotFound(name.to_string()));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let document: Value = serde_json::from_str(&content)?;
        self.resolve(name, document, overrides)
    }

    fn resolve(
        &self,
        name: &str,
        document: Value,
        overrides: &[(String, String)],
    ) -> Result<ProjectDescription> {
        let Value::Object(mut map) = document else {
            return Err(Error::MalformedDescription(format!(
                "document for '{}' is not a JSON object",
                name
            )));
        };

        for (key, value) in overrides {
            map.insert(key.clone(), parse_override(value));
        }

        // The file name is authoritative for the project name
        map.insert("name".to_string(), Value::String(name.to_string()));

        let mut project: ProjectDescription = serde_json::from_value(Value::Object(map))?;
        if project.root.is_empty() {
            project.root = default_root(name);
        }
        Ok(project)
    }

    /// Write a project's document in canonical key order.
    pub fn save(&self, project: &ProjectDescription) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path(&project.name)?;
        let mut content = serde_json::to_string_pretty(project)?;
        content.push('\n');
        std::fs::write(&path, content).map_err(|e| Error::io(&path, e))
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path(name)?;
        if !path.is_file() {
            return Err(Error::ProjectNotFound(name.to_string()));
        }
        std::fs::remove_file(&path).map_err(|e| Error::io(&path, e))
    }

    /// Names of all stored projects, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == PROJECT_EXT))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Interpret an override value as JSON, falling back to a plain string.
pub fn parse_override(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Layout, error::ErrorKind};

    fn store() -> (tempfile::TempDir, ProjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(dir.path().join("projects"));
        (dir, store)
    }

    #[test]
    fn test_create_writes_template() {
        let (_dir, store) = store();
        let path = store.create("demo", &[]).unwrap();

        assert_eq!(path, store.path("demo").unwrap());
        let project = store.load("demo", &[]).unwrap();
        assert_eq!(project, ProjectDescription::template("demo"));
        assert_eq!(project.root, "~/demo");
    }

    #[test]
    fn test_document_keeps_key_order() {
        let (_dir, store) = store();
        store.create("demo", &[]).unwrap();
        let content = std::fs::read_to_string(store.path("demo").unwrap()).unwrap();

        let keys = [
            "\"name\"",
            "\"root\"",
            "\"socketName\"",
            "\"preCmd\"",
            "\"winPreCmd\"",
            "\"tmuxCmd\"",
            "\"tmuxOpts\"",
            "\"windows\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| content.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let (_dir, store) = store();
        store.create("demo", &[]).unwrap();

        let overrides = vec![
            ("root".to_string(), "/srv/demo".to_string()),
            (
                "windows".to_string(),
                r#"[{"name": "logs", "layout": "tiled", "panes": ["tail -f log"]}]"#.to_string(),
            ),
        ];
        let project = store.load("demo", &overrides).unwrap();

        assert_eq!(project.root, "/srv/demo");
        assert_eq!(project.windows.len(), 1);
        assert_eq!(project.windows[0].layout, Layout::Tiled);
    }

    #[test]
    fn test_create_applies_overrides() {
        let (_dir, store) = store();
        store
            .create("demo", &[("tmuxCmd".to_string(), "tmux -2".to_string())])
            .unwrap();
        assert_eq!(store.load("demo", &[]).unwrap().tmux_cmd, "tmux -2");
    }

    #[test]
    fn test_file_name_wins_over_document_name() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(
            store.path("real").unwrap(),
            r#"{"name": "other", "windows": [{"name": "w", "panes": []}]}"#,
        )
        .unwrap();

        let project = store.load("real", &[]).unwrap();
        assert_eq!(project.name, "real");
        assert_eq!(project.root, "~/real");
    }

    #[test]
    fn test_missing_project() {
        let (_dir, store) = store();
        let err = store.load("nope", &[]).unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(store.delete("nope").is_err());
    }

    #[test]
    fn test_non_object_document_is_malformed() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.path("list").unwrap(), "[1, 2]").unwrap();

        let err = store.load("list", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDescription);
    }

    #[test]
    fn test_list_and_delete() {
        let (_dir, store) = store();
        assert!(store.list().unwrap().is_empty());

        store.create("beta", &[]).unwrap();
        store.create("alpha", &[]).unwrap();
        std::fs::write(store.dir().join("notes.txt"), "x").unwrap();
        assert_eq!(store.list().unwrap(), vec!["alpha", "beta"]);

        store.delete("alpha").unwrap();
        assert!(!store.exists("alpha"));
        assert_eq!(store.list().unwrap(), vec!["beta"]);
    }

    #[test]
    fn test_names_cannot_leave_the_store() {
        let (dir, store) = store();
        let outside = dir.path().join("outside");
        std::fs::create_dir_all(&outside).unwrap();
        let victim = outside.join("victim.json");
        std::fs::write(&victim, "{}").unwrap();

        let absolute = outside.join("victim").to_string_lossy().into_owned();
        for name in [absolute.as_str(), "../outside/victim"] {
            assert_eq!(
                store.create(name, &[]).unwrap_err().kind(),
                ErrorKind::MalformedDescription
            );
            assert!(store.load(name, &[]).is_err());
            assert!(store.delete(name).is_err());
            assert!(!store.exists(name));
        }

        assert_eq!(std::fs::read_to_string(&victim).unwrap(), "{}");
        assert!(!store.dir().exists());
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override("3"), Value::from(3));
        assert_eq!(parse_override("\"quoted\""), Value::from("quoted"));
        assert_eq!(parse_override("~/plain path"), Value::from("~/plain path"));
    }
}
