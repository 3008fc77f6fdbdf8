//! HTML templates loaded from a file glob and rendered with minijinja.
//!
//! Templates are registered under their file name, so `templates/*.tmpl`
//! yields `index.tmpl`, `css.tmpl` and so on. Wildcards (`*`, `?`) are
//! supported in the file-name component only. Loading happens once at
//! startup; a malformed glob, an empty match or a template syntax error is
//! reported as an error for the caller to treat as fatal.

use anyhow::{anyhow, bail, Context as _, Result};
use minijinja::Environment;
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Named template set shared read-only by all requests.
#[derive(Debug, Default)]
pub struct HtmlTemplates {
    env: Environment<'static>,
    names: Vec<String>,
}

impl HtmlTemplates {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Template environment, for registering functions and filters.
    pub fn env_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Register one template from source.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not parse.
    pub fn add_template(&mut self, name: &str, source: String) -> Result<()> {
        self.env
            .add_template_owned(name.to_string(), source)
            .with_context(|| format!("failed to parse template '{name}'"))?;
        self.names.push(name.to_string());
        Ok(())
    }

    /// Load every file matching `pattern`, returning how many were loaded.
    ///
    /// # Errors
    ///
    /// Fails if the glob has wildcards outside the file name, cannot be read,
    /// matches nothing, or a matched template does not parse.
    pub fn load_glob(&mut self, pattern: &str) -> Result<usize> {
        let path = Path::new(pattern);
        let file_pattern = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("template glob '{pattern}' has no file name component"))?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if dir.to_string_lossy().contains(|c| c == '*' || c == '?') {
            bail!("template glob '{pattern}': wildcards are only supported in the file name");
        }

        let matcher = glob_regex(file_pattern)?;
        let mut files: Vec<PathBuf> = fs::read_dir(&dir)
            .with_context(|| format!("cannot read template directory '{}'", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| matcher.is_match(n))
            })
            .collect();
        files.sort();

        if files.is_empty() {
            bail!("template glob '{pattern}' matched no files");
        }

        for file in &files {
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow!("non UTF-8 template name '{}'", file.display()))?
                .to_string();
            let source = fs::read_to_string(file)
                .with_context(|| format!("cannot read template '{}'", file.display()))?;
            self.add_template(&name, source)?;
            debug!(template = %name, path = %file.display(), "Template loaded");
        }

        info!(pattern = %pattern, count = files.len(), "HTML templates loaded");
        Ok(files.len())
    }

    /// Render template `name` with `data`.
    ///
    /// # Errors
    ///
    /// Returns the minijinja error for unknown templates or render failures.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(data)
    }

    /// Names of the loaded templates, in load order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Translate a file-name glob into an anchored regex.
fn glob_regex(file_pattern: &str) -> Result<Regex> {
    let mut re = String::from("^");
    for ch in file_pattern.chars() {
        match ch {
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            c => re.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
    }
    re.push('$');
    Regex::new(&re).with_context(|| format!("invalid template glob '{file_pattern}'"))
}
