use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_WAVE_SCRIPT: &str = include_str!("../assets/wave.lua");

pub struct ScriptBuffer {
    path: PathBuf,
    text: String,
    default_text: String,
    max_len: usize,
    last_error: Option<String>,
}

impl ScriptBuffer {
    pub fn open(path: impl Into<PathBuf>, default_text: &str, max_len: usize) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            fs::write(&path, default_text)
                .with_context(|| format!("cannot create script {}", path.display()))?;
            log::info!("created {} from the default template", path.display());
        }
        let text = read_bounded(&path, max_len)?;
        log::info!("loaded {} ({} bytes)", path.display(), text.len());
        Ok(Self {
            path,
            text,
            default_text: default_text.to_string(),
            max_len,
            last_error: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn edit<F>(&mut self, edit: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        edit(&mut self.text);
        truncate_at_boundary(&mut self.text, self.max_len)
    }

    pub fn reset_to_default(&mut self) {
        self.text = self.default_text.clone();
        truncate_at_boundary(&mut self.text, self.max_len);
        self.last_error = None;
        log::info!("script reset to the default template");
    }

    pub fn save(&mut self) -> Result<()> {
        let result = fs::write(&self.path, &self.text)
            .with_context(|| format!("failed to save {}", self.path.display()));
        self.track(result)?;
        log::info!("saved {} ({} bytes)", self.path.display(), self.text.len());
        Ok(())
    }

    pub fn reopen(&mut self) -> Result<()> {
        let result = read_bounded(&self.path, self.max_len);
        let text = self.track(result)?;
        self.text = text;
        log::info!("reopened {}", self.path.display());
        Ok(())
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        match &result {
            Ok(_) => self.last_error = None,
            Err(err) => self.last_error = Some(format!("{err:#}")),
        }
        result
    }
}

fn read_bounded(path: &Path, max_len: usize) -> Result<String> {
    let mut text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(err).with_context(|| format!("script {} disappeared", path.display()));
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };
    if truncate_at_boundary(&mut text, max_len) {
        log::warn!(
            "{} is longer than {max_len} bytes, the rest was dropped",
            path.display()
        );
    }
    Ok(text)
}

fn truncate_at_boundary(text: &mut String, max_len: usize) -> bool {
    if text.len() <= max_len {
        return false;
    }
    let mut cut = max_len;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_is_created_from_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wave.lua");
        let buffer = ScriptBuffer::open(&path, DEFAULT_WAVE_SCRIPT, 16 * 1024).expect("open");
        assert_eq!(buffer.text(), DEFAULT_WAVE_SCRIPT);
        assert_eq!(fs::read_to_string(&path).expect("read"), DEFAULT_WAVE_SCRIPT);
    }

    #[test]
    fn existing_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wave.lua");
        fs::write(&path, "return 0").expect("write");
        let buffer = ScriptBuffer::open(&path, DEFAULT_WAVE_SCRIPT, 1024).expect("open");
        assert_eq!(buffer.text(), "return 0");
    }

    #[test]
    fn save_and_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wave.lua");
        let mut buffer = ScriptBuffer::open(&path, "a", 1024).expect("open");

        buffer.edit(|text| *text = "return t".into());
        buffer.save().expect("save");
        buffer.edit(|text| *text = "scratch".into());
        buffer.reopen().expect("reopen");
        assert_eq!(buffer.text(), "return t");
        assert!(buffer.last_error().is_none());
    }

    #[test]
    fn reset_restores_template() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut buffer =
            ScriptBuffer::open(dir.path().join("wave.lua"), "template", 1024).expect("open");
        buffer.edit(|text| *text = "edited".into());
        buffer.reset_to_default();
        assert_eq!(buffer.text(), "template");
    }

    #[test]
    fn mutations_respect_the_bound() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut buffer = ScriptBuffer::open(dir.path().join("wave.lua"), "", 4).expect("open");
        assert!(buffer.edit(|text| *text = "abcdef".into()));
        assert_eq!(buffer.text(), "abcd");
        // 'é' is two bytes and would straddle the bound.
        assert!(buffer.edit(|text| *text = "abcé".to_string()));
        assert_eq!(buffer.text(), "abc");
        assert!(!buffer.edit(|text| text.push('d')));
    }

    #[test]
    fn oversized_file_is_truncated_on_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wave.lua");
        fs::write(&path, "0123456789").expect("write");
        let buffer = ScriptBuffer::open(&path, "", 6).expect("open");
        assert_eq!(buffer.text(), "012345");
    }

    #[test]
    fn failed_save_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("wave.lua");
        let mut buffer = ScriptBuffer::open(&path, "x", 64).expect("open");
        fs::remove_file(&path).expect("remove");
        fs::create_dir(&path).expect("dir in the way");

        assert!(buffer.save().is_err());
        assert!(buffer.last_error().is_some_and(|e| e.contains("failed to save")));
        assert!(buffer.reopen().is_err());
    }

    #[test]
    fn unreadable_path_fails_open() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("wave.lua");
        assert!(ScriptBuffer::open(&path, "x", 64).is_err());
    }
}
