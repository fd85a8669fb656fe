use crate::enhance::PromptWorkspace;
use anyhow::{anyhow, Result};
use fs_err as fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Files written for one export. `original` and `enhanced` are only set when
/// they differ from the displayed prompt in `prompt`.
#[derive(Debug)]
pub struct SavedPaths {
    pub dir: PathBuf,
    pub prompt: PathBuf,
    pub original: Option<PathBuf>,
    pub enhanced: Option<PathBuf>,
}

fn run_dir(root: &Path, run: Uuid) -> PathBuf {
    root.join(run.to_string())
}

/// `notes.txt` + `original` -> `notes.original.txt`.
fn companion(path: &Path, tag: &str) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.{tag}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{tag}"),
    };
    path.with_file_name(name)
}

fn write_all(prompt: PathBuf, ws: &PromptWorkspace, original: PathBuf, enhanced: PathBuf) -> Result<SavedPaths> {
    let displayed = ws.displayed().ok_or_else(|| anyhow!("no prompt to export"))?;
    let dir = prompt.parent().map(Path::to_path_buf).unwrap_or_default();
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(&dir)?;
    }
    fs::write(&prompt, displayed)?;

    let mut saved = SavedPaths { dir, prompt, original: None, enhanced: None };
    if let Some(o) = ws.original().filter(|o| o.body != displayed) {
        fs::write(&original, &o.body)?;
        saved.original = Some(original);
    }
    if let Some(e) = ws.enhanced().filter(|e| e.body != displayed) {
        fs::write(&enhanced, &e.body)?;
        saved.enhanced = Some(enhanced);
    }
    Ok(saved)
}

/// Write the displayed prompt to `<root>/<run>/prompt.txt`, with
/// `original.txt` and `enhanced.txt` beside it for whichever is not shown.
pub fn save_workspace(root: &Path, ws: &PromptWorkspace, run: Uuid) -> Result<SavedPaths> {
    let dir = run_dir(root, run);
    write_all(dir.join("prompt.txt"), ws, dir.join("original.txt"), dir.join("enhanced.txt"))
}

/// Copy the displayed prompt to `path`. The other version, if any, goes to
/// `<stem>.original.<ext>` or `<stem>.enhanced.<ext>` next to it.
pub fn write_prompt(path: &Path, ws: &PromptWorkspace) -> Result<SavedPaths> {
    write_all(path.to_path_buf(), ws, companion(path, "original"), companion(path, "enhanced"))
}
