//! State capture - one screenshot per captured step

use std::path::{Path, PathBuf};

use crate::browser::Browser;
use crate::core::Result;

/// Extension of captured screenshots
pub const SCREENSHOT_EXT: &str = "png";

/// File name for the screenshot of step `index` (1-based)
pub fn screenshot_file_name(index: usize, label: &str) -> String {
    let label: String = label
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{:02}_{}.{}", index, label, SCREENSHOT_EXT)
}

/// Label used when a step doesn't name one
pub fn fallback_label(index: usize) -> String {
    format!("step_{}", index)
}

/// Screenshot the current page into `steps_dir` and return the file path.
///
/// Existing files with the same name are overwritten.
pub async fn capture<B>(
    browser: &mut B,
    steps_dir: &Path,
    index: usize,
    label: &str,
) -> Result<PathBuf>
where
    B: Browser + ?Sized,
{
    tokio::fs::create_dir_all(steps_dir).await?;
    let path = steps_dir.join(screenshot_file_name(index, label));
    browser.screenshot(&path).await?;
    Ok(path)
}
