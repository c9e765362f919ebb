use std::io::{self, Write};

use sift_core::{ScanProgress, format_count};

use super::truncate_start;

const PATH_WIDTH: usize = 60;

/// Single self-overwriting status line on stderr
pub struct ProgressLine {
    enabled: bool,
    drawn: usize,
}

impl ProgressLine {
    /// A disabled line swallows updates, e.g. when stderr is not a terminal
    pub fn new(enabled: bool) -> Self {
        Self { enabled, drawn: 0 }
    }

    pub fn update(&mut self, progress: &ScanProgress) {
        if !self.enabled {
            return;
        }
        let text = render(progress);
        let pad = self.drawn.saturating_sub(text.chars().count());
        let mut stderr = io::stderr().lock();
        let _ = write!(stderr, "\r{text}{}", " ".repeat(pad));
        let _ = stderr.flush();
        self.drawn = text.chars().count();
    }

    pub fn clear(&mut self) {
        if self.enabled && self.drawn > 0 {
            let mut stderr = io::stderr().lock();
            let _ = write!(stderr, "\r{}\r", " ".repeat(self.drawn));
            let _ = stderr.flush();
            self.drawn = 0;
        }
    }
}

fn render(progress: &ScanProgress) -> String {
    let path = truncate_start(&progress.current_path.to_string_lossy(), PATH_WIDTH);
    match progress.estimated_progress {
        Some(percent) => format!(
            "Scanning {:>5.1}%  {} items  {path}",
            percent,
            format_count(progress.scanned_count)
        ),
        None => format!("Scanning  {} items  {path}", format_count(progress.scanned_count)),
    }
}
