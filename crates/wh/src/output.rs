//! Terminal reporting for `wh` commands.
//!
//! Status lines go to stderr so that `wh toc` output can be piped.

use std::path::Path;

use console::{Style, Term};

/// Color of a status line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Success,
    Warning,
    Error,
}

impl Tone {
    fn paint(self, msg: &str) -> String {
        let style = match self {
            Self::Plain => return msg.to_owned(),
            Self::Success => Style::new().green(),
            Self::Warning => Style::new().yellow(),
            Self::Error => Style::new().red(),
        };
        style.apply_to(msg).to_string()
    }
}

/// Status and document writer.
pub(crate) struct Output {
    stderr: Term,
    stdout: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            stderr: Term::stderr(),
            stdout: Term::stdout(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Error, msg);
    }

    /// Print the outcome of a build.
    pub(crate) fn build_report(&self, pages: usize, linked: usize, output_dir: &Path) {
        for (tone, msg) in build_report_lines(pages, linked, output_dir) {
            self.line(tone, &msg);
        }
    }

    /// Write a generated document to stdout.
    pub(crate) fn document(&self, content: &str) -> std::io::Result<()> {
        self.stdout.write_line(content)
    }

    fn line(&self, tone: Tone, msg: &str) {
        let _ = self.stderr.write_line(&tone.paint(msg));
    }
}

fn build_report_lines(pages: usize, linked: usize, output_dir: &Path) -> Vec<(Tone, String)> {
    let mut lines = Vec::with_capacity(2);
    let unlinked = pages.saturating_sub(linked);
    if unlinked > 0 {
        let noun = if unlinked == 1 { "page is" } else { "pages are" };
        lines.push((
            Tone::Warning,
            format!("{unlinked} {noun} not in the navigation"),
        ));
    }
    lines.push((
        Tone::Success,
        format!("Built {pages} pages to {}", output_dir.display()),
    ));
    lines
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_report_all_linked() {
        let lines = build_report_lines(3, 3, Path::new("_site"));

        assert_eq!(
            lines,
            vec![(Tone::Success, "Built 3 pages to _site".to_owned())]
        );
    }

    #[test]
    fn test_report_warns_about_unlinked_pages() {
        let lines = build_report_lines(4, 3, Path::new("out"));

        assert_eq!(lines[0], (Tone::Warning, "1 page is not in the navigation".to_owned()));
        assert_eq!(lines[1].0, Tone::Success);

        let lines = build_report_lines(5, 2, Path::new("out"));
        assert_eq!(lines[0].1, "3 pages are not in the navigation");
    }

    #[test]
    fn test_paint_keeps_text() {
        assert_eq!(Tone::Plain.paint("Source: docs"), "Source: docs");
        assert_eq!(
            console::strip_ansi_codes(&Tone::Warning.paint("careful")),
            "careful"
        );
    }
}
