//! Terminal stylesheet.

use owo_colors::Style;

/// Styles for each kind of line the installer prints. `Styles::default()`
/// is the plain stylesheet used when colors are off.
#[derive(Default, Clone)]
pub struct Styles {
    /// `✓` marker of a finished run or write.
    pub ok: Style,
    /// `⚠` marker of a skipped or no-op path.
    pub warn: Style,
    /// `✗` marker of a fatal error.
    pub fail: Style,
    /// `ℹ` marker.
    pub note: Style,
    /// Key column of plan and config listings.
    pub label: Style,
    pub heading: Style,
    pub section: Style,
    /// `[n]` counter of reconciliation steps.
    pub step: Style,
    /// Download and remediation URLs.
    pub url: Style,
    /// Values hidden behind the redaction placeholder.
    pub redacted: Style,
}

impl Styles {
    /// Stylesheet for a color-capable terminal.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            fail: Style::new().red().bold(),
            note: Style::new().blue(),
            label: Style::new().dimmed(),
            heading: Style::new().bold().cyan(),
            section: Style::new().bold(),
            step: Style::new().cyan(),
            url: Style::new().underline(),
            redacted: Style::new().dimmed().italic(),
        }
    }
}
