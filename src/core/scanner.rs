// ReconLog - core/scanner.rs
//
// Single-pass section scanner over a reconstruction log.
// Core layer: accepts content as a string, never touches the filesystem.
//
// The only scan state is `ScanMode`. It starts at `OutsideMetrics` for every
// call and never escapes the call.

use crate::core::classifier::{classify, LineClass};
use crate::util::constants;

/// Whether the scanner is currently inside a `Stack metrics` ... `Generated`
/// block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    #[default]
    OutsideMetrics,
    InsideMetrics,
}

impl ScanMode {
    /// Apply one classified line.
    ///
    /// Returns whether the line belongs to the metrics block and the mode for
    /// the next line. The opening and closing lines are both captured.
    pub fn step(self, class: LineClass) -> (bool, ScanMode) {
        let current = if class.starts_metrics_block {
            ScanMode::InsideMetrics
        } else {
            self
        };

        match current {
            ScanMode::InsideMetrics if class.ends_metrics_block => {
                (true, ScanMode::OutsideMetrics)
            }
            ScanMode::InsideMetrics => (true, ScanMode::InsideMetrics),
            ScanMode::OutsideMetrics => (false, ScanMode::OutsideMetrics),
        }
    }
}

/// The three ordered sections extracted from one log. Lines are trimmed of
/// surrounding whitespace, otherwise verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub exclusions: Vec<String>,
    pub correlations: Vec<String>,
    pub metrics: Vec<String>,
}

impl Sections {
    pub fn is_empty(&self) -> bool {
        self.exclusions.is_empty() && self.correlations.is_empty() && self.metrics.is_empty()
    }

    /// Render the human-readable summary document.
    ///
    /// The layout (banners, the renumbering footnote, the blank line before
    /// the metrics banner) is consumed downstream and must stay stable.
    pub fn render_summary(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n\n{}\n{}\n",
            constants::SUMMARY_EXCLUSION_BANNER,
            self.exclusions.join("\n"),
            constants::SUMMARY_RENUMBER_FOOTNOTE,
            constants::SUMMARY_CORRELATION_BANNER,
            self.correlations.join("\n"),
            constants::SUMMARY_METRICS_BANNER,
            self.metrics.join("\n"),
        )
    }
}

/// Scan a whole log and split it into sections.
///
/// Every line is tested for exclusion and correlation membership; metrics
/// capture follows the mode. An empty log, or one with no matches, yields
/// empty sections.
pub fn scan_content(content: &str) -> Sections {
    let mut sections = Sections::default();
    let mut mode = ScanMode::default();
    let mut lines_processed: u64 = 0;

    for raw in content.lines() {
        lines_processed += 1;
        let class = classify(raw, mode);
        let line = raw.trim();

        if class.exclusion_note {
            sections.exclusions.push(line.to_string());
        }
        if class.correlation_line {
            sections.correlations.push(line.to_string());
        }

        let (captured, next) = mode.step(class);
        if captured {
            sections.metrics.push(line.to_string());
        }
        if next != mode {
            tracing::trace!(line = lines_processed, from = ?mode, to = ?next, "Scan mode change");
        }
        mode = next;
    }

    if mode == ScanMode::InsideMetrics {
        tracing::debug!("Log ended inside an unterminated metrics block");
    }

    tracing::debug!(
        lines = lines_processed,
        exclusions = sections.exclusions.len(),
        correlations = sections.correlations.len(),
        metrics = sections.metrics.len(),
        "Log scan complete"
    );

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
Reading stacks
stack 2 excluded (low ncc)
iteration 0 - global metrics: ncc=0.61, nrmse=0.30
iteration 1 - global metrics: ncc=0.72, nrmse=0.22
unrelated line
Stack metrics (after exclusion)
  stack 0: ncc=0.90 weight=0.95
  stack 1: ncc=0.88 weight=0.91
Generated reconstruction.nii.gz
final ncc report
";

    #[test]
    fn test_sections_split() {
        let sections = scan_content(LOG);
        assert_eq!(sections.exclusions, vec!["stack 2 excluded (low ncc)"]);
        assert_eq!(
            sections.correlations,
            vec![
                "stack 2 excluded (low ncc)",
                "iteration 0 - global metrics: ncc=0.61, nrmse=0.30",
                "iteration 1 - global metrics: ncc=0.72, nrmse=0.22",
                "final ncc report",
            ]
        );
        assert_eq!(
            sections.metrics,
            vec![
                "Stack metrics (after exclusion)",
                "stack 0: ncc=0.90 weight=0.95",
                "stack 1: ncc=0.88 weight=0.91",
                "Generated reconstruction.nii.gz",
            ]
        );
    }

    #[test]
    fn test_ncc_inside_block_not_duplicated() {
        let sections = scan_content(LOG);
        for line in &sections.metrics {
            assert!(!sections.correlations.contains(line), "duplicated: {line}");
        }
    }

    #[test]
    fn test_empty_input_yields_empty_sections() {
        let sections = scan_content("");
        assert!(sections.is_empty());
        assert!(scan_content("nothing\nto see\n").is_empty());
    }

    #[test]
    fn test_block_can_reopen() {
        let log = "Stack metrics A\nncc 1\nGenerated a\nncc between\nStack metrics B\nGenerated b\n";
        let sections = scan_content(log);
        assert_eq!(sections.correlations, vec!["ncc between"]);
        assert_eq!(sections.metrics.len(), 5);
    }

    #[test]
    fn test_generated_outside_block_is_ignored() {
        let sections = scan_content("Generated early\nStack metrics\nx\nGenerated late\n");
        assert_eq!(sections.metrics, vec!["Stack metrics", "x", "Generated late"]);
    }

    #[test]
    fn test_step_transitions() {
        let start = LineClass {
            starts_metrics_block: true,
            ..Default::default()
        };
        let end = LineClass {
            ends_metrics_block: true,
            ..Default::default()
        };
        assert_eq!(
            ScanMode::OutsideMetrics.step(start),
            (true, ScanMode::InsideMetrics)
        );
        assert_eq!(
            ScanMode::InsideMetrics.step(end),
            (true, ScanMode::OutsideMetrics)
        );
        assert_eq!(
            ScanMode::OutsideMetrics.step(LineClass::default()),
            (false, ScanMode::OutsideMetrics)
        );
    }

    #[test]
    fn test_render_summary_layout() {
        let sections = Sections {
            exclusions: vec!["stack 1 excluded".into()],
            correlations: vec!["ncc=0.5".into(), "ncc=0.6".into()],
            metrics: vec!["Stack metrics".into(), "Generated x".into()],
        };
        let expected = "Summary of Stack Selection and Exclusion:\n\
                        stack 1 excluded\n\
                        *note that stacks are renumbered from 0 after this exclusion step\n\
                        Global Metrics for Each Iteration (0-3):\n\
                        ncc=0.5\n\
                        ncc=0.6\n\
                        \n\
                        Stack Metrics:\n\
                        Stack metrics\n\
                        Generated x\n";
        assert_eq!(sections.render_summary(), expected);
    }

    #[test]
    fn test_render_is_idempotent() {
        assert_eq!(
            scan_content(LOG).render_summary(),
            scan_content(LOG).render_summary()
        );
    }
}
