// ReconLog - core/classifier.rs
//
// Per-line classification of reconstruction log output.
// Pure function of (line, scan mode); the scanner owns the mode.

use crate::core::scanner::ScanMode;
use crate::util::constants;
use regex::Regex;
use std::sync::OnceLock;

/// Semantic buckets a single log line falls into. A line may be in several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineClass {
    /// `stack <digits>` together with the word "excluded".
    pub exclusion_note: bool,
    /// Mentions `ncc` while outside the metrics block.
    pub correlation_line: bool,
    /// Contains `Stack metrics`.
    pub starts_metrics_block: bool,
    /// Contains `Generated` while the metrics block is (or just became) open.
    pub ends_metrics_block: bool,
}

fn exclusion_stack_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Constant pattern, covered by the tests below.
    RE.get_or_init(|| {
        Regex::new(constants::EXCLUSION_STACK_PATTERN).expect("invalid exclusion stack regex")
    })
}

/// Classify one raw line given the mode the scanner is in before the line.
///
/// The correlation test uses that prior mode, so a line that both mentions
/// `ncc` and opens the block still counts as a correlation line. The end test
/// also fires for a line that opens and closes the block at once.
pub fn classify(line: &str, mode: ScanMode) -> LineClass {
    let inside = mode == ScanMode::InsideMetrics;
    let starts = line.contains(constants::METRICS_BLOCK_START);

    LineClass {
        exclusion_note: line.contains(constants::EXCLUSION_WORD)
            && exclusion_stack_re().is_match(line),
        correlation_line: !inside && line.contains(constants::CORRELATION_MARKER),
        starts_metrics_block: starts,
        ends_metrics_block: (inside || starts) && line.contains(constants::METRICS_BLOCK_END),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_note_needs_both_tokens() {
        let out = ScanMode::OutsideMetrics;
        assert!(classify("stack 2 excluded due to motion", out).exclusion_note);
        assert!(classify("  excluded: stack 14", out).exclusion_note);
        assert!(!classify("stack 2 kept", out).exclusion_note);
        assert!(!classify("stack excluded", out).exclusion_note);
        assert!(!classify("Stack 2 excluded", out).exclusion_note);
    }

    #[test]
    fn test_correlation_line_suppressed_inside_block() {
        let line = "iteration 1: ncc=0.71";
        assert!(classify(line, ScanMode::OutsideMetrics).correlation_line);
        assert!(!classify(line, ScanMode::InsideMetrics).correlation_line);
    }

    #[test]
    fn test_block_markers() {
        let start = classify("Stack metrics:", ScanMode::OutsideMetrics);
        assert!(start.starts_metrics_block);
        assert!(!start.ends_metrics_block);

        let end_outside = classify("Generated output.nii.gz", ScanMode::OutsideMetrics);
        assert!(!end_outside.ends_metrics_block);

        let end_inside = classify("Generated output.nii.gz", ScanMode::InsideMetrics);
        assert!(end_inside.ends_metrics_block);
    }

    #[test]
    fn test_start_and_end_on_same_line() {
        let class = classify("Stack metrics Generated inline", ScanMode::OutsideMetrics);
        assert!(class.starts_metrics_block);
        assert!(class.ends_metrics_block);
    }

    #[test]
    fn test_plain_line_has_no_class() {
        assert_eq!(
            classify("Loading input stacks", ScanMode::OutsideMetrics),
            LineClass::default()
        );
    }
}
