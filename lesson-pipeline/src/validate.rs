//! Invariant checks run on every stage output before it is handed on.
//!
//! Positions in violations (`line`, `index`, `position`) are 1-based.

use crate::errors::ContractViolation;
use crate::models::{CodeArtifact, CodeChunk, ExplanationArtifact, is_blank, source_lines};

/// Generated code must contain at least one non-blank line.
pub fn code(artifact: &CodeArtifact) -> Result<(), ContractViolation> {
    if source_lines(&artifact.code).iter().all(|l| is_blank(l)) {
        return Err(ContractViolation::EmptyCode);
    }
    Ok(())
}

/// One entry per physical line of `source`, numbered `1..=N`, with verbatim
/// text (trailing whitespace ignored), `null` explanations exactly on blank
/// lines, and a non-empty summary.
pub fn explanation(source: &str, artifact: &ExplanationArtifact) -> Result<(), ContractViolation> {
    let lines = source_lines(source);
    if artifact.lines.len() != lines.len() {
        return Err(ContractViolation::LineCountMismatch {
            expected: lines.len(),
            actual: artifact.lines.len(),
        });
    }

    for (i, (entry, src)) in artifact.lines.iter().zip(&lines).enumerate() {
        let expected = i + 1;
        if entry.line_number != expected {
            return Err(ContractViolation::LineNumberOutOfSequence {
                position: expected,
                expected,
                found: entry.line_number,
            });
        }
        if entry.line_text.trim_end() != src.trim_end() {
            return Err(ContractViolation::LineTextMismatch { line: expected });
        }
        match (is_blank(src), entry.line_explanation.as_deref()) {
            (true, Some(_)) => return Err(ContractViolation::BlankLineExplained { line: expected }),
            (false, None) => return Err(ContractViolation::MissingExplanation { line: expected }),
            (false, Some(e)) if e.trim().is_empty() => {
                return Err(ContractViolation::MissingExplanation { line: expected });
            }
            _ => {}
        }
    }

    if artifact.summary.trim().is_empty() {
        return Err(ContractViolation::EmptySummary);
    }
    Ok(())
}

/// Chunks must tile `1..=total` exactly once, in order, each with a rationale.
pub fn chunks(total: usize, chunks: &[CodeChunk]) -> Result<(), ContractViolation> {
    if chunks.is_empty() {
        return if total == 0 {
            Ok(())
        } else {
            Err(ContractViolation::NoChunks)
        };
    }

    let mut next = 1;
    for (i, c) in chunks.iter().enumerate() {
        let index = i + 1;
        if c.first_line > c.last_line {
            return Err(ContractViolation::InvertedRange {
                index,
                first: c.first_line,
                last: c.last_line,
            });
        }
        if c.first_line == 0 {
            return Err(ContractViolation::ZeroLine { index });
        }
        if c.first_line > next {
            return Err(ContractViolation::Gap {
                index,
                expected: next,
                found: c.first_line,
            });
        }
        if c.first_line < next {
            return Err(ContractViolation::Overlap {
                index,
                expected: next,
                found: c.first_line,
            });
        }
        if c.last_line > total {
            return Err(ContractViolation::OutOfBounds {
                index,
                last: c.last_line,
                total,
            });
        }
        if c.rationale.trim().is_empty() {
            return Err(ContractViolation::MissingRationale { index });
        }
        next = c.last_line + 1;
    }

    if next <= total {
        return Err(ContractViolation::IncompleteCoverage {
            covered: next - 1,
            total,
        });
    }
    Ok(())
}
