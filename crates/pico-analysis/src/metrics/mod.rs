//! Qualifier coverage and diagnostic metrics
//!
//! Summarizes a [`CheckReport`]: how many declared positions carry an
//! explicit qualifier versus a defaulted one, which qualifiers the program
//! ends up using, and how diagnostics are distributed over kinds.

use crate::checker::CheckReport;
use indexmap::IndexMap;
use pico_core::position::Origin;
use pico_core::Qualifier;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub coverage: QualifierCoverage,
    pub distribution: QualifierDistribution,
    pub diagnostics: DiagnosticSummary,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualifierCoverage {
    pub total_positions: usize,
    pub explicit: usize,
    pub defaulted: usize,
    pub propagated: usize,
    pub refined: usize,
    pub coverage_percentage: f64,
}

impl QualifierCoverage {
    fn add(&mut self, origin: Origin) {
        self.total_positions += 1;
        match origin {
            Origin::Explicit => self.explicit += 1,
            Origin::Defaulted => self.defaulted += 1,
            Origin::Propagated => self.propagated += 1,
            Origin::Refined => self.refined += 1,
        }
    }

    fn finish(&mut self) {
        self.coverage_percentage = if self.total_positions > 0 {
            (self.explicit as f64 / self.total_positions as f64) * 100.0
        } else {
            100.0
        };
    }
}

/// Count of declared positions per resolved qualifier, in lattice order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifierDistribution {
    pub counts: IndexMap<Qualifier, usize>,
}

impl Default for QualifierDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl QualifierDistribution {
    pub fn new() -> Self {
        Self {
            counts: Qualifier::ALL.iter().map(|q| (*q, 0)).collect(),
        }
    }

    pub fn add(&mut self, qualifier: Qualifier) {
        *self.counts.entry(qualifier).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Share of positions that are `@Immutable`, in percent
    pub fn immutable_share(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.get(&Qualifier::Immutable).copied().unwrap_or(0) as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticSummary {
    pub total: usize,
    /// Count per message key, in first-seen order
    pub by_key: IndexMap<String, usize>,
    /// Classes with at least one diagnostic
    pub classes_with_errors: usize,
}

/// Main analyzer for checker reports
pub struct Analyzer;

impl Analyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, report: &CheckReport) -> AnalysisResult {
        let mut coverage = QualifierCoverage::default();
        let mut distribution = QualifierDistribution::new();

        for annotation in report.positions.iter().filter_map(|p| p.annotation) {
            coverage.add(annotation.origin);
            distribution.add(annotation.qualifier);
        }
        coverage.finish();

        AnalysisResult {
            coverage,
            distribution,
            diagnostics: self.summarize_diagnostics(report),
        }
    }

    fn summarize_diagnostics(&self, report: &CheckReport) -> DiagnosticSummary {
        let mut summary = DiagnosticSummary {
            total: report.diagnostics.len(),
            ..DiagnosticSummary::default()
        };
        let mut classes = indexmap::IndexSet::new();
        for located in &report.diagnostics {
            *summary.by_key.entry(located.diagnostic.kind.key().to_string()).or_insert(0) += 1;
            classes.insert(located.location.class.as_str());
        }
        summary.classes_with_errors = classes.len();
        summary
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{LocatedDiagnostic, Location};
    use pico_core::position::{HostType, PositionKind, PrimitiveKind, TypePosition};
    use pico_core::{Diagnostic, DiagnosticKind};

    fn report() -> CheckReport {
        let mut report = CheckReport::default();
        report.positions = vec![
            TypePosition::with_explicit(PositionKind::InstanceField, HostType::object(), Some(Qualifier::Readonly)),
            TypePosition::new(PositionKind::Local, HostType::Primitive(PrimitiveKind::Int))
                .fill(Qualifier::Immutable, Origin::Defaulted),
            TypePosition::new(PositionKind::Local, HostType::object()).fill(Qualifier::Mutable, Origin::Defaulted),
            TypePosition::new(PositionKind::Local, HostType::string()).fill(Qualifier::Immutable, Origin::Refined),
        ];
        for (class, kind) in [
            ("A", DiagnosticKind::IllegalWrite),
            ("A", DiagnosticKind::IllegalWrite),
            ("B", DiagnosticKind::InvalidCastQualifier),
        ] {
            report.diagnostics.push(LocatedDiagnostic {
                location: Location {
                    class: class.to_string(),
                    member: "m".to_string(),
                },
                diagnostic: Diagnostic::new(kind, "x"),
            });
        }
        report
    }

    #[test]
    fn test_analyze_empty_report() {
        let result = Analyzer::new().analyze(&CheckReport::default());
        assert_eq!(result.coverage.total_positions, 0);
        assert_eq!(result.coverage.coverage_percentage, 100.0);
        assert_eq!(result.distribution.total(), 0);
        assert_eq!(result.diagnostics.total, 0);
    }

    #[test]
    fn test_coverage_by_origin() {
        let result = Analyzer::default().analyze(&report());
        assert_eq!(result.coverage.total_positions, 4);
        assert_eq!(result.coverage.explicit, 1);
        assert_eq!(result.coverage.defaulted, 2);
        assert_eq!(result.coverage.refined, 1);
        assert_eq!(result.coverage.coverage_percentage, 25.0);
    }

    #[test]
    fn test_distribution() {
        let result = Analyzer::new().analyze(&report());
        assert_eq!(result.distribution.counts[&Qualifier::Immutable], 2);
        assert_eq!(result.distribution.counts[&Qualifier::Bottom], 0);
        assert_eq!(result.distribution.immutable_share(), 50.0);
    }

    #[test]
    fn test_diagnostic_summary() {
        let result = Analyzer::new().analyze(&report());
        assert_eq!(result.diagnostics.total, 3);
        assert_eq!(result.diagnostics.by_key["illegal.write"], 2);
        assert_eq!(result.diagnostics.by_key["type.invalid"], 1);
        assert_eq!(result.diagnostics.classes_with_errors, 2);
    }
}
