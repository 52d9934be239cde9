//! Compliance findings and the report that collects them.

use serde::Serialize;

use crate::summary::{compute_summary, ReportSummary};

// ---------------------------------------------------------------------------
// Check identifiers
// ---------------------------------------------------------------------------

/// Identifies a check. Variant order is the declaration order the engine
/// runs checks in and the order findings appear in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckId {
    BomVsSld,
    ColdWeatherVoc,
    StringLength,
    HighAmbientTemperature,
    MpptWindow,
    DcAcRatio,
    AcVoltageDrop,
}

impl CheckId {
    /// Every check, in declaration order.
    pub const ALL: [CheckId; 7] = [
        CheckId::BomVsSld,
        CheckId::ColdWeatherVoc,
        CheckId::StringLength,
        CheckId::HighAmbientTemperature,
        CheckId::MpptWindow,
        CheckId::DcAcRatio,
        CheckId::AcVoltageDrop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BomVsSld => "bom_vs_sld",
            Self::ColdWeatherVoc => "cold_weather_voc",
            Self::StringLength => "string_length",
            Self::HighAmbientTemperature => "high_ambient_temperature",
            Self::MpptWindow => "mppt_window",
            Self::DcAcRatio => "dc_ac_ratio",
            Self::AcVoltageDrop => "ac_voltage_drop",
        }
    }

    /// Human-readable title for rendered reports.
    pub fn title(&self) -> &'static str {
        match self {
            Self::BomVsSld => "BoM vs SLD Consistency",
            Self::ColdWeatherVoc => "Cold Weather Overvoltage",
            Self::StringLength => "String Length vs Inverter Limit",
            Self::HighAmbientTemperature => "High Ambient Temperature",
            Self::MpptWindow => "MPPT Voltage Window",
            Self::DcAcRatio => "DC/AC Ratio",
            Self::AcVoltageDrop => "AC Voltage Drop",
        }
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Outcome of a check. Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Pass,
    Warning,
    Fail,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warning => "warning",
            Self::Fail => "fail",
        }
    }
}

/// A value with its unit, e.g. `476.1 V`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub value: f64,
    pub unit: &'static str,
}

impl Measurement {
    pub fn new(value: f64, unit: &'static str) -> Self {
        Self { value, unit }
    }
}

// ---------------------------------------------------------------------------
// Finding
// ---------------------------------------------------------------------------

/// The result of one check invocation.
///
/// Built with the `with_*` methods while a check runs; once returned there is
/// no way to modify it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceFinding {
    check_id: CheckId,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    severity: Severity,
    message: String,
    observed: Option<Measurement>,
    threshold: Option<Measurement>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    recommendations: Vec<String>,
}

impl ComplianceFinding {
    pub fn new(check_id: CheckId, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            check_id,
            subject: None,
            severity,
            message: message.into(),
            observed: None,
            threshold: None,
            recommendations: Vec::new(),
        }
    }

    /// A failing finding naming the fields that were absent or unusable.
    pub fn missing_fields(check_id: CheckId, fields: &[&str]) -> Self {
        let noun = if fields.len() == 1 { "field" } else { "fields" };
        Self::new(
            check_id,
            Severity::Fail,
            format!(
                "Cannot evaluate: missing or invalid {noun} {}",
                fields.join(", ")
            ),
        )
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_observed(mut self, observed: Measurement) -> Self {
        self.observed = Some(observed);
        self
    }

    pub fn with_threshold(mut self, threshold: Measurement) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }

    pub fn check_id(&self) -> CheckId {
        self.check_id
    }

    /// What the finding is about when a check runs per item (e.g. a cable
    /// segment id).
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn observed(&self) -> Option<&Measurement> {
        self.observed.as_ref()
    }

    pub fn threshold(&self) -> Option<&Measurement> {
        self.threshold.as_ref()
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Ordered findings of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ComplianceReport {
    findings: Vec<ComplianceFinding>,
}

impl ComplianceReport {
    /// Only the engine assembles reports, so declaration order holds.
    pub(crate) fn from_findings(findings: Vec<ComplianceFinding>) -> Self {
        Self { findings }
    }

    pub fn findings(&self) -> &[ComplianceFinding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComplianceFinding> {
        self.findings.iter()
    }

    /// Findings produced by a given check, in report order.
    pub fn by_check(&self, check_id: CheckId) -> impl Iterator<Item = &ComplianceFinding> {
        self.findings
            .iter()
            .filter(move |f| f.check_id() == check_id)
    }

    pub fn summary(&self) -> ReportSummary {
        compute_summary(&self.findings)
    }

    /// Worst severity across the report; an empty report passes.
    pub fn verdict(&self) -> Severity {
        self.findings
            .iter()
            .map(ComplianceFinding::severity)
            .max()
            .unwrap_or(Severity::Pass)
    }
}

impl<'a> IntoIterator for &'a ComplianceReport {
    type Item = &'a ComplianceFinding;
    type IntoIter = std::slice::Iter<'a, ComplianceFinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}
