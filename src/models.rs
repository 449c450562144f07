use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Risk Record ============

/// Qualitative risk bucket derived from the default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Buckets a probability expressed as a percentage (not a fraction).
    pub fn from_probability(probability: f64) -> Self {
        if probability >= 20.0 {
            RiskLevel::High
        } else if probability >= 5.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// One entry of the payment-situation evolution of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    /// Situation code (e.g. "2", "3", "J").
    pub code: String,
    /// Human-readable description supplied by the bureau.
    pub description: String,
}

/// Flat risk-assessment record normalized from a bureau report.
///
/// Produced once per report and never mutated afterwards. Free-text fields that the
/// report does not carry are empty strings; dates that cannot be fully reconstructed
/// are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRecord {
    /// Default probability as sent by the bureau, in percent.
    pub default_probability: String,
    /// Bucket derived from `default_probability`.
    pub risk_level: RiskLevel,
    /// Whether the subject has at least one unpaid operation.
    pub has_defaults: bool,
    /// Label derived from the worst payment situation code.
    pub history_status: String,
    /// Whether the worst payment situation is the judicial marker.
    pub is_judicial: bool,
    /// Outstanding unpaid amount.
    pub current_debt: String,
    /// Number of unpaid installments.
    pub unpaid_installments: String,
    /// Maximum historical unpaid amount.
    pub max_debt_amount: String,
    /// Most recent default, `DD/MM/AAAA`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_default_date: Option<String>,
    /// First unpaid installment, `DD/MM/AAAA`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_default_date: Option<String>,
    /// Date the operation was registered with the bureau, `DD/MM/AAAA`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<String>,
    /// Date of the last update of the operation, `DD/MM/AAAA`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_date: Option<String>,
    /// Issuing institution.
    pub creditor: String,
    /// Financed product description.
    pub product: String,
    /// Payment situation evolution, in report order.
    pub payment_history: Vec<PaymentStatus>,
    pub postal_code: String,
}

// ============ Diagnostics ============

/// Non-fatal problem found while normalizing a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The embedded secondary document was present but could not be decoded.
    SecondaryDocumentUnreadable { reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SecondaryDocumentUnreadable { reason } => {
                write!(f, "Could not parse badexcugRawData: {}", reason)
            }
        }
    }
}

/// Output of a normalization run: the record plus any non-fatal diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub record: RiskRecord,
    pub diagnostics: Vec<Diagnostic>,
}

// ============ API Response Models ============

/// Risk record enriched with the derived text the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// The normalized record.
    pub record: RiskRecord,
    /// "Why This Profile is Risky" / "Why This Profile is Safe".
    pub headline: String,
    /// Qualitative sentence matching `record.risk_level`.
    pub context: String,
    /// Human-readable reasons behind the assessment.
    pub reasons: Vec<String>,
    /// Probability formatted with two decimals and a percent sign.
    pub probability_display: String,
    /// Current debt formatted as currency.
    pub current_debt_display: String,
}
