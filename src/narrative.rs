/// Human-readable narrative derived from a normalized risk record
///
/// Everything here is a pure function of the [`RiskRecord`]; it is the text the
/// presentation layer renders next to the score.
use crate::models::{RiskAssessment, RiskLevel, RiskRecord};
use crate::normalizer::{parse_leading_float, parse_leading_int};
use chrono::NaiveDate;

/// Reasons shown for a profile without any registered default.
pub const NO_DEFAULT_REASONS: [&str; 2] = [
    "No registered default operations in credit history",
    "Clean payment track record",
];

/// Length of a "month" when reporting how long a debt has been unpaid.
const DAYS_PER_MONTH: i64 = 30;

/// Qualitative sentence for a risk level.
pub fn risk_context(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "This indicates a very low likelihood of payment issues.",
        RiskLevel::Medium => "This indicates a moderate risk that requires careful consideration.",
        RiskLevel::High => "This indicates a significant risk of payment default.",
    }
}

/// Title of the reasons panel.
pub fn headline(record: &RiskRecord) -> &'static str {
    if record.has_defaults {
        "Why This Profile is Risky"
    } else {
        "Why This Profile is Safe"
    }
}

/// Build the list of reasons behind the assessment.
pub fn build_reasons(record: &RiskRecord) -> Vec<String> {
    if !record.has_defaults {
        return NO_DEFAULT_REASONS.iter().map(|r| r.to_string()).collect();
    }

    let mut reasons = Vec::new();

    if parse_leading_int(&record.unpaid_installments).unwrap_or(0) > 0 {
        reasons.push(format!(
            "Has {} unpaid installments",
            record.unpaid_installments
        ));
    }

    if parse_leading_float(&record.current_debt).unwrap_or(0.0) > 0.0 {
        reasons.push(format!(
            "Outstanding debt of {}",
            format_currency(&record.current_debt)
        ));
    }

    if record.is_judicial {
        reasons.push("The operation is in judicial status".to_string());
    }

    if let Some(date) = &record.last_default_date {
        reasons.push(format!("Most recent default: {}", date));
    }

    if let Some(date) = &record.first_default_date {
        reasons.push(format!("First default occurred on {}", date));
    }

    if let (Some(first), Some(last)) = (&record.first_default_date, &record.last_update_date) {
        if let Some(months) = elapsed_months(first, last).filter(|m| *m > 0) {
            reasons.push(format!("Debt has been unpaid for ~{} months", months));
        }
    }

    if !record.product.is_empty() && !record.creditor.is_empty() {
        reasons.push(format!(
            "The debt comes from a {} issued by a {}",
            record.product.to_lowercase(),
            record.creditor.to_lowercase()
        ));
    }

    if record.is_judicial && record.payment_history.len() > 1 {
        reasons.push(
            "The payment status escalated from late payments to a judicial process".to_string(),
        );
    }

    reasons
}

/// Parse a `DD/MM/AAAA` date.
pub fn parse_display_date(date: &str) -> Option<NaiveDate> {
    let mut parts = date.split('/').map(|p| p.trim().parse::<u32>().ok());
    let day = parts.next()??;
    let month = parts.next()??;
    let year = parts.next()??;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// Whole 30-day periods between two `DD/MM/AAAA` dates (negative if `to` is earlier).
///
/// This is an approximation, not calendar months.
pub fn elapsed_months(from: &str, to: &str) -> Option<i64> {
    let from = parse_display_date(from)?;
    let to = parse_display_date(to)?;
    Some((to - from).num_days().div_euclid(DAYS_PER_MONTH))
}

/// Format an amount as euros with thousands separators and two decimals (`€8,629.62`).
///
/// Unparseable or non-finite input is rendered as `€0.00`.
pub fn format_currency(amount: &str) -> String {
    let value = finite_or_zero(amount);
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}€{}.{}", sign, grouped, cents)
}

/// Format a probability percentage with two decimals (`"12.5"` -> `"12.50%"`).
pub fn format_probability(probability: &str) -> String {
    format!("{:.2}%", finite_or_zero(probability))
}

fn finite_or_zero(raw: &str) -> f64 {
    parse_leading_float(raw)
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

impl RiskAssessment {
    /// Derive the full assessment shown to the user from a normalized record.
    pub fn from_record(record: RiskRecord) -> Self {
        Self {
            headline: headline(&record).to_string(),
            context: risk_context(record.risk_level).to_string(),
            reasons: build_reasons(&record),
            probability_display: format_probability(&record.default_probability),
            current_debt_display: format_currency(&record.current_debt),
            record,
        }
    }
}
