/// Normalization of Experian "Informe Delphi" reports into flat risk records
///
/// The raw report is an XML envelope converted to JSON, so every value is loosely
/// typed and any field may be missing. Only the navigation path down to the primary
/// block is mandatory; everything below it degrades to defaults:
/// 1. Locate the primary block (`InformeDelphi4A3`)
/// 2. Decode the embedded secondary document (`badexcugRawData`), if any
/// 3. Resolve each record field through its fallback chain
use crate::errors::AppError;
use crate::models::{Diagnostic, Normalized, PaymentStatus, RiskLevel, RiskRecord};
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Keys leading from the document root to the primary data block.
pub const PRIMARY_PATH: [&str; 5] = [
    "s:Envelope",
    "s:Body",
    "GenerarInformeResponse",
    "GenerarInformeResult",
    "InformeDelphi4A3",
];

/// Year the bureau uses when the historical worst-situation date is unknown.
pub const UNKNOWN_YEAR: &str = "0001";

/// Worst-situation code for operations under legal action.
pub const JUDICIAL_CODE: &str = "J";

/// Normalize a raw report into a [`RiskRecord`].
///
/// Fails only with [`AppError::StructureError`] when the primary block cannot be
/// reached. Diagnostics are logged and dropped; use [`normalize_with_diagnostics`]
/// to inspect them.
pub fn normalize(document: &Value) -> Result<RiskRecord, AppError> {
    normalize_with_diagnostics(document).map(|normalized| normalized.record)
}

/// Normalize a raw report, returning the record with any non-fatal diagnostics.
pub fn normalize_with_diagnostics(document: &Value) -> Result<Normalized, AppError> {
    let data = primary_block(document)?;
    let mut diagnostics = Vec::new();

    let summary = data.get("ResumenCais");
    let scoring = data.get("InformacionDelphi");
    let address = data.get("DIRECCION");

    let secondary = decode_secondary(data.get("badexcugRawData"), &mut diagnostics);
    let detail = secondary.as_deref().and_then(first_detail);

    let summary_field = |key: &str| text(summary.and_then(|s| s.get(key)));
    let detail_field = |key: &str| text(detail.and_then(|d| d.get(key)));

    let default_probability = first_present_or(
        [text(scoring.and_then(|s| s.get("ProbabilidadIncumplimientoPorScore")))],
        "0",
    );

    let unpaid_operations = summary_field("NumeroOperacionesImpagadas");
    let has_defaults = unpaid_operations
        .as_deref()
        .and_then(parse_leading_int)
        .unwrap_or(0)
        > 0;

    let worst_code = summary_field("PeorSituacionPago_Codigo").unwrap_or_default();
    let (status_label, is_judicial) = history_status(&worst_code, has_defaults);

    let current_debt = first_present_or(
        [
            summary_field("ImporteImpagado").filter(|amount| amount != "0"),
            detail_field("SaldoImpagado"),
        ],
        "0",
    );

    let unpaid_installments = first_present_or([summary_field("NumeroCuotasImpagadas")], "0");

    let last_default_date = first_present([
        format_date(detail.and_then(|d| d.get("FechaUltimoVencimientoImpagado"))),
        format_date_unless_year(
            summary.and_then(|s| s.get("FechaPeorSituacionPagoHistorica")),
            UNKNOWN_YEAR,
        ),
    ]);

    let max_debt_amount = first_present_or(
        [
            summary_field("MaximoImporteImpagado"),
            detail_field("MaximoImporteImpagado"),
        ],
        "",
    );

    let risk_level =
        RiskLevel::from_probability(parse_leading_float(&default_probability).unwrap_or(0.0));

    tracing::debug!(
        "Resolved report summary: has_defaults={}, worst_code={:?}, risk_level={}, detail_present={}",
        has_defaults,
        worst_code,
        risk_level,
        detail.is_some()
    );

    let record = RiskRecord {
        default_probability,
        risk_level,
        has_defaults,
        history_status: status_label.to_string(),
        is_judicial,
        current_debt,
        unpaid_installments,
        max_debt_amount,
        last_default_date,
        first_default_date: format_date(
            detail.and_then(|d| d.get("FechaPrimerVencimientoImpagado")),
        ),
        registration_date: format_date(detail.and_then(|d| d.get("FechaAlta"))),
        last_update_date: format_date(detail.and_then(|d| d.get("FechaUltimaActualizacion"))),
        creditor: detail_field("Informante").unwrap_or_default(),
        product: text(
            detail
                .and_then(|d| d.get("TipoProductoFinanciado"))
                .and_then(|p| p.get("Descripcion")),
        )
        .unwrap_or_default(),
        payment_history: detail.map(payment_history).unwrap_or_default(),
        postal_code: text(address.and_then(|a| a.get("CodigoPostal"))).unwrap_or_default(),
    };

    Ok(Normalized {
        record,
        diagnostics,
    })
}

/// Walk [`PRIMARY_PATH`] down to the primary block.
fn primary_block(document: &Value) -> Result<&Value, AppError> {
    let mut current = document;
    for key in PRIMARY_PATH {
        current = current.get(key).ok_or_else(|| {
            AppError::StructureError(format!("missing '{}' in report", key))
        })?;
    }

    if current.is_object() {
        Ok(current)
    } else {
        Err(AppError::StructureError(format!(
            "'{}' is not an object",
            PRIMARY_PATH[PRIMARY_PATH.len() - 1]
        )))
    }
}

/// Decode the embedded secondary document, or `None` if it is absent or unreadable.
///
/// The bureau ships it as a JSON string inside the JSON report; some producers hand
/// it over already decoded. A decode failure is recorded as a diagnostic.
pub fn decode_secondary<'a>(
    raw: Option<&'a Value>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Cow<'a, Value>> {
    match raw? {
        Value::String(encoded) if encoded.is_empty() => None,
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(decoded) => Some(Cow::Owned(decoded)),
            Err(e) => {
                let diagnostic = Diagnostic::SecondaryDocumentUnreadable {
                    reason: e.to_string(),
                };
                tracing::warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
                None
            }
        },
        structured @ (Value::Object(_) | Value::Array(_)) => Some(Cow::Borrowed(structured)),
        _ => None,
    }
}

/// First detail-of-operation record of a decoded secondary document.
pub fn first_detail(secondary: &Value) -> Option<&Value> {
    secondary
        .get("TBADEXCUG")?
        .get(0)?
        .get("TBloqueDetalleOperacion")?
        .get(0)
        .filter(|detail| detail.is_object())
}

/// Label for the worst payment situation, and whether it is judicial.
///
/// The judicial marker wins over everything else, including a zero operations count.
pub fn history_status(code: &str, has_defaults: bool) -> (&'static str, bool) {
    if code == JUDICIAL_CODE {
        return ("Judicial", true);
    }
    if !has_defaults {
        return ("No defaults registered", false);
    }

    let label = match code {
        "4" => "120+ days",
        "3" => "90–120 days",
        "2" => "60–90 days",
        _ => "Active default",
    };
    (label, false)
}

fn payment_history(detail: &Value) -> Vec<PaymentStatus> {
    detail
        .get("SituacionPago")
        .and_then(|s| s.get("TTipoCodigo"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| PaymentStatus {
                    code: text(entry.get("Codigo")).unwrap_or_default(),
                    description: text(entry.get("Descripcion")).unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default()
}

// ============ Field helpers ============

/// Read a scalar report field as text.
///
/// Non-empty strings are returned as is and non-zero numbers in their JSON form.
/// Anything else (missing, empty, zero, null, bool, object, array) is absent.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// First candidate that is present.
pub fn first_present<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates.into_iter().flatten().next()
}

/// First candidate that is present, else `default`.
pub fn first_present_or<I>(candidates: I, default: &str) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    first_present(candidates).unwrap_or_else(|| default.to_string())
}

/// Rebuild a `DD/MM/AAAA` date from its day/month/year fields.
///
/// All three components must be present.
pub fn format_date(value: Option<&Value>) -> Option<String> {
    let date = value?;
    let day = text(date.get("DD"))?;
    let month = text(date.get("MM"))?;
    let year = text(date.get("AAAA"))?;
    Some(format!("{}/{}/{}", day, month, year))
}

/// Like [`format_date`], but treats the given sentinel year as "no date".
pub fn format_date_unless_year(value: Option<&Value>, sentinel_year: &str) -> Option<String> {
    let year = text(value?.get("AAAA"))?;
    if year == sentinel_year {
        return None;
    }
    format_date(value)
}

// ============ Numeric helpers ============

fn leading_int_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*([+-]?\d+)").expect("valid integer prefix pattern"))
}

fn leading_float_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
            .expect("valid float prefix pattern")
    })
}

/// Integer at the start of `raw` ("12 ops" -> 12, "3.9" -> 3). Saturates on overflow.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let digits = leading_int_regex().captures(raw)?.get(1)?.as_str();
    Some(digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    }))
}

/// Decimal number at the start of `raw` ("12.5%" -> 12.5, "abc" -> None).
pub fn parse_leading_float(raw: &str) -> Option<f64> {
    let number = leading_float_regex().captures(raw)?.get(1)?.as_str();
    number.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_reads_strings_and_numbers() {
        assert_eq!(text(Some(&json!("abc"))), Some("abc".to_string()));
        assert_eq!(text(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(text(Some(&json!(""))), None);
        assert_eq!(text(Some(&json!(0))), None);
        assert_eq!(text(Some(&json!(null))), None);
        assert_eq!(text(Some(&json!({"a": 1}))), None);
        assert_eq!(text(None), None);
    }

    #[test]
    fn test_first_present_prefers_order() {
        assert_eq!(
            first_present([None, Some("b".to_string()), Some("c".to_string())]),
            Some("b".to_string())
        );
        assert_eq!(first_present_or([None, None], "0"), "0");
    }

    #[test]
    fn test_format_date_requires_all_components() {
        assert_eq!(
            format_date(Some(&json!({"DD": "30", "MM": "11", "AAAA": "2024"}))),
            Some("30/11/2024".to_string())
        );
        assert_eq!(format_date(Some(&json!({"DD": "30", "MM": "11"}))), None);
        assert_eq!(
            format_date(Some(&json!({"DD": "", "MM": "11", "AAAA": "2024"}))),
            None
        );
        assert_eq!(format_date(Some(&json!("30/11/2024"))), None);
    }

    #[test]
    fn test_format_date_unless_year_rejects_sentinel() {
        let unknown = json!({"DD": "01", "MM": "01", "AAAA": "0001"});
        assert_eq!(format_date_unless_year(Some(&unknown), UNKNOWN_YEAR), None);

        let known = json!({"DD": "11", "MM": "05", "AAAA": "2025"});
        assert_eq!(
            format_date_unless_year(Some(&known), UNKNOWN_YEAR),
            Some("11/05/2025".to_string())
        );
    }

    #[test]
    fn test_leading_number_parsing() {
        assert_eq!(parse_leading_int("2"), Some(2));
        assert_eq!(parse_leading_int(" 3.9"), Some(3));
        assert_eq!(parse_leading_int("-1"), Some(-1));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("99999999999999999999"), Some(i64::MAX));

        assert_eq!(parse_leading_float("12.5"), Some(12.5));
        assert_eq!(parse_leading_float("12,5"), Some(12.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("NaN"), None);
        assert_eq!(parse_leading_float(""), None);
    }

    #[test]
    fn test_history_status_mapping() {
        assert_eq!(history_status("J", true), ("Judicial", true));
        assert_eq!(history_status("J", false), ("Judicial", true));
        assert_eq!(history_status("4", true), ("120+ days", false));
        assert_eq!(history_status("3", true), ("90–120 days", false));
        assert_eq!(history_status("2", true), ("60–90 days", false));
        assert_eq!(history_status("1", true), ("Active default", false));
        assert_eq!(history_status("", true), ("Active default", false));
        assert_eq!(history_status("4", false), ("No defaults registered", false));
    }

    #[test]
    fn test_decode_secondary_variants() {
        let mut diagnostics = Vec::new();

        let encoded = json!(r#"{"TBADEXCUG": []}"#);
        let decoded = decode_secondary(Some(&encoded), &mut diagnostics);
        assert_eq!(decoded.as_deref(), Some(&json!({"TBADEXCUG": []})));

        let structured = json!({"TBADEXCUG": []});
        let borrowed = decode_secondary(Some(&structured), &mut diagnostics);
        assert!(matches!(borrowed, Some(Cow::Borrowed(_))));

        assert!(decode_secondary(Some(&json!("")), &mut diagnostics).is_none());
        assert!(decode_secondary(Some(&json!(12)), &mut diagnostics).is_none());
        assert!(decode_secondary(None, &mut diagnostics).is_none());
        assert!(diagnostics.is_empty());

        assert!(decode_secondary(Some(&json!("{not json")), &mut diagnostics).is_none());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_first_detail_takes_first_entry_only() {
        let secondary = json!({
            "TBADEXCUG": [
                {"TBloqueDetalleOperacion": [{"Informante": "A"}, {"Informante": "B"}]},
                {"TBloqueDetalleOperacion": [{"Informante": "C"}]}
            ]
        });
        assert_eq!(
            first_detail(&secondary).and_then(|d| d.get("Informante")),
            Some(&json!("A"))
        );
        assert!(first_detail(&json!({"TBADEXCUG": []})).is_none());
        assert!(first_detail(&json!({"TBADEXCUG": [{"TBloqueDetalleOperacion": []}]})).is_none());
    }
}
