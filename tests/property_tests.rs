/// Property-based tests using proptest
/// Tests invariants that should hold for all reports
use experian_risk_api::models::RiskLevel;
use experian_risk_api::narrative::{build_reasons, NO_DEFAULT_REASONS};
use experian_risk_api::normalizer::normalize;
use proptest::prelude::*;
use serde_json::{json, Value};

fn report(delphi: Value) -> Value {
    json!({
        "s:Envelope": {"s:Body": {"GenerarInformeResponse": {"GenerarInformeResult": {
            "InformeDelphi4A3": delphi
        }}}}
    })
}

fn probability_report(probability: &str) -> Value {
    report(json!({
        "InformacionDelphi": {"ProbabilidadIncumplimientoPorScore": probability}
    }))
}

// Property: risk level is a step function of the probability
#[test]
fn risk_level_thresholds() {
    let cases = [
        ("0", RiskLevel::Low),
        ("4.999", RiskLevel::Low),
        ("5", RiskLevel::Medium),
        ("19.999", RiskLevel::Medium),
        ("20", RiskLevel::High),
        ("100", RiskLevel::High),
    ];
    for (probability, expected) in cases {
        let record = normalize(&probability_report(probability)).unwrap();
        assert_eq!(record.risk_level, expected, "probability {}", probability);
    }
}

proptest! {
    #[test]
    fn risk_level_matches_thresholds(probability in 0.0f64..200.0) {
        let text = format!("{}", probability);
        let record = normalize(&probability_report(&text)).unwrap();
        let expected = if probability < 5.0 {
            RiskLevel::Low
        } else if probability < 20.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        };
        prop_assert_eq!(record.risk_level, expected);
        prop_assert_eq!(record.default_probability, text);
    }

    #[test]
    fn unparseable_probability_is_low(probability in "[a-zA-Z%]{1,10}") {
        let record = normalize(&probability_report(&probability)).unwrap();
        prop_assert_eq!(record.risk_level, RiskLevel::Low);
    }
}

// Property: normalization never panics and only fails on structure
proptest! {
    #[test]
    fn arbitrary_embedded_document_never_fails(raw in "\\PC*") {
        let result = normalize(&report(json!({"badexcugRawData": raw})));
        prop_assert!(result.is_ok());
    }

    #[test]
    fn arbitrary_root_key_is_structure_error(key in "[a-z]{1,12}") {
        let result = normalize(&json!({ key: {} }));
        prop_assert!(result.unwrap_err().is_structure_error());
    }
}

// Property: zero operations always means a clean record
proptest! {
    #[test]
    fn zero_operations_is_clean(
        code in prop::sample::select(vec!["", "2", "3", "4", "X"]),
        amount in "[0-9]{1,6}\\.[0-9]{2}",
        installments in "[0-9]{1,2}"
    ) {
        let record = normalize(&report(json!({
            "ResumenCais": {
                "NumeroOperacionesImpagadas": "0",
                "PeorSituacionPago_Codigo": code,
                "ImporteImpagado": amount,
                "NumeroCuotasImpagadas": installments
            }
        }))).unwrap();

        prop_assert!(!record.has_defaults);
        prop_assert!(!record.is_judicial);
        prop_assert_eq!(record.history_status.as_str(), "No defaults registered");
        prop_assert_eq!(build_reasons(&record), NO_DEFAULT_REASONS.to_vec());
    }

    #[test]
    fn judicial_code_always_judicial(count in "[0-9]{1,3}", probability in "[0-9]{1,2}") {
        let record = normalize(&report(json!({
            "ResumenCais": {"NumeroOperacionesImpagadas": count, "PeorSituacionPago_Codigo": "J"},
            "InformacionDelphi": {"ProbabilidadIncumplimientoPorScore": probability}
        }))).unwrap();

        prop_assert!(record.is_judicial);
        prop_assert_eq!(record.history_status.as_str(), "Judicial");
    }
}

// Property: dates are only rebuilt when every component is present
proptest! {
    #[test]
    fn registration_date_requires_all_components(
        day in prop::option::of("[0-9]{2}"),
        month in prop::option::of("[0-9]{2}"),
        year in prop::option::of("[0-9]{4}")
    ) {
        let mut date = serde_json::Map::new();
        for (key, value) in [("DD", &day), ("MM", &month), ("AAAA", &year)] {
            if let Some(v) = value {
                date.insert(key.to_string(), json!(v));
            }
        }

        let record = normalize(&report(json!({
            "badexcugRawData": {"TBADEXCUG": [{"TBloqueDetalleOperacion": [{"FechaAlta": date}]}]}
        }))).unwrap();

        match (&day, &month, &year) {
            (Some(d), Some(m), Some(y)) => {
                prop_assert_eq!(record.registration_date, Some(format!("{}/{}/{}", d, m, y)));
            }
            _ => prop_assert_eq!(record.registration_date, None),
        }
    }

    #[test]
    fn historical_sentinel_year_never_used(day in "[0-9]{2}", month in "[0-9]{2}") {
        let record = normalize(&report(json!({
            "ResumenCais": {
                "FechaPeorSituacionPagoHistorica": {"DD": day, "MM": month, "AAAA": "0001"}
            }
        }))).unwrap();
        prop_assert_eq!(record.last_default_date, None);
    }
}

// Property: normalization is deterministic
proptest! {
    #[test]
    fn normalize_is_idempotent(
        count in "[0-9]{1,2}",
        amount in "[0-9]{1,5}",
        probability in "[0-9]{1,2}\\.[0-9]"
    ) {
        let document = report(json!({
            "ResumenCais": {"NumeroOperacionesImpagadas": count, "ImporteImpagado": amount},
            "InformacionDelphi": {"ProbabilidadIncumplimientoPorScore": probability},
            "badexcugRawData": "{\"TBADEXCUG\":[{\"TBloqueDetalleOperacion\":[{\"Informante\":\"BANK\"}]}]}"
        }));

        let first = normalize(&document).unwrap();
        let second = normalize(&document).unwrap();
        prop_assert_eq!(first, second);
    }
}
