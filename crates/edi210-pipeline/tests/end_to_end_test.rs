//! End-to-end integration tests for edi210-pipeline

use std::sync::Arc;

use edi210_extract::ExtractionContext;
use edi210_pipeline::{Edi210Pipeline, Error};
use edi210_profile::{Profile, ProfileRegistry, SharedProfiles};

fn profile(currency: &str) -> Profile {
    let json = r#"{
      "segments": {
        "header": {
          "invoice_id": { "seg": "B3", "idx": 2 },
          "invoice_date": { "seg": "B3", "idx": 6 },
          "bol": { "firstOf": [
            { "seg": "B3", "idx": 3 },
            { "seg": "REF", "qual": "BM", "idx": 2 }
          ]},
          "pro": { "seg": "REF", "qual": "CN", "idx": 2 },
          "load_id": { "seg": "REF", "qual": "LO", "idx": 2 }
        },
        "parties": [
          { "mapTo": "parties.ship_from", "seg": "N1", "qual": "SH", "nameIdx": 2 },
          { "mapTo": "parties.ship_to", "seg": "N1", "qual": "CN", "nameIdx": 2 },
          { "mapTo": "parties.bill_to", "seg": "N1", "qual": "BT", "nameIdx": 2 }
        ],
        "dates": [
          { "mapTo": "dates.pickup", "seg": "G62", "qual": "11" },
          { "mapTo": "dates.delivery", "seg": "G62", "qual": "70" }
        ],
        "charges": {
          "strategy": "L1_then_SAC",
          "l1_rules": [
            { "mapTo": "charges.base_freight", "contains": ["400"] }
          ],
          "sac_rules": [
            { "mapTo": "charges.fuel_surcharge", "codeIn": ["FUE"] }
          ]
        },
        "total": { "seg": "L3", "idx": 5 }
      },
      "currency": { "default": "USD" }
    }"#
    .replace("USD", currency);
    serde_json::from_str(&json).unwrap()
}

fn registry(currency: &str) -> ProfileRegistry {
    let mut registry = ProfileRegistry::new();
    registry.insert("global", "default", profile(currency));
    registry
}

const DOC: &str = "\
ISA*00*          *00*          *ZZ*CARRIER01*ZZ*OURBROKER*250101*1200*U*00401*000000001*0*P*>~
GS*IN*CARRIER01*OURBROKER*20250101*1200*1*X*004010~
ST*210*0001~
B3**INV001*BOL001*PP**20250102*45510****SCAC~
N1*SH*ACME SHIPPING~
N1*CN*WIDGET CO~
N1*BT*OUR BROKERAGE~
G62*11*20250103~
G62*70*20250105~
REF*CN*PRO777~
REF*LO*LOAD42~
L1*1*400.00***400*****FREIGHT CHARGE~
SAC*C*FUE***55.10~
L3*500**400**455.10~
SE*14*0001~
GE*1*1~
IEA*1*000000001~";

#[test]
fn test_full_pipeline_produces_clean_valid_record() {
    let pipeline = Edi210Pipeline::new(
        Arc::new(registry("USD")),
        ExtractionContext::default(),
    );
    let report = pipeline.parse(DOC).unwrap();

    assert_eq!(report.results.len(), 1);
    assert!(report.all_valid());
    assert!(report.warnings().is_empty());

    let record = &report.results[0];
    assert_eq!(record.invoice.invoice_id, "INV001");
    assert_eq!(record.invoice.currency, "USD");
    assert_eq!(record.invoice.metadata.confidence, Some(1.0));

    // normalized output matches the assembled record
    let validated = record.validation.validated.as_ref().unwrap();
    assert_eq!(validated["invoice_id"], "INV001");
    assert_eq!(validated["side"], "buy");
    assert_eq!(validated["metadata"]["golden_schema_version"], "0.1");
}

#[test]
fn test_soft_failures_surface_as_warnings_not_errors() {
    let doc = DOC
        .replace("REF*CN*PRO777~\n", "")
        .replace("SAC*C*FUE***55.10~\n", "")
        .replace("L3*500**400**455.10~", "L3*500**400**400.00~");
    let pipeline = Edi210Pipeline::new(
        Arc::new(registry("USD")),
        ExtractionContext::default(),
    );
    let report = pipeline.parse(&doc).unwrap();

    let record = &report.results[0];
    assert!(record.invoice.refs.pro.is_none());
    assert_eq!(
        record.warnings,
        ["REF not found.", "SAC segment not found."]
    );
    let confidence = record.invoice.metadata.confidence.unwrap();
    assert!((confidence - 0.85).abs() < 1e-9);
    assert!(report.all_valid());
}

#[test]
fn test_snapshot_reload_applies_to_new_pipelines_only() {
    let shared = SharedProfiles::new(registry("USD"));

    let before = Edi210Pipeline::new(shared.snapshot(), ExtractionContext::default());
    shared.replace(registry("CAD"));
    let after = Edi210Pipeline::new(shared.snapshot(), ExtractionContext::default());

    // the pipeline built before the reload keeps its snapshot
    assert_eq!(before.parse(DOC).unwrap().results[0].invoice.currency, "USD");
    assert_eq!(after.parse(DOC).unwrap().results[0].invoice.currency, "CAD");
}

#[test]
fn test_abort_failure_yields_no_invoice_payload() {
    let doc = DOC.replace("B3**INV001", "B3**");
    let pipeline = Edi210Pipeline::new(
        Arc::new(registry("USD")),
        ExtractionContext::default(),
    );
    let err = pipeline.parse(&doc).unwrap_err();
    assert!(matches!(
        err,
        Error::Extract(edi210_extract::Error::RequiredFieldMissing { .. })
    ));
}

#[test]
fn test_confidence_below_zero_fails_schema_validation() {
    // eleven distinct uncategorized codes push the score to -0.1, which
    // the validator's [0, 1] range check then rejects
    let extra: String = (1..=11)
        .map(|i| format!("L1*{}*10.00***AA{i}*****CHARGE {i}~\n", i + 1))
        .collect();
    let doc = DOC.replace(
        "SAC*C*FUE***55.10~\n",
        &format!("SAC*C*FUE***55.10~\n{extra}"),
    );
    let doc = doc.replace("L3*500**400**455.10~", "L3*500**400**565.10~");
    let pipeline = Edi210Pipeline::new(
        Arc::new(registry("USD")),
        ExtractionContext::default(),
    );
    let report = pipeline.parse(&doc).unwrap();

    let record = &report.results[0];
    let confidence = record.invoice.metadata.confidence.unwrap();
    assert!(confidence < 0.0);
    assert!(!record.validation.is_valid);
    assert!(
        record
            .validation
            .errors
            .iter()
            .any(|e| e.field_path == "metadata.confidence")
    );
}
