//! Documented normalization examples, end to end through the public API.

use fieldnorm_model::{
    CellResult, DateOptions, ErrorKind, FieldKind, FieldOptions, NumberOptions, PhoneOptions,
};
use fieldnorm_standards::registry;
use fieldnorm_transform::{
    FieldNormalizer, normalize_address, normalize_date, normalize_number, normalize_phone,
};

fn date(raw: &str) -> Result<String, ErrorKind> {
    normalize_date(raw, &DateOptions::default()).map_err(|failure| failure.kind)
}

#[test]
fn calendar_validity() {
    for raw in ["2023-02-30", "2023-13-01", "2023-00-10", "29.02.2023"] {
        assert_eq!(date(raw), Err(ErrorKind::DateParseError), "{raw}");
    }
    assert_eq!(date("29.02.2024").as_deref(), Ok("2024-02-29"));
}

#[test]
fn phone_examples() {
    let tables = registry();
    let german = PhoneOptions {
        default_calling_code: Some("49".to_string()),
    };
    assert_eq!(
        normalize_phone("0170 1234567", &german, tables).as_deref(),
        Ok("+491701234567")
    );
    assert_eq!(
        normalize_phone("+1 415 555 0100", &PhoneOptions::default(), tables).as_deref(),
        Ok("+14155550100")
    );
    let failure = normalize_phone("1234", &PhoneOptions::default(), tables).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::PhoneMissingCountryError);
}

#[test]
fn address_examples() {
    let tables = registry();
    assert_eq!(
        normalize_address("123 Main St, Sacramento, CA, USA", tables).as_deref(),
        Ok("US-CA")
    );
    assert_eq!(
        normalize_address("Munich, Bavaria, Germany", tables).as_deref(),
        Ok("DE-BY")
    );
    let failure = normalize_address("Atlantis", tables).unwrap_err();
    assert_eq!(failure.kind, ErrorKind::AddressCountryNotFoundError);
    assert_eq!(failure.original, "Atlantis");
}

#[test]
fn symmetric_number_inputs_agree() {
    let european = NumberOptions {
        decimal_mark: ',',
        grouping_mark: '.',
        group_output: false,
        ..NumberOptions::default()
    };
    let english = NumberOptions {
        decimal_mark: '.',
        grouping_mark: ',',
        group_output: false,
        ..NumberOptions::default()
    };
    // Rendering differs only in the output decimal mark.
    assert_eq!(normalize_number("1.234,56", &european).as_deref(), Ok("1234,56"));
    assert_eq!(normalize_number("1,234.56", &english).as_deref(), Ok("1234.56"));
}

#[test]
fn failures_keep_the_original_text() {
    let normalizer = FieldNormalizer::new(FieldKind::Number, FieldOptions::default(), registry());
    let result = normalizer.normalize(" 12abc34 ");
    assert_eq!(result.error_kind(), Some(ErrorKind::NumberParseError));
    assert_eq!(result.cleaned_text(), " 12abc34 ");
    assert!(matches!(result, CellResult::Failed(_)));
}

#[test]
fn region_codes_for_mixed_addresses() {
    let tables = registry();
    let lines: Vec<String> = [
        "123 Main St, Sacramento, CA, USA",
        "10115 Berlin, Deutschland",
        "Köln, NRW, Germany",
        "Toronto, Ontario, Canada",
        "Charleston, W.Va., USA",
        "Vienna, Austria",
        "Hauptstrasse 9, Austria",
        "Atlantis",
    ]
    .into_iter()
    .map(|raw| match normalize_address(raw, tables) {
        Ok(code) => format!("{raw} => {code}"),
        Err(failure) => format!("{raw} => {}", failure.kind),
    })
    .collect();
    insta::assert_snapshot!(lines.join("\n"), @r"
    123 Main St, Sacramento, CA, USA => US-CA
    10115 Berlin, Deutschland => DE-BE
    Köln, NRW, Germany => DE-NW
    Toronto, Ontario, Canada => CA-ON
    Charleston, W.Va., USA => US-WV
    Vienna, Austria => AT-9
    Hauptstrasse 9, Austria => AddressRegionNotFoundError
    Atlantis => AddressCountryNotFoundError
    ");
}
