use product_pricing::{
    LintProblem, Product, RateTable, RawMaterialRate, lint_catalog, lint_product, lint_rates,
};

#[test]
fn clean_products_have_no_findings() {
    let structured = Product::new("Wire", "1 kg")
        .with_material("copper", "1.5 kg")
        .with_wastage("copper", "")
        .with_margin("15");
    assert!(lint_product(&structured).is_empty());

    let legacy = Product::new("Strip", "coil").with_legacy("330", "62");
    assert!(lint_product(&legacy).is_empty());
}

#[test]
fn unparsable_structured_fields_are_reported() {
    let product = Product::new("Wire", "1 kg")
        .with_material("copper", "about one")
        .with_additional_cost("freight", "tbd")
        .with_manufacturing_cost("copper", "x")
        .with_manufacturing_cost("steel", "ignored");
    let issues = lint_product(&product);
    let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
    assert_eq!(
        fields,
        vec![
            "rawMaterials.copper.usage",
            "additonalCosting.freight",
            "manufacturingCost.copper",
        ]
    );
    assert!(issues.iter().all(|i| i.problem == LintProblem::NotANumber));
    assert_eq!(
        issues[0].to_string(),
        "rawMaterials.copper.usage is not a number ('about one')"
    );
}

#[test]
fn margin_at_or_above_hundred_is_reported() {
    let product = Product::new("Wire", "1 kg")
        .with_material("copper", 1.0)
        .with_margin("100");
    let issues = lint_product(&product);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].problem, LintProblem::MarginNotBelowHundred);
}

#[test]
fn legacy_fields_are_checked_strictly() {
    let product = Product::new("Strip", "coil").with_legacy("330 net", "62");
    let issues = lint_product(&product);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, "net_rate");
}

#[test]
fn catalog_findings_carry_positions() {
    let products = vec![
        Product::new("Good", "1 kg").with_material("copper", 1.0),
        Product::new("Bad", "1 kg").with_material("copper", "?"),
    ];
    let findings = lint_catalog(&products);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].position, 2);
    assert_eq!(findings[0].description, "Bad");
}

#[test]
fn rate_entries_must_be_whole_numbers() {
    let rates = RateTable::new(vec![
        RawMaterialRate::new("copper", "760"),
        RawMaterialRate::new("pvc", "110 per kg"),
    ]);
    let issues = lint_rates(&rates);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, "rates.pvc");
}
