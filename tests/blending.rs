use gue_gas_rs::{GasError, GasMix, oxygen_to_add, trimix_fill_plan};

fn approx_eq(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-6, "{a} != {b}");
}

#[test]
fn trimix_16_40_fill_to_3000_psi() {
    let mix = GasMix::new(0.16, 0.40).unwrap();
    let plan = trimix_fill_plan(&mix, 3000.0).unwrap();
    assert_eq!(plan.mix, "Trimix 16/40");
    approx_eq(plan.helium_to_add, 1200.0);
    approx_eq(plan.oxygen_partial_pressure, 480.0);
    approx_eq(plan.nitrox_pressure, 1800.0);
    approx_eq(plan.nitrox_fo2, 480.0 / 1800.0);
    approx_eq(plan.oxygen_to_add, (480.0 / 1800.0 - 0.21) / 0.79 * 1800.0);
    approx_eq(
        plan.helium_to_add + plan.oxygen_to_add + plan.air_to_add,
        3000.0,
    );
}

#[test]
fn air_needs_no_oxygen() {
    let plan = trimix_fill_plan(&GasMix::air(), 200.0).unwrap();
    assert_eq!(plan.mix, "Air");
    approx_eq(plan.oxygen_to_add, 0.0);
    approx_eq(plan.air_to_add, 200.0);
}

#[test]
fn hypoxic_nitrox_portion_cannot_be_topped_with_air() {
    let mix = GasMix::new(0.15, 0.10).unwrap();
    assert!(matches!(
        trimix_fill_plan(&mix, 3000.0),
        Err(GasError::UnblendableMix { .. })
    ));
}

#[test]
fn oxygen_to_add_for_ean32() {
    approx_eq(oxygen_to_add(0.32, 3000.0).unwrap(), 0.11 / 0.79 * 3000.0);
    assert!(oxygen_to_add(0.18, 3000.0).is_err());
}

#[test]
fn mixes_are_validated() {
    assert!(matches!(
        GasMix::new(0.5, 0.6),
        Err(GasError::MixExceedsWhole(_))
    ));
    assert!(matches!(
        GasMix::from_percent(60.0, 50.0),
        Err(GasError::MixExceedsWhole(_))
    ));
    assert!(GasMix::new(0.0, 0.2).is_err());
    assert!(GasMix::new(0.21, 1.0).is_err());

    let tx = GasMix::from_percent(21.0, 35.0).unwrap();
    assert_eq!(tx.label(), "Trimix 21/35");
    approx_eq(tx.n2(), 0.44);
    assert_eq!(GasMix::nitrox(0.32).unwrap().label(), "EAN32");
}

#[test]
fn heliox_fills_with_oxygen_and_no_air() {
    for (o2, he, pressure) in [(0.07, 0.93, 3000.0), (0.01, 0.99, 232.0), (0.10, 0.90, 200.0)] {
        let mix = GasMix::new(o2, he).unwrap();
        let plan = trimix_fill_plan(&mix, pressure).unwrap();
        assert!(plan.nitrox_fo2 <= 1.0);
        approx_eq(plan.helium_to_add, he * pressure);
        approx_eq(plan.oxygen_to_add, o2 * pressure);
        approx_eq(plan.air_to_add, 0.0);
    }
}

#[test]
fn fill_pressure_must_be_positive() {
    let mix = GasMix::new(0.18, 0.45).unwrap();
    for pressure in [0.0, -200.0] {
        assert!(matches!(
            trimix_fill_plan(&mix, pressure),
            Err(GasError::NonPositiveRate { name: "Fill pressure", .. })
        ));
    }
    assert!(matches!(
        trimix_fill_plan(&mix, f64::NAN),
        Err(GasError::NonFinite { .. })
    ));
}

#[test]
fn oxygen_to_add_rejects_negative_pressure() {
    let err = oxygen_to_add(0.32, -10.0).unwrap_err();
    assert!(matches!(err, GasError::NegativeValue { name: "Fill pressure", .. }));
    assert_eq!(err.to_string(), "Fill pressure must not be negative (got -10)");
    assert_eq!(oxygen_to_add(0.32, 0.0).unwrap(), 0.0);
}

#[test]
fn helium_share_is_checked_before_oxygen() {
    let tx = GasMix::with_helium(0.40).unwrap();
    approx_eq(tx.he(), 0.40);
    approx_eq(tx.o2(), 0.21);
    approx_eq(GasMix::with_helium(0.95).unwrap().o2(), 0.05);

    for he in [1.0, 1.5, -0.1, f64::NAN] {
        assert!(matches!(
            GasMix::with_helium(he),
            Err(GasError::InvalidFraction { name: "He fraction", .. })
        ));
    }
}
