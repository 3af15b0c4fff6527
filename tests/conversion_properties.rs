//! Property tests for measurement conversion, money and sequence coercion.

use carrierkit_core::normalize::coerce_to_sequence;
use carrierkit_core::{format_wire, Length, LengthUnit, Measure, Money, Weight, WeightUnit};
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

fn length_unit() -> impl Strategy<Value = LengthUnit> {
    prop_oneof![
        Just(LengthUnit::Millimeter),
        Just(LengthUnit::Centimeter),
        Just(LengthUnit::Meter),
        Just(LengthUnit::Inch),
        Just(LengthUnit::Foot),
    ]
}

fn weight_unit() -> impl Strategy<Value = WeightUnit> {
    prop_oneof![
        Just(WeightUnit::Gram),
        Just(WeightUnit::Kilogram),
        Just(WeightUnit::Ounce),
        Just(WeightUnit::Pound),
    ]
}

proptest! {
    #[test]
    fn inch_round_trip_through_centimetres_is_exact(hundredths in 0_i64..10_000_000) {
        let original = Length::new(Decimal::new(hundredths, 2), LengthUnit::Inch).expect("non-negative");
        let back = original
            .convert(LengthUnit::Centimeter)
            .and_then(|centimetres| centimetres.convert(LengthUnit::Inch))
            .expect("in range");
        prop_assert_eq!(back.value(), original.value());
        prop_assert_eq!(back.to_wire(), original.to_wire());
    }

    #[test]
    fn pound_round_trip_through_kilograms_is_exact(hundredths in 0_i64..10_000_000) {
        let original = Weight::new(Decimal::new(hundredths, 2), WeightUnit::Pound).expect("non-negative");
        let back = original
            .convert(WeightUnit::Kilogram)
            .and_then(|kilograms| kilograms.convert(WeightUnit::Pound))
            .expect("in range");
        prop_assert_eq!(back.value(), original.value());
    }

    #[test]
    fn a_pound_is_sixteen_ounces(hundredths in 0_i64..10_000_000) {
        let pounds = Weight::new(Decimal::new(hundredths, 2), WeightUnit::Pound).expect("non-negative");
        let ounces = pounds.convert(WeightUnit::Ounce).expect("in range");
        prop_assert_eq!(ounces.value(), pounds.value() * Decimal::from(16));
    }

    #[test]
    fn converting_to_the_same_unit_is_identity(
        hundredths in 0_i64..10_000_000,
        length in length_unit(),
        weight in weight_unit(),
    ) {
        let value = Decimal::new(hundredths, 2);
        let l: Measure<LengthUnit> = Length::new(value, length).expect("non-negative");
        let w: Measure<WeightUnit> = Weight::new(value, weight).expect("non-negative");
        prop_assert_eq!(l.convert(length), Ok(l));
        prop_assert_eq!(w.convert(weight), Ok(w));
    }

    #[test]
    fn wire_format_always_has_two_decimals(
        thousandths in 0_i64..1_000_000_000,
        from in length_unit(),
        to in length_unit(),
    ) {
        let measure = Length::new(Decimal::new(thousandths, 3), from).expect("non-negative");
        let wire = measure.convert(to).expect("in range").to_wire();
        let decimals = wire.split_once('.').map(|(_, fraction)| fraction.len());
        prop_assert_eq!(decimals, Some(2));
    }

    #[test]
    fn two_decimal_prices_map_exactly_to_minor_units(units in 0_i64..10_000_000, cents in 0_i64..100) {
        let money = Money::from_decimal_str(&format!("{units}.{cents:02}"), "USD").expect("valid");
        prop_assert_eq!(money.minor_units(), units * 100 + cents);
    }

    #[test]
    fn third_decimal_rounds_half_away_from_zero(
        units in 0_i64..10_000_000,
        cents in 0_i64..100,
        digit in 0_i64..10,
    ) {
        let expected = units * 100 + cents + i64::from(digit >= 5);
        let positive = Money::from_decimal_str(&format!("{units}.{cents:02}{digit}"), "EUR").expect("valid");
        let negative = Money::from_decimal_str(&format!("-{units}.{cents:02}{digit}"), "EUR").expect("valid");
        prop_assert_eq!(positive.minor_units(), expected);
        prop_assert_eq!(negative.minor_units(), -expected);
    }

    #[test]
    fn wire_format_matches_money_rounding(units in 0_i64..1_000_000, thousandths in 0_i64..1000) {
        let value = Decimal::new(units * 1000 + thousandths, 3);
        let money = Money::from_decimal_str(&value.to_string(), "USD").expect("valid");
        let wire_minor_units: i64 = format_wire(value).replace('.', "").parse().expect("digits");
        prop_assert_eq!(money.minor_units(), wire_minor_units);
    }

    #[test]
    fn indexed_objects_read_like_arrays(items in proptest::collection::vec(any::<i32>(), 0..8)) {
        let array = Value::Array(items.iter().map(|item| Value::from(*item)).collect());
        let indexed: Map<String, Value> = items
            .iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), Value::from(*item)))
            .collect();
        let indexed = if items.is_empty() { Value::Null } else { Value::Object(indexed) };

        prop_assert_eq!(coerce_to_sequence(Some(&array)), coerce_to_sequence(Some(&indexed)));
        prop_assert_eq!(coerce_to_sequence(Some(&array)).len(), items.len());
    }
}
