use rowforge_core::{DataValue, Field};
use rowforge_generate::generation::databags::{DataBag, DataBagIterator, DataBagValue};
use rowforge_generate::generation::{
    CombinationStrategy, ExhaustiveCombinationStrategy, MinimalCombinationStrategy,
};

fn stream(field: &str, values: &[i64]) -> DataBagIterator {
    let field = Field::new(field);
    let bags: Vec<DataBag> = values
        .iter()
        .map(|value| {
            DataBag::empty().with_value(
                field.clone(),
                DataBagValue::from_value(DataValue::from(*value)),
            )
        })
        .collect();
    Box::new(bags.into_iter())
}

fn numbers(rows: &[DataBag], field: &str) -> Vec<DataValue> {
    rows.iter()
        .filter_map(|row| row.value_of(&Field::new(field)).cloned())
        .collect()
}

#[test]
fn minimal_zips_streams_and_carries_exhausted_values() {
    let strategy = MinimalCombinationStrategy::new();
    let rows: Vec<DataBag> = strategy
        .permute(vec![stream("a", &[1, 2]), stream("b", &[10, 20, 30])])
        .collect();

    assert_eq!(rows.len(), 3);
    assert_eq!(
        numbers(&rows, "a"),
        [DataValue::from(1), DataValue::from(2), DataValue::from(2)]
    );
    assert_eq!(
        numbers(&rows, "b"),
        [
            DataValue::from(10),
            DataValue::from(20),
            DataValue::from(30)
        ]
    );
}

#[test]
fn minimal_with_an_empty_stream_produces_nothing() {
    let strategy = MinimalCombinationStrategy::new();
    let rows: Vec<DataBag> = strategy
        .permute(vec![stream("a", &[1, 2]), stream("b", &[])])
        .collect();
    assert!(rows.is_empty());
}

#[test]
fn exhaustive_crosses_every_stream() {
    let strategy = ExhaustiveCombinationStrategy::new();
    let rows: Vec<DataBag> = strategy
        .permute(vec![stream("a", &[1, 2]), stream("b", &[10, 20, 30])])
        .collect();

    assert_eq!(rows.len(), 6);
    // The rightmost stream varies fastest.
    assert_eq!(
        numbers(&rows, "b")[..3],
        [
            DataValue::from(10),
            DataValue::from(20),
            DataValue::from(30)
        ]
    );
    assert_eq!(
        numbers(&rows, "a"),
        [
            DataValue::from(1),
            DataValue::from(1),
            DataValue::from(1),
            DataValue::from(2),
            DataValue::from(2),
            DataValue::from(2)
        ]
    );
}

#[test]
fn exhaustive_streams_lazily_under_a_row_cap() {
    let strategy = ExhaustiveCombinationStrategy::new();
    let endless = Box::new((0i64..).map(|value| {
        DataBag::empty().with_value(
            Field::new("n"),
            DataBagValue::from_value(DataValue::from(value)),
        )
    }));
    let rows: Vec<DataBag> = strategy.permute(vec![endless]).take(4).collect();
    assert_eq!(
        numbers(&rows, "n"),
        [
            DataValue::from(0),
            DataValue::from(1),
            DataValue::from(2),
            DataValue::from(3)
        ]
    );
}
