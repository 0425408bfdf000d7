use std::env;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use rowforge_core::{
    AtomicConstraint, ConstraintKind, DataType, DataValue, DateTimeGranularity, Field,
    ProfileFields, StandardType,
};
use rowforge_generate::generation::{GenerationType, VelocityMonitor};
use rowforge_generate::{
    ConstraintNode, DecisionNode, DecisionTree, DecisionTreeDataGenerator, GenerationConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut rows: Option<u64> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(PathBuf::from),
            "--rows" => rows = args.next().and_then(|n| n.parse().ok()),
            _ => return Err("unexpected argument".into()),
        }
    }

    let mut config = match config_path {
        Some(path) => {
            let config_json = std::fs::read_to_string(&path)?;
            GenerationConfig::from_value(serde_json::from_str(&config_json)?)?
        }
        None => GenerationConfig {
            generation_type: GenerationType::Random,
            ..GenerationConfig::default()
        },
    };
    if let Some(rows) = rows {
        config.max_rows = Some(rows);
    }

    let tree = trades_tree();
    let monitor = Rc::new(VelocityMonitor::new());
    let generator =
        DecisionTreeDataGenerator::from_config(&config).with_monitor(monitor.clone());

    for bag in generator.generate_data(&tree)? {
        let cells: Vec<String> = tree
            .fields()
            .iter()
            .map(|field| {
                bag.cell(field)
                    .map(|cell| cell.formatted())
                    .unwrap_or_else(|| "null".to_string())
            })
            .collect();
        println!("{}", cells.join(", "));
    }

    println!("rows={}", monitor.rows_emitted());
    Ok(())
}

/// A small trades profile: every field constrained at the root, plus one
/// decision tying the venue to the product type.
fn trades_tree() -> DecisionTree {
    let fields = ProfileFields::from_names(["product", "venue", "price", "isin", "traded_at"]);
    let product = Field::new("product");
    let venue = Field::new("venue");
    let price = Field::new("price");
    let isin = Field::new("isin");
    let traded_at = Field::new("traded_at");

    let window_start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let window_end = NaiveDate::from_ymd_opt(2024, 12, 31)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    let root = ConstraintNode::from_constraints(vec![
        not_null(&product),
        not_null(&venue),
        not_null(&price),
        not_null(&isin),
        not_null(&traded_at),
        AtomicConstraint::new(price.clone(), ConstraintKind::OfType(DataType::Numeric)),
        AtomicConstraint::new(
            price.clone(),
            ConstraintKind::GreaterThan {
                limit: Decimal::ZERO,
                inclusive: false,
            },
        ),
        AtomicConstraint::new(
            price.clone(),
            ConstraintKind::LessThan {
                limit: Decimal::from(10_000),
                inclusive: true,
            },
        ),
        AtomicConstraint::new(price.clone(), ConstraintKind::GranularToNumeric(2)),
        AtomicConstraint::new(price, ConstraintKind::HasFormat("GBP {}".to_string())),
        AtomicConstraint::new(
            isin.clone(),
            ConstraintKind::MatchesStandard(StandardType::Isin),
        ),
        AtomicConstraint::new(isin, ConstraintKind::OfType(DataType::String)),
        AtomicConstraint::new(
            traded_at.clone(),
            ConstraintKind::After {
                limit: window_start,
                inclusive: true,
            },
        ),
        AtomicConstraint::new(
            traded_at.clone(),
            ConstraintKind::Before {
                limit: window_end,
                inclusive: false,
            },
        ),
        AtomicConstraint::new(
            traded_at,
            ConstraintKind::GranularToDate(DateTimeGranularity::Days),
        ),
    ])
    .adding_decisions([DecisionNode::new(vec![
        ConstraintNode::from_constraints(vec![
            in_set(&product, ["equity"]),
            in_set(&venue, ["LSE", "NYSE"]),
        ]),
        ConstraintNode::from_constraints(vec![
            in_set(&product, ["bond"]),
            in_set(&venue, ["OTC"]),
        ]),
    ])]);

    DecisionTree::new(fields, root)
}

fn not_null(field: &Field) -> AtomicConstraint {
    AtomicConstraint::new(field.clone(), ConstraintKind::IsNull).negated()
}

fn in_set<const N: usize>(field: &Field, values: [&str; N]) -> AtomicConstraint {
    AtomicConstraint::new(
        field.clone(),
        ConstraintKind::InSet(values.into_iter().map(DataValue::from).collect()),
    )
}
