use std::fs;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use sales_dashboard::config::Config;
use sales_dashboard::data::aggregate::total_sales;
use sales_dashboard::data::export::{export_filtered, filtered_csv_string};
use sales_dashboard::data::loader::{load_delimited, ParsePolicy, MAX_AMOUNT};
use sales_dashboard::{
    apply, load_file, DashboardViews, FilterCriteria, FilterWarning, Geography, LoadError,
    LoadOptions, SalesTable,
};

const SUPERSTORE: &str = "\
Row ID,Order ID,Order Date,Customer Name,Region,State,City,Category,Sub-Category,Sales,Profit,Quantity
1,IN-2022-001,08-11-2022,Aarav Shah,West,Gujarat,Ahmedabad,Furniture,Bookcases,261.96,41.91,2
2,IN-2022-002,12-12-2022,Diya Iyer,West,Gujarat,Surat,Furniture,Chairs,731.94,219.58,3
3,IN-2023-003,05-01-2023,Kabir Singh,North,Delhi,Delhi,Office Supplies,Labels,14.62,6.87,2
4,IN-2023-004,10-02-2023,Meera Nair,South,Kerala,Kochi,Furniture,Tables,957.5775,-383.031,5
5,IN-2023-005,10-02-2023,Meera Nair,South,Kerala,Kochi,Office Supplies,Storage,22.368,2.5164,2
6,IN-2023-006,21-06-2023,\"Das, Rohan\",East,West Bengal,Kolkata,Technology,Phones,907.152,90.7152,6
7,IN-2023-007,21-11-2023,Sanya Kapoor,West,Maharashtra,Mumbai,Furniture,Chairs,48.86,14.17,7
";

fn options() -> LoadOptions {
    LoadOptions {
        date_formats: vec!["%d-%m-%Y".into()],
        ..LoadOptions::default()
    }
}

fn superstore() -> SalesTable {
    load_delimited(SUPERSTORE.as_bytes(), &options()).unwrap().table
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn export_then_reload_round_trips() {
    let table = superstore();
    let criteria = FilterCriteria::new(date(2023, 1, 1), date(2023, 12, 31))
        .with(Geography::Region, ["South", "East", "West"]);
    let filtered = apply(&table, &criteria);
    assert_eq!(filtered.len(), 4);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filtered_data.csv");
    export_filtered(fs::File::create(&path).unwrap(), &filtered).unwrap();

    let reloaded = load_file(&path, &options()).unwrap();
    assert!(reloaded.skipped.is_empty());
    assert_eq!(reloaded.table, filtered.to_table());
}

#[test]
fn full_export_matches_the_source_text() {
    let table = superstore();
    let everything = apply(&table, &FilterCriteria::spanning(&table).unwrap());
    assert_eq!(filtered_csv_string(&everything).unwrap(), SUPERSTORE);
}

#[test]
fn category_state_and_row_totals_agree() {
    let table = superstore();
    for criteria in [
        FilterCriteria::spanning(&table).unwrap(),
        FilterCriteria::new(date(2023, 2, 1), date(2023, 6, 30)),
        FilterCriteria::spanning(&table)
            .unwrap()
            .with(Geography::City, ["Kochi", "Mumbai"]),
    ] {
        let data = apply(&table, &criteria);
        let views = DashboardViews::compute(&data);
        let total = total_sales(&data);

        assert_eq!(views.category_sales.values().copied().sum::<Decimal>(), total);
        assert_eq!(views.state_sales.values().copied().sum::<Decimal>(), total);
        let pivot_total: Decimal = views
            .sub_category_by_month
            .rows
            .values()
            .flatten()
            .flatten()
            .copied()
            .sum();
        assert_eq!(pivot_total, total);
    }
}

#[test]
fn sums_are_exact_decimals() {
    let table = superstore();
    let criteria = FilterCriteria::spanning(&table)
        .unwrap()
        .with(Geography::State, ["Kerala"]);
    let views = DashboardViews::compute(&apply(&table, &criteria));
    assert_eq!(views.state_sales["Kerala"], Decimal::new(9799455, 4));
}

#[test]
fn geography_free_criteria_match_the_date_window() {
    let table = superstore();
    let criteria = FilterCriteria::new(date(2022, 12, 12), date(2023, 2, 10));
    let filtered = apply(&table, &criteria);
    let expected: Vec<&str> = filtered.records().map(|r| r.raw[0].as_str()).collect();
    assert_eq!(expected, vec!["2", "3", "4", "5"]);
}

#[test]
fn inverted_range_empties_everything() {
    let table = superstore();
    let criteria = FilterCriteria::new(date(2023, 12, 31), date(2022, 1, 1));
    let filtered = apply(&table, &criteria);
    assert_eq!(filtered.warning(), Some(FilterWarning::InvalidRange));
    assert!(DashboardViews::compute(&filtered).is_empty());
}

#[test]
fn configured_default_dataset_loads_with_configured_options() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("superstore.csv"), SUPERSTORE.replace("08-11-2022", "bad")).unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
        [dataset]
        default_path = "superstore.csv"
        date_formats = ["%d-%m-%Y"]
        on_parse_error = "skip"
        "#,
    )
    .unwrap();

    let config = Config::from_file(&config_path).unwrap();
    let options = config.load_options().unwrap();
    assert_eq!(options.policy, ParsePolicy::Skip);

    let path = config.dataset_path().unwrap();
    let report = load_file(&path, &options).unwrap();
    assert_eq!(report.table.len(), 6);
    assert!(matches!(
        &report.skipped[..],
        [LoadError::Parse { line: 2, value, .. }] if value == "bad"
    ));
}

#[test]
fn json_key_order_survives_csv_export() {
    let json = r#"[
        {"Row ID": 1, "Order Date": "2023-01-05", "Region": "West", "State": "Gujarat",
         "City": "Surat", "Category": "Furniture", "Sub-Category": "Chairs",
         "Sales": 100.5, "Profit": 3, "Quantity": 2}
    ]"#;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.json");
    fs::write(&path, json).unwrap();

    let table = load_file(&path, &LoadOptions::default()).unwrap().table;
    let everything = apply(&table, &FilterCriteria::spanning(&table).unwrap());
    let text = filtered_csv_string(&everything).unwrap();

    assert_eq!(
        text,
        "Row ID,Order Date,Region,State,City,Category,Sub-Category,Sales,Profit,Quantity\n\
         1,2023-01-05,West,Gujarat,Surat,Furniture,Chairs,100.5,3,2\n"
    );
}

#[test]
fn oversized_sales_never_reach_the_views() {
    let text = "\
Order Date,Region,State,City,Category,Sub-Category,Sales,Profit,Quantity
2023-01-05,West,Gujarat,Surat,Furniture,Chairs,79228162514264337593543950335,0,1
2023-01-06,West,Gujarat,Surat,Furniture,Chairs,1,0,1
";
    assert!(matches!(
        load_delimited(text.as_bytes(), &LoadOptions::default()),
        Err(LoadError::Parse { line: 2, .. })
    ));

    let skip = LoadOptions {
        policy: ParsePolicy::Skip,
        ..LoadOptions::default()
    };
    let table = load_delimited(text.as_bytes(), &skip).unwrap().table;
    let views = DashboardViews::compute(&apply(&table, &FilterCriteria::spanning(&table).unwrap()));
    assert_eq!(views.category_sales["Furniture"], Decimal::ONE);

    // Many rows at the accepted limit still sum exactly.
    let limit = "1000000000000000";
    let mut big = String::from("Order Date,Region,State,City,Category,Sub-Category,Sales,Profit,Quantity\n");
    for _ in 0..10_000 {
        big.push_str(&format!("2023-01-05,West,Gujarat,Surat,Furniture,Chairs,{limit},-{limit},1\n"));
    }
    let table = load_delimited(big.as_bytes(), &LoadOptions::default()).unwrap().table;
    let data = apply(&table, &FilterCriteria::spanning(&table).unwrap());
    let views = DashboardViews::compute(&data);
    assert_eq!(total_sales(&data), Decimal::from(10_000) * Decimal::from(MAX_AMOUNT));
    assert_eq!(views.hierarchy.total, total_sales(&data));
}
