use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use clap::Parser;
use log::info;
use rust_decimal::Decimal;

/// Write a deterministic Superstore-style sales CSV.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Destination file.
    #[arg(default_value = "sample_sales.csv")]
    output: PathBuf,

    /// Number of order lines to generate.
    #[arg(long, default_value_t = 1_000)]
    rows: u32,

    /// PRNG seed; the same seed always yields the same file.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len() as u64) as usize]
    }
}

/// (region, state, cities)
const GEOGRAPHY: [(&str, &str, &[&str]); 8] = [
    ("West", "Maharashtra", &["Mumbai", "Pune", "Nagpur", "Thane"]),
    ("West", "Gujarat", &["Ahmedabad", "Surat", "Vadodara"]),
    ("North", "Delhi", &["Delhi"]),
    ("North", "Uttar Pradesh", &["Lucknow", "Kanpur"]),
    ("South", "Karnataka", &["Bangalore"]),
    ("South", "Tamil Nadu", &["Chennai", "Coimbatore", "Madurai"]),
    ("East", "West Bengal", &["Kolkata"]),
    ("Central", "Madhya Pradesh", &["Bhopal", "Indore"]),
];

/// (category, sub-categories, typical unit price in paise)
const PRODUCTS: [(&str, &[&str], i64); 3] = [
    ("Furniture", &["Bookcases", "Chairs", "Furnishings", "Tables"], 25_000),
    ("Office Supplies", &["Art", "Binders", "Paper", "Storage"], 1_500),
    ("Technology", &["Accessories", "Copiers", "Machines", "Phones"], 40_000),
];

const CUSTOMERS: [&str; 6] = [
    "Aarav Shah",
    "Diya Iyer",
    "Kabir Singh",
    "Meera Nair",
    "Rohan Das",
    "Sanya Kapoor",
];

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let output_path = args.output;

    let mut rng = SimpleRng::new(args.seed);
    let first_day = NaiveDate::from_ymd_opt(2022, 1, 1).context("invalid start date")?;

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {}", output_path.display()))?;
    writer.write_record([
        "Row ID",
        "Order ID",
        "Order Date",
        "Customer Name",
        "Region",
        "State",
        "City",
        "Category",
        "Sub-Category",
        "Sales",
        "Profit",
        "Quantity",
    ])?;

    let n_rows = args.rows;
    info!("generating {n_rows} rows with seed {}", args.seed);
    for row_id in 1..=n_rows {
        let order_date = first_day + Duration::days(rng.below(730) as i64);
        let (region, state, cities) = *rng.pick(&GEOGRAPHY);
        let city = *rng.pick(cities);
        let (category, sub_categories, unit_price) = *rng.pick(&PRODUCTS);
        let sub_category = *rng.pick(sub_categories);
        let customer = *rng.pick(&CUSTOMERS);

        let quantity = 1 + rng.below(9) as i64;
        // ±50% around the typical price, in paise
        let price = unit_price / 2 + rng.below(unit_price as u64) as i64;
        let sales = Decimal::new(price * quantity, 2);
        // margin between -30% and +40%
        let margin = Decimal::new(rng.below(71) as i64 - 30, 2);
        let profit = (sales * margin).round_dp(2);

        writer.write_record([
            row_id.to_string(),
            format!("IN-{}-{:05}", order_date.format("%Y"), row_id),
            order_date.format("%d-%m-%Y").to_string(),
            customer.to_string(),
            region.to_string(),
            state.to_string(),
            city.to_string(),
            category.to_string(),
            sub_category.to_string(),
            sales.to_string(),
            profit.to_string(),
            quantity.to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {n_rows} sales records to {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_bundled_sample() {
        let args = Args::try_parse_from(["generate_sample"]).unwrap();
        assert_eq!(args.output, PathBuf::from("sample_sales.csv"));
        assert_eq!(args.rows, 1_000);
        assert_eq!(args.seed, 42);
    }

    #[test]
    fn output_is_positional_and_counts_are_flags() {
        let args =
            Args::try_parse_from(["generate_sample", "out.csv", "--rows", "10", "--seed", "7"])
                .unwrap();
        assert_eq!(args.output, PathBuf::from("out.csv"));
        assert_eq!((args.rows, args.seed), (10, 7));

        assert!(Args::try_parse_from(["generate_sample", "a.csv", "b.csv"]).is_err());
        assert!(Args::try_parse_from(["generate_sample", "--rows", "many"]).is_err());
    }

    #[test]
    fn same_seed_same_sequence() {
        let draw = |seed| {
            let mut rng = SimpleRng::new(seed);
            (0..8).map(|_| rng.next_u64()).collect::<Vec<_>>()
        };
        assert_eq!(draw(7), draw(7));
        assert_ne!(draw(7), draw(8));
    }
}
