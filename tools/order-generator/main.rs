use clap::Parser;
use hassou::order::{LineItem, Order};
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use rand::{Rng, rng};
use std::fs;

const TAGS: [&str; 6] = ["vip", "wholesale", "express", "gift", "subscription", "b2b"];

/// A CLI tool to generate random orders for the hassou router
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_order.json")]
    output: String,

    /// How many orders to generate. More than one is written as a JSON array
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// The minimum number of line items per order
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// The maximum number of line items per order
    #[arg(long, default_value_t = 8)]
    max: usize,

    /// Product ids are drawn from 1..=products
    #[arg(long, default_value_t = 50)]
    products: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rng();

    if cli.min > cli.max {
        eprintln!(
            "Error: --min ({}) cannot be greater than --max ({})",
            cli.min, cli.max
        );
        std::process::exit(1);
    }
    if cli.products == 0 {
        eprintln!("Error: --products must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating {} order(s) with {} to {} line items each...",
        cli.count, cli.min, cli.max
    );

    let orders: Vec<Order> = (0..cli.count)
        .map(|_| generate_order(&mut rng, cli.min, cli.max, cli.products))
        .collect();

    let json_output = if orders.len() == 1 {
        serde_json::to_string_pretty(&orders[0])?
    } else {
        serde_json::to_string_pretty(&orders)?
    };
    fs::write(&cli.output, json_output)?;

    println!("Successfully generated and saved orders to '{}'", cli.output);
    Ok(())
}

fn generate_order(rng: &mut ThreadRng, min_items: usize, max_items: usize, products: u64) -> Order {
    let count = rng.random_range(min_items..=max_items);
    let line_items = (0..count)
        .map(|_| generate_line_item(rng, products))
        .collect();

    let tag_count = rng.random_range(0..=2);
    let tags: Vec<&str> = TAGS.choose_multiple(rng, tag_count).copied().collect();
    let price = (rng.random_range(5.0..500.0_f64) * 100.0).round() / 100.0;

    Order::new(line_items).with_tags(tags).with_price(price)
}

fn generate_line_item(rng: &mut ThreadRng, products: u64) -> LineItem {
    let product_id = rng.random_range(1..=products);
    let variant_id = product_id * 100 + rng.random_range(1..=5);
    LineItem::for_product(&product_id.to_string())
        .with_variant(&variant_id.to_string())
        .with_sku(&format!("SKU-{:05}", variant_id))
        .with_quantity(rng.random_range(1..=4))
}
