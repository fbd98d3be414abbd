//! Command-line interface for ellio.
//!
//! Provides commands for parsing transcripts into tasks, resolving products
//! by barcode or photo, searching nearby stores and inspecting configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config;
use crate::core::{filter_stores, group_stores_by_type, Orchestrator, StoreFilter, StoreSearch};
use crate::domain::{
    ParsedTaskList, ProductIdentity, ResolutionResult, StoreAvailabilityRecord, StoreType,
};

/// ellio - voice tasks and product lookup from the command line
#[derive(Parser, Debug)]
#[command(name = "ellio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Split a spoken transcript into tasks
    Parse {
        /// Transcript text (multiple words are joined)
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Identify a product by barcode and find nearby stores
    Barcode {
        /// Barcode digits (UPC/EAN)
        code: String,
    },

    /// Identify a product from a photo and find nearby stores
    Image {
        /// Path to a JPEG or PNG file
        path: PathBuf,
    },

    /// Search stores for a product by name
    Stores {
        /// Product name
        #[arg(short, long)]
        name: String,

        /// Product brand
        #[arg(short, long)]
        brand: Option<String>,

        /// Maximum distance in miles
        #[arg(long)]
        max_distance: Option<f64>,

        /// Only show stores with the product in stock
        #[arg(long)]
        in_stock_only: bool,

        /// Only show these store types (repeatable, e.g. grocery, pharmacy)
        #[arg(long = "store-type")]
        store_types: Vec<StoreType>,

        /// Minimum store rating
        #[arg(long)]
        min_rating: Option<f64>,

        /// Group results by store type
        #[arg(long)]
        grouped: bool,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let json = self.json;
        match self.command {
            Commands::Parse { text } => parse_command(&text.join(" "), json),
            Commands::Barcode { code } => barcode_command(&code, json).await,
            Commands::Image { path } => image_command(&path, json).await,
            Commands::Stores {
                name,
                brand,
                max_distance,
                in_stock_only,
                store_types,
                min_rating,
                grouped,
            } => {
                let product = ProductIdentity {
                    brand,
                    ..ProductIdentity::named(name)
                };
                let filter = StoreFilter {
                    max_distance,
                    in_stock_only,
                    store_types,
                    min_rating,
                };
                stores_command(&product, &filter, grouped, json).await
            }
            Commands::Config => show_config(json),
        }
    }
}

fn orchestrator() -> Result<Orchestrator> {
    let settings = config::config()?;
    Orchestrator::from_settings(settings).context("Failed to set up providers")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_command(text: &str, json: bool) -> Result<()> {
    let parsed = crate::extract::parse_tasks(text);
    if json {
        return print_json(&parsed);
    }
    print_tasks(&parsed);
    Ok(())
}

async fn barcode_command(code: &str, json: bool) -> Result<()> {
    let result = orchestrator()?.resolve_by_barcode(code).await;
    report_resolution(result.as_ref(), json)
}

async fn image_command(path: &Path, json: bool) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image: {}", path.display()))?;

    let result = orchestrator()?.resolve_by_image(&bytes).await;
    report_resolution(result.as_ref(), json)
}

async fn stores_command(
    product: &ProductIdentity,
    filter: &StoreFilter,
    grouped: bool,
    json: bool,
) -> Result<()> {
    let StoreSearch { stores, provenance } = orchestrator()?.find_stores(product).await;
    let stores = filter_stores(&stores, filter);

    if json {
        return if grouped {
            print_json(&group_stores_by_type(&stores))
        } else {
            print_json(&StoreSearch { stores, provenance })
        };
    }

    println!("Stores for \"{}\"", product.search_query());
    if provenance.is_synthetic() {
        println!("(sample data - no live store source answered)");
    }
    println!();

    if stores.is_empty() {
        println!("No stores match.");
    } else if grouped {
        for (store_type, group) in group_stores_by_type(&stores) {
            println!("{}:", store_type.label());
            for store in &group {
                print_store(store);
            }
            println!();
        }
    } else {
        for store in &stores {
            print_store(store);
        }
    }

    Ok(())
}

fn report_resolution(result: Option<&ResolutionResult>, json: bool) -> Result<()> {
    if json {
        return print_json(&result);
    }

    let Some(result) = result else {
        println!("Product not found.");
        return Ok(());
    };

    let product = &result.product;
    println!("Product: {}", product.name);
    if let Some(brand) = &product.brand {
        println!("  Brand:    {}", brand);
    }
    if let Some(category) = &product.category {
        println!("  Category: {}", category);
    }
    if let Some(size) = &product.size {
        println!("  Size:     {}", size);
    }
    if let Some(quantity) = product.quantity {
        println!("  Quantity: {}", quantity);
    }
    if let Some(description) = &product.description {
        println!("  Labels:   {}", description);
    }
    println!("  Source:   {}", result.product_source);
    println!();

    if result.store_provenance.is_synthetic() {
        println!("Stores (sample data):");
    } else {
        println!("Stores:");
    }
    for store in &result.stores {
        print_store(store);
    }

    Ok(())
}

fn print_tasks(parsed: &ParsedTaskList) {
    println!("{}", parsed.summary);
    for (index, task) in parsed.tasks.iter().enumerate() {
        println!();
        println!("{}. {}", index + 1, task.title);
        println!("   Category: {}  Priority: {}", task.category, task.priority);
        if let Some(due) = task.due_date {
            println!("   Due:      {}", due.with_timezone(&chrono::Local).format("%a %b %-d"));
        }
        if let Some(note) = &task.note {
            println!("   Note:     {}", note);
        }
    }
}

fn print_store(store: &StoreAvailabilityRecord) {
    let distance = store
        .distance
        .map(|d| format!("{:.1} mi", d))
        .unwrap_or_else(|| "-".to_string());
    let price = store
        .price
        .map(|p| format!("${:.2}", p))
        .unwrap_or_else(|| "-".to_string());
    let stock = if store.in_stock { "in stock" } else { "out of stock" };

    println!(
        "  {:<24} {:>8} {:>8}  {}",
        store.store_name, distance, price, stock
    );
    if let Some(address) = &store.address {
        println!("  {:<24} {}", "", address);
    }
}

fn show_config(json: bool) -> Result<()> {
    let cfg = config::config()?;

    if json {
        return print_json(&serde_json::json!({
            "config_file": cfg.config_file,
            "image_recognition": cfg.has_vision(),
            "live_store_search": cfg.has_places(),
            "timeout_seconds": cfg.timeout.as_secs(),
            "search_center": cfg.search_center,
            "radius_meters": cfg.radius_meters,
            "max_stores": cfg.max_stores,
        }));
    }

    let enabled = |on: bool| if on { "enabled" } else { "disabled (no API key)" };

    println!("ellio configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Providers:");
    println!("  Open Food Facts:   {}", cfg.open_food_facts_url);
    println!("  UPCitemdb:         {}", cfg.upc_item_db_url);
    println!("  Image recognition: {}", enabled(cfg.has_vision()));
    println!("  Live store search: {}", enabled(cfg.has_places()));
    println!();
    println!("Search:");
    println!(
        "  Center:      {:.4}, {:.4}",
        cfg.search_center.latitude, cfg.search_center.longitude
    );
    println!("  Radius:      {} m", cfg.radius_meters);
    println!("  Max stores:  {}", cfg.max_stores);
    println!("  Timeout:     {}s", cfg.timeout.as_secs());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_joins_words() {
        let cli = Cli::try_parse_from(["ellio", "parse", "buy", "milk"]).unwrap();
        match cli.command {
            Commands::Parse { text } => assert_eq!(text.join(" "), "buy milk"),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(!cli.json);
    }

    #[test]
    fn test_stores_flags() {
        let cli = Cli::try_parse_from([
            "ellio",
            "stores",
            "--name",
            "oat milk",
            "--store-type",
            "grocery",
            "--store-type",
            "general-merchandise",
            "--in-stock-only",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Stores {
                name,
                store_types,
                in_stock_only,
                ..
            } => {
                assert_eq!(name, "oat milk");
                assert!(in_stock_only);
                assert_eq!(
                    store_types,
                    vec![StoreType::Grocery, StoreType::GeneralMerchandise]
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_store_type_is_rejected() {
        let result = Cli::try_parse_from(["ellio", "stores", "--name", "x", "--store-type", "spa"]);
        assert!(result.is_err());
    }
}
