use std::io::{Write, stdout};

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::{
    LedgerService, MovementFilter, RegisterMovement, StockAlertsReport, StockPolicy, StockReport,
    TopExitsReport, parse_movement_type,
};
use crate::domain::{
    Movement, MovementPatch, Product, ProductDraft, ProductPatch, format_cents, parse_cents,
};

/// Stockroom - Inventory ledger for hardware stores
#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "A local-first inventory tool: product catalog plus a stock movement ledger")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "STOCKROOM_DB", default_value = "stockroom.db")]
    pub database: String,

    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Allow exits to take stock below zero
    #[arg(
        long,
        env = "STOCKROOM_ALLOW_NEGATIVE_STOCK",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub allow_negative_stock: bool,

    /// Reject products whose SKU is already in the catalog
    #[arg(long, env = "STOCKROOM_UNIQUE_SKU")]
    pub unique_sku: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Product catalog commands
    #[command(subcommand)]
    Product(ProductCommands),

    /// Stock movement commands
    #[command(subcommand)]
    Movement(MovementCommands),

    /// Inventory reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export data to CSV or JSON
    Export {
        /// What to export: products, movements, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import a full JSON snapshot
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,

        /// Skip records whose id already exists
        #[arg(long)]
        skip_duplicates: bool,
    },
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List the catalog
    List {
        /// Only products at or below their minimum stock
        #[arg(long)]
        low_stock: bool,

        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show a product by SKU
    Show {
        /// Product SKU
        sku: String,
    },

    /// Add a product
    Add {
        /// Stock-keeping unit, e.g. FER-001
        #[arg(long)]
        sku: String,

        /// Product name
        #[arg(short, long)]
        name: String,

        /// Category
        #[arg(short, long)]
        category: String,

        /// Units on hand (anything non-numeric counts as 0)
        #[arg(short, long, default_value = "0")]
        stock: String,

        /// Minimum stock before the product shows as low
        #[arg(short, long, default_value = "0")]
        min_stock: String,

        /// Unit price, e.g. "25.90"
        #[arg(short, long, default_value = "0")]
        price: String,
    },

    /// Update a product by id
    Update {
        /// Product id
        id: i64,

        #[arg(long)]
        sku: Option<String>,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long, allow_negative_numbers = true)]
        stock: Option<i64>,

        #[arg(short, long)]
        min_stock: Option<i64>,

        /// Unit price, e.g. "25.90"
        #[arg(short, long)]
        price: Option<String>,
    },

    /// Delete a product by id
    Delete {
        /// Product id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum MovementCommands {
    /// List the movement log
    List {
        /// Filter by type: Entrada, Salida, Ajuste
        #[arg(short = 't', long = "type")]
        movement_type: Option<String>,

        /// Filter by product SKU
        #[arg(long)]
        sku: Option<String>,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from_date: Option<String>,

        /// Filter to date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to_date: Option<String>,

        /// Maximum number of movements to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Show the newest movements first
        #[arg(long)]
        newest_first: bool,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Register a stock movement
    Register {
        /// Product SKU
        sku: String,

        /// Movement type: Entrada, Salida, Ajuste
        #[arg(short = 't', long = "type")]
        movement_type: String,

        /// Units moved, as counted (exits are negated automatically)
        #[arg(short, long)]
        quantity: i64,

        /// Reference note: invoice, delivery guide, reason
        #[arg(short, long)]
        reference: String,

        /// Who registered the movement
        #[arg(short, long)]
        user: Option<String>,

        /// Date of the movement (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show a movement by id
    Show {
        /// Movement id
        id: i64,
    },

    /// Edit the reference, user or date of a movement
    Update {
        /// Movement id
        id: i64,

        #[arg(short, long)]
        reference: Option<String>,

        #[arg(short, long)]
        user: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a movement by id (stock is not changed)
    Delete {
        /// Movement id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// All products with stock, value and status
    Stock {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Products at or below their minimum stock
    Alerts {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Products ranked by units exited
    TopExits {
        /// Start date (YYYY-MM-DD, defaults to start of current month)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, inclusive, defaults to now)
        #[arg(long)]
        to: Option<String>,

        /// Number of products to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Dashboard numbers: products, inventory value, alerts
    Summary {
        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    /// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
    pub fn init_tracing(&self) {
        let default_level = if self.verbose { "debug" } else { "warn" };
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    pub fn policy(&self) -> StockPolicy {
        StockPolicy {
            allow_negative_stock: self.allow_negative_stock,
            unique_sku: self.unique_sku,
        }
    }

    async fn service(&self) -> Result<LedgerService> {
        let service = LedgerService::connect(&self.database)
            .await
            .with_context(|| format!("Cannot open database '{}'. Run `stockroom init` first", self.database))?;
        Ok(service.with_policy(self.policy()))
    }

    pub async fn run(self) -> Result<()> {
        match &self.command {
            Commands::Init => {
                LedgerService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Product(cmd) => {
                let service = self.service().await?;
                run_product_command(&service, cmd).await?;
            }

            Commands::Movement(cmd) => {
                let service = self.service().await?;
                run_movement_command(&service, cmd).await?;
            }

            Commands::Report(cmd) => {
                let service = self.service().await?;
                run_report_command(&service, cmd).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = self.service().await?;
                run_export_command(&service, export_type, output.as_deref()).await?;
            }

            Commands::Import {
                input,
                dry_run,
                skip_duplicates,
            } => {
                let service = self.service().await?;
                run_import_command(&service, input.as_deref(), *dry_run, *skip_duplicates)
                    .await?;
            }
        }

        Ok(())
    }
}

async fn run_product_command(service: &LedgerService, cmd: &ProductCommands) -> Result<()> {
    match cmd {
        ProductCommands::List {
            low_stock,
            category,
            format,
        } => {
            let products: Vec<Product> = service
                .list_products()
                .await?
                .into_iter()
                .filter(|p| !low_stock || p.is_low_stock())
                .filter(|p| {
                    category
                        .as_deref()
                        .is_none_or(|c| p.category.eq_ignore_ascii_case(c))
                })
                .collect();

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&products)?);
            } else if products.is_empty() {
                println!("No products found.");
            } else {
                print_products_table(&products);
            }
        }

        ProductCommands::Show { sku } => {
            let product = service.get_product_by_sku(sku).await?;
            print_product(&product);
        }

        ProductCommands::Add {
            sku,
            name,
            category,
            stock,
            min_stock,
            price,
        } => {
            let draft = ProductDraft::new(sku, name, category)
                .with_stock(stock)
                .with_min_stock(min_stock)
                .with_price(price);

            let product = service.add_product(draft).await?;
            println!(
                "Added product #{}: {} - {} (stock {})",
                product.id, product.sku, product.name, product.current_stock
            );
        }

        ProductCommands::Update {
            id,
            sku,
            name,
            category,
            stock,
            min_stock,
            price,
        } => {
            let price_cents = price
                .as_deref()
                .map(parse_cents)
                .transpose()
                .context("Invalid price format. Use '25.90' or '25'")?;

            let patch = ProductPatch {
                sku: sku.clone(),
                name: name.clone(),
                category: category.clone(),
                current_stock: *stock,
                min_stock: *min_stock,
                price_cents,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update. Pass at least one field to change");
            }

            let product = service.update_product(*id, patch).await?;
            println!("Updated product #{}", product.id);
            print_product(&product);
        }

        ProductCommands::Delete { id } => {
            let product = service.delete_product(*id).await?;
            println!(
                "Deleted product #{}: {} - {}",
                product.id, product.sku, product.name
            );
        }
    }
    Ok(())
}

async fn run_movement_command(service: &LedgerService, cmd: &MovementCommands) -> Result<()> {
    match cmd {
        MovementCommands::List {
            movement_type,
            sku,
            from_date,
            to_date,
            limit,
            newest_first,
            format,
        } => {
            let filter = MovementFilter {
                movement_type: movement_type
                    .as_deref()
                    .map(parse_movement_type)
                    .transpose()?,
                sku: sku.clone(),
                from_date: from_date
                    .as_deref()
                    .map(parse_date)
                    .transpose()
                    .context("Invalid from-date")?,
                to_date: to_date
                    .as_deref()
                    .map(parse_end_of_day)
                    .transpose()
                    .context("Invalid to-date")?,
                limit: *limit,
                newest_first: *newest_first,
            };

            let movements = service.list_movements_filtered(filter).await?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&movements)?);
            } else if movements.is_empty() {
                println!("No movements found.");
            } else {
                print_movements_table(&movements);
            }
        }

        MovementCommands::Register {
            sku,
            movement_type,
            quantity,
            reference,
            user,
            date,
        } => {
            let movement_type = parse_movement_type(movement_type)?;
            let mut request = RegisterMovement::new(sku, movement_type, *quantity, reference);
            if let Some(user) = user {
                request = request.with_user(user);
            }
            if let Some(date_str) = date {
                let timestamp = parse_date(date_str).with_context(|| {
                    format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                })?;
                request = request.with_timestamp(timestamp);
            }

            let result = service.register_movement(request).await?;

            println!(
                "Registered {} #{}: {} {:+} -> stock {} ({})",
                result.movement.movement_type,
                result.movement.id,
                result.product.sku,
                result.movement.quantity,
                result.product.current_stock,
                result.product.status()
            );
        }

        MovementCommands::Show { id } => {
            let movement = service.get_movement(*id).await?;
            print_movement(&movement);
        }

        MovementCommands::Update {
            id,
            reference,
            user,
            date,
        } => {
            let timestamp = date
                .as_deref()
                .map(parse_date)
                .transpose()
                .context("Invalid date")?;

            let patch = MovementPatch {
                timestamp,
                user: user.clone(),
                reference: reference.clone(),
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update. Pass --reference, --user or --date");
            }

            let movement = service.update_movement(*id, patch).await?;
            println!("Updated movement #{}", movement.id);
            print_movement(&movement);
        }

        MovementCommands::Delete { id } => {
            let movement = service.delete_movement(*id).await?;
            println!(
                "Deleted movement #{}: {} {} {:+}",
                movement.id, movement.movement_type, movement.product_sku, movement.quantity
            );
        }
    }
    Ok(())
}

async fn run_report_command(service: &LedgerService, cmd: &ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::Stock { format } => {
            let report = service.stock_report().await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                "csv" => write_stock_csv(stdout(), &report)?,
                _ => {
                    println!("Stock Report");
                    println!("Generated: {}", report.generated_at.format("%Y-%m-%d %H:%M"));
                    println!();
                    println!(
                        "{:<10} {:<25} {:>8} {:>8} {:>10} {:>12} {:<10}",
                        "SKU", "NAME", "STOCK", "MIN", "PRICE", "VALUE", "STATUS"
                    );
                    println!("{}", "-".repeat(89));
                    for line in &report.lines {
                        println!(
                            "{:<10} {:<25} {:>8} {:>8} {:>10} {:>12} {:<10}",
                            truncate(&line.sku, 10),
                            truncate(&line.name, 25),
                            line.current_stock,
                            line.min_stock,
                            format_cents(line.price_cents),
                            format_cents(line.value),
                            line.status.as_str()
                        );
                    }
                    println!("{}", "-".repeat(89));
                    println!("{:<56} {:>12}", "TOTAL VALUE", format_cents(report.total_value));
                }
            }
        }

        ReportCommands::Alerts { format } => {
            let report = service.stock_alerts().await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                "csv" => write_alerts_csv(stdout(), &report)?,
                _ => {
                    if report.products.is_empty() {
                        println!("No stock alerts.");
                        return Ok(());
                    }
                    println!("Stock Alerts ({})", report.products.len());
                    println!();
                    println!(
                        "{:<10} {:<25} {:>8} {:>8} {:>10}",
                        "SKU", "NAME", "STOCK", "MIN", "SHORTFALL"
                    );
                    println!("{}", "-".repeat(65));
                    for alert in &report.products {
                        println!(
                            "{:<10} {:<25} {:>8} {:>8} {:>10}",
                            truncate(&alert.sku, 10),
                            truncate(&alert.name, 25),
                            alert.current_stock,
                            alert.min_stock,
                            alert.shortfall
                        );
                    }
                }
            }
        }

        ReportCommands::TopExits {
            from,
            to,
            limit,
            format,
        } => {
            let (from_date, to_date) = parse_date_range(from.as_deref(), to.as_deref())?;
            let report = service.top_exits(from_date, to_date, Some(*limit)).await?;

            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                "csv" => write_top_exits_csv(stdout(), &report)?,
                _ => {
                    println!("Top Exits");
                    println!(
                        "Period: {} to {}",
                        report.from_date.format("%Y-%m-%d"),
                        report.to_date.format("%Y-%m-%d")
                    );
                    println!();
                    if report.products.is_empty() {
                        println!("No exits in this period.");
                        return Ok(());
                    }
                    println!(
                        "{:>4} {:<10} {:<25} {:>8} {:>10}",
                        "#", "SKU", "NAME", "UNITS", "MOVEMENTS"
                    );
                    println!("{}", "-".repeat(61));
                    for (rank, total) in report.products.iter().enumerate() {
                        println!(
                            "{:>4} {:<10} {:<25} {:>8} {:>10}",
                            rank + 1,
                            truncate(&total.sku, 10),
                            truncate(&total.name, 25),
                            total.units,
                            total.count
                        );
                    }
                }
            }
        }

        ReportCommands::Summary { format } => {
            let summary = service.inventory_summary().await?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Products:        {}", summary.product_count);
                println!("Inventory value: {}", format_cents(summary.inventory_value));
                println!("Stock alerts:    {}", summary.low_stock_count);
                println!("Movements:       {}", summary.movement_count);
            }
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "products" => {
            let count = exporter.export_products_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} products", count);
            }
        }
        "movements" => {
            let count = exporter.export_movements_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} movements", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!(
                    "Exported full database: {} products, {} movements",
                    snapshot.products.len(),
                    snapshot.movements.len()
                );
            }
        }
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: products, movements, full",
                export_type
            );
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &LedgerService,
    input: Option<&str>,
    dry_run: bool,
    skip_duplicates: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    let importer = Importer::new(service);

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let options = ImportOptions {
        dry_run,
        skip_duplicates,
    };
    let result = importer.import_full_json(reader, options).await?;

    if dry_run {
        println!("Dry run complete");
    } else {
        println!("Import complete");
    }
    println!("  Imported: {}", result.imported);
    println!("  Skipped:  {}", result.skipped);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in result.errors.iter().take(10) {
            println!("  {}: {}", error.record, error.error);
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }

    Ok(())
}

fn write_stock_csv<W: Write>(writer: W, report: &StockReport) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "sku",
        "name",
        "category",
        "stock",
        "min_stock",
        "price",
        "value",
        "net_movement",
        "status",
    ])?;
    for line in &report.lines {
        csv_writer.write_record([
            line.sku.clone(),
            line.name.clone(),
            line.category.clone(),
            line.current_stock.to_string(),
            line.min_stock.to_string(),
            format_cents(line.price_cents),
            format_cents(line.value),
            line.net_movement.to_string(),
            line.status.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn write_alerts_csv<W: Write>(writer: W, report: &StockAlertsReport) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["sku", "name", "stock", "min_stock", "shortfall"])?;
    for alert in &report.products {
        csv_writer.write_record([
            alert.sku.clone(),
            alert.name.clone(),
            alert.current_stock.to_string(),
            alert.min_stock.to_string(),
            alert.shortfall.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn write_top_exits_csv<W: Write>(writer: W, report: &TopExitsReport) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["rank", "sku", "name", "units", "movements"])?;
    for (rank, total) in report.products.iter().enumerate() {
        csv_writer.write_record([
            (rank + 1).to_string(),
            total.sku.clone(),
            total.name.clone(),
            total.units.to_string(),
            total.count.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn print_products_table(products: &[Product]) {
    println!(
        "{:>4} {:<10} {:<25} {:<15} {:>8} {:>8} {:>10} {:<10}",
        "ID", "SKU", "NAME", "CATEGORY", "STOCK", "MIN", "PRICE", "STATUS"
    );
    println!("{}", "-".repeat(97));
    for p in products {
        println!(
            "{:>4} {:<10} {:<25} {:<15} {:>8} {:>8} {:>10} {:<10}",
            p.id,
            truncate(&p.sku, 10),
            truncate(&p.name, 25),
            truncate(&p.category, 15),
            p.current_stock,
            p.min_stock,
            format_cents(p.price_cents),
            p.status().as_str()
        );
    }
}

fn print_product(product: &Product) {
    println!("Product #{}", product.id);
    println!("  SKU:       {}", product.sku);
    println!("  Name:      {}", product.name);
    println!("  Category:  {}", product.category);
    println!("  Stock:     {}", product.current_stock);
    println!("  Min stock: {}", product.min_stock);
    println!("  Price:     {}", format_cents(product.price_cents));
    println!("  Value:     {}", format_cents(product.stock_value()));
    println!("  Status:    {}", product.status());
}

fn print_movements_table(movements: &[Movement]) {
    println!(
        "{:>14} {:<16} {:<10} {:<20} {:<8} {:>8} {:<10} {:<25}",
        "ID", "DATE", "SKU", "PRODUCT", "TYPE", "QTY", "USER", "REFERENCE"
    );
    println!("{}", "-".repeat(118));
    for m in movements {
        println!(
            "{:>14} {:<16} {:<10} {:<20} {:<8} {:>8} {:<10} {:<25}",
            m.id,
            m.timestamp.format("%Y-%m-%d %H:%M"),
            truncate(&m.product_sku, 10),
            truncate(&m.product_name, 20),
            m.movement_type.as_str(),
            format!("{:+}", m.quantity),
            truncate(&m.user, 10),
            truncate(&m.reference, 25)
        );
    }
}

fn print_movement(movement: &Movement) {
    println!("Movement #{}", movement.id);
    println!("  Date:      {}", movement.timestamp.format("%Y-%m-%d %H:%M:%S"));
    println!("  Product:   {} - {}", movement.product_sku, movement.product_name);
    println!("  Type:      {}", movement.movement_type);
    println!("  Quantity:  {:+}", movement.quantity);
    println!("  User:      {}", movement.user);
    println!("  Reference: {}", movement.reference);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn parse_date(date_str: &str) -> Result<DateTime<Utc>> {
    let naive_date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")?;

    let naive_datetime = naive_date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;

    Ok(naive_datetime.and_utc())
}

/// Last nanosecond of the given day, for inclusive upper bounds.
fn parse_end_of_day(date_str: &str) -> Result<DateTime<Utc>> {
    let naive_date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")?;

    let naive_datetime = naive_date
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;

    Ok(naive_datetime.and_utc())
}

fn parse_date_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let now = Utc::now();

    let to_date = match to {
        Some(date_str) => parse_end_of_day(date_str)?,
        None => now,
    };

    let from_date = match from {
        Some(date_str) => parse_date(date_str)?,
        None => now
            .date_naive()
            .with_day(1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| anyhow::anyhow!("Invalid start of month"))?
            .and_utc(),
    };

    Ok((from_date, to_date))
}
