use product_pricing::{
    CatalogError, CostBreakdown, DataKind, FileFormat, FileRateSource, Numeric, Overrides,
    PricingContext, PricingEngine, PricingSettings, Product, QuotedProduct, RateTable,
    RateTableCache, convert_file, cost_breakdown, lint_catalog, lint_rates, load_products,
    load_rates, save_products_to_csv, save_products_to_json, save_rates_to_csv,
    save_rates_to_json,
};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, value) in row.iter().enumerate() {
            let len = value.chars().count();
            if len > widths[ci] {
                widths[ci] = len;
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &widths, headers.iter().copied());
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        push_row(&mut out, &widths, row.iter().map(String::as_str));
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn push_row<'a>(out: &mut String, widths: &[usize], cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for (ci, cell) in cells.enumerate() {
        out.push(' ');
        out.push_str(cell);
        let pad = widths[ci].saturating_sub(cell.chars().count());
        out.push_str(&" ".repeat(pad));
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
}

fn render_quotes(quotes: &[QuotedProduct]) -> String {
    let rows: Vec<Vec<String>> = quotes
        .iter()
        .map(|q| {
            vec![
                q.position.to_string(),
                q.description.clone(),
                q.packing.clone(),
                q.quote.display(),
            ]
        })
        .collect();
    render_text_table(&["#", "description", "packing", "price"], &rows)
}

fn render_breakdown(breakdown: &CostBreakdown) -> String {
    let rows = vec![
        vec!["material_cost".into(), breakdown.material_cost.to_string()],
        vec!["additional_cost".into(), breakdown.additional_cost.to_string()],
        vec!["manufacturing_cost".into(), breakdown.manufacturing_cost.to_string()],
        vec![
            "manufacturing_multiplier".into(),
            breakdown.manufacturing_multiplier.to_string(),
        ],
        vec!["total_cost".into(), breakdown.total_cost.to_string()],
        vec!["packing_multiplier".into(), breakdown.packing_multiplier.to_string()],
        vec!["package_cost".into(), breakdown.package_cost.to_string()],
        vec!["margin_percent".into(), breakdown.margin_percent.to_string()],
        vec!["final_cost".into(), breakdown.final_cost.to_string()],
        vec!["price".into(), breakdown.price.to_string()],
    ];
    render_text_table(&["step", "value"], &rows)
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Price every product with the current overrides\n  copper <rate>                      Set the copper override (also drives legacy prices)\n  set <material> <rate>              Override a raw material rate\n  unset <material>                   Remove an override\n  overrides                          List active overrides\n  quote <position>                   Show the cost breakdown for one product\n  check                              Report unparsable catalog and rate values\n  load <catalog|rates> <path>        Load a catalog or rate table (json or csv)\n  save <catalog|rates> <json|csv> <path>\n                                     Persist the catalog or rate table\n  convert <products|rates> <to_csv|to_json> <input> [output]\n                                     Convert a document between JSON and CSV\n  quit|exit                          Exit"
    );
}

struct Session {
    products: Vec<Product>,
    rates: RateTableCache,
    overrides: Overrides,
    engine: PricingEngine,
}

impl Session {
    fn from_settings(settings: &PricingSettings) -> Self {
        let products = if settings.catalog_path.exists() {
            load_products(&settings.catalog_path).unwrap_or_else(|err| {
                warn!(path = %settings.catalog_path.display(), %err, "could not load catalog");
                Vec::new()
            })
        } else {
            Vec::new()
        };
        let overrides = settings
            .copper_rate
            .clone()
            .map(Overrides::with_copper)
            .unwrap_or_default();
        Self {
            products,
            rates: RateTableCache::new(FileRateSource::new(settings.rates_path.clone())),
            overrides,
            engine: PricingEngine::new(),
        }
    }

    fn rates(&self) -> Result<Arc<RateTable>, CatalogError> {
        self.rates.get_or_load()
    }

    fn quotes(&self) -> Result<Vec<QuotedProduct>, CatalogError> {
        let rates = self.rates()?;
        let context = PricingContext::new(&rates, &self.overrides);
        Ok(self.engine.quote_catalog(&self.products, &context))
    }

    fn show(&self) {
        match self.quotes() {
            Ok(quotes) => println!("{}", render_quotes(&quotes)),
            Err(e) => println!("Error loading rates: {}", e),
        }
    }
}

fn print_overrides(overrides: &Overrides) {
    if overrides.is_empty() {
        println!("No overrides set.");
        return;
    }
    for (id, rate) in overrides.iter() {
        println!("  {:<16} {}", id, rate);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("product_pricing=info")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = PricingSettings::load().unwrap_or_else(|err| {
        warn!(%err, "falling back to default settings");
        PricingSettings::default()
    });
    let mut session = Session::from_settings(&settings);

    println!("Product Pricing (CLI) - type 'help' for commands\n");
    if !session.products.is_empty() {
        session.show();
    }

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => {
                print_help();
            }
            "quit" | "exit" => break,
            "show" => session.show(),
            "copper" => match parts.next() {
                Some(rate) => {
                    session
                        .overrides
                        .set(Overrides::COPPER, Numeric::from(rate));
                    println!("Copper rate set to {}.", rate);
                    session.show();
                }
                None => println!("Usage: copper <rate>"),
            },
            "set" => match (parts.next(), parts.next()) {
                (Some(material), Some(rate)) => {
                    session.overrides.set(material, Numeric::from(rate));
                    println!("Override {} = {}.", material, rate);
                    session.show();
                }
                _ => println!("Usage: set <material> <rate>"),
            },
            "unset" => match parts.next() {
                Some(material) => match session.overrides.remove(material) {
                    Some(_) => {
                        println!("Override {} removed.", material);
                        session.show();
                    }
                    None => println!("No override for {}.", material),
                },
                None => println!("Usage: unset <material>"),
            },
            "overrides" => print_overrides(&session.overrides),
            "quote" => {
                let position = match parts.next().map(str::parse::<usize>) {
                    Some(Ok(v)) => v,
                    Some(Err(_)) => {
                        println!("Invalid position");
                        continue;
                    }
                    None => {
                        println!("Usage: quote <position>");
                        continue;
                    }
                };
                let Some(product) = position
                    .checked_sub(1)
                    .and_then(|idx| session.products.get(idx))
                else {
                    println!("Product {} not found.", position);
                    continue;
                };
                let rates = match session.rates() {
                    Ok(rates) => rates,
                    Err(e) => {
                        println!("Error loading rates: {}", e);
                        continue;
                    }
                };
                let context = PricingContext::new(&rates, &session.overrides);
                let strategy = session
                    .engine
                    .strategy_for(product)
                    .map(|s| s.name())
                    .unwrap_or("none");
                let quote = session.engine.quote(product, &context);
                println!("{}. {} ({})", position, product.description, product.packing);
                println!("Strategy: {}", strategy);
                println!("Price   : {}", quote.display());
                if let Some(breakdown) = cost_breakdown(product, &rates, &session.overrides) {
                    println!("{}", render_breakdown(&breakdown));
                }
            }
            "check" => {
                let findings = lint_catalog(&session.products);
                for finding in &findings {
                    println!(
                        "  #{} {}: {}",
                        finding.position, finding.description, finding.issue
                    );
                }
                let rate_issues = match session.rates() {
                    Ok(rates) => lint_rates(&rates),
                    Err(e) => {
                        println!("Error loading rates: {}", e);
                        Vec::new()
                    }
                };
                for issue in &rate_issues {
                    println!("  {}", issue);
                }
                if findings.is_empty() && rate_issues.is_empty() {
                    println!("No issues found.");
                }
            }
            "load" => match (parts.next().map(DataKind::parse), parts.next()) {
                (Some(Ok(DataKind::Products)), Some(path)) => match load_products(path) {
                    Ok(products) => {
                        session.products = products;
                        println!("Catalog loaded from {}.", path);
                        session.show();
                    }
                    Err(e) => println!("Error loading catalog: {}", e),
                },
                (Some(Ok(DataKind::Rates)), Some(path)) => match load_rates(path) {
                    Ok(table) => {
                        session.rates.replace(table);
                        println!("Rates loaded from {}.", path);
                        session.show();
                    }
                    Err(e) => println!("Error loading rates: {}", e),
                },
                _ => println!("Usage: load <catalog|rates> <path>"),
            },
            "save" => {
                let kind = parts.next().map(DataKind::parse);
                let format = parts.next().map(FileFormat::parse);
                let path = parts.next();
                let result = match (kind, format, path) {
                    (Some(Ok(DataKind::Products)), Some(Ok(FileFormat::Json)), Some(path)) => {
                        save_products_to_json(&session.products, path)
                    }
                    (Some(Ok(DataKind::Products)), Some(Ok(FileFormat::Csv)), Some(path)) => {
                        save_products_to_csv(&session.products, path)
                    }
                    (Some(Ok(DataKind::Rates)), Some(Ok(format)), Some(path)) => {
                        session.rates().and_then(|rates| match format {
                            FileFormat::Json => save_rates_to_json(&rates, path),
                            FileFormat::Csv => save_rates_to_csv(&rates, path),
                        })
                    }
                    _ => {
                        println!("Usage: save <catalog|rates> <json|csv> <path>");
                        continue;
                    }
                };
                match result {
                    Ok(_) => println!("Saved to {}.", path.unwrap_or_default()),
                    Err(e) => println!("Error saving: {}", e),
                }
            }
            "convert" => {
                let kind = parts.next().map(DataKind::parse);
                let target = parts
                    .next()
                    .map(|t| FileFormat::parse(t.strip_prefix("to_").unwrap_or(t)));
                let input = parts.next();
                let output = parts.next();
                match (kind, target, input) {
                    (Some(Ok(kind)), Some(Ok(target)), Some(input)) => {
                        match convert_file(kind, target, Path::new(input), output.map(Path::new))
                        {
                            Ok(written) => {
                                println!("Converted {} to {}.", input, written.display())
                            }
                            Err(e) => println!("Error converting: {}", e),
                        }
                    }
                    _ => println!(
                        "Usage: convert <products|rates> <to_csv|to_json> <input> [output]"
                    ),
                }
            }
            _ => {
                println!("Unknown command. Type 'help' for commands.");
            }
        }
    }
}
