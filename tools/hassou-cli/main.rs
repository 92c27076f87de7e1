use clap::{Parser, Subcommand, ValueEnum};
use hassou::condition::EvalContext;
use hassou::prelude::*;
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendCli {
    /// Work-list interpreter; splits fan out to several destinations
    Interpreter,
    /// Compiled if/else program; one destination per order
    Program,
}

/// A flow-graph fulfillment routing engine CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Route an order through a flow
    Route {
        /// Path to the flow JSON file
        flow_path: String,
        /// Path to the order JSON file
        order_path: String,

        /// The routing backend to use
        #[arg(short, long, value_enum, default_value_t = BackendCli::Interpreter)]
        backend: BackendCli,

        /// Stock records: [{"variant_id", "location_id", "stock"}]
        #[arg(long)]
        inventory: Option<String>,

        /// Collection membership: {"collection_id": ["product_id", ...]}
        #[arg(long)]
        catalog: Option<String>,

        /// Split lists for the program backend: {"list_name": ["item_id", ...]}
        #[arg(long)]
        lists: Option<String>,
    },
    /// Generate nested if/else program text from a flow
    Generate {
        /// Path to the flow JSON file
        flow_path: String,

        /// Split lists: {"list_name": ["item_id", ...]}
        #[arg(long)]
        lists: Option<String>,

        /// Also save the compiled program to this path
        #[arg(short, long)]
        out: Option<String>,
    },
    /// Print the binary tree built from a flow
    Tree {
        /// Path to the flow JSON file
        flow_path: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Route {
            flow_path,
            order_path,
            backend,
            inventory,
            catalog,
            lists,
        } => run_route(&flow_path, &order_path, backend, inventory, catalog, lists),
        Command::Generate {
            flow_path,
            lists,
            out,
        } => run_generate(&flow_path, lists, out),
        Command::Tree { flow_path } => {
            let tree = load_tree(&flow_path);
            print!("{}", tree.render());
        }
    }
}

fn run_route(
    flow_path: &str,
    order_path: &str,
    backend: BackendCli,
    inventory_path: Option<String>,
    catalog_path: Option<String>,
    lists_path: Option<String>,
) {
    let total_start = Instant::now();

    let flow = load_flow(flow_path);
    let order = Order::from_file(order_path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to load order from '{}': {}", order_path, e))
    });
    let inventory = inventory_path.map(|path| {
        StaticInventory::from_file(&path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load inventory from '{}': {}", path, e))
        })
    });
    let catalog = catalog_path.map(|path| {
        StaticCatalog::from_file(&path).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to load catalog from '{}': {}", path, e))
        })
    });

    println!(
        "Routing order with {} line item(s) using {:?} backend...",
        order.line_items.len(),
        backend
    );
    let route_start = Instant::now();

    match backend {
        BackendCli::Interpreter => {
            let graph = FlowGraph::load(&flow)
                .unwrap_or_else(|e| exit_with_error(&format!("Invalid flow: {}", e)));
            let mut builder = FlowInterpreter::builder(graph);
            if let Some(inventory) = inventory {
                builder = builder.with_inventory(Arc::new(inventory));
            }
            if let Some(catalog) = catalog {
                builder = builder.with_catalog(Arc::new(catalog));
            }
            let interpreter = builder
                .build()
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to build router: {}", e)));
            let outcome = interpreter
                .run(&order)
                .unwrap_or_else(|e| exit_with_error(&format!("Routing failed: {}", e)));

            println!("\nRouting Finished!");
            if outcome.results.is_empty() {
                println!("  -> No line items reached a fulfill node");
            }
            for result in &outcome.results {
                println!(
                    "  -> {} item(s) to {} via '{}'",
                    result.line_items.len(),
                    result.destination,
                    result.fulfillment_option
                );
                println!("     Route: {}", TraceFormatter::format_route(&result.route));
            }
            for suppressed in &outcome.suppressed {
                println!(
                    "  !! Node {} '{}' counted as false: {}",
                    suppressed.node_id, suppressed.condition, suppressed.error
                );
            }
            println!("\nNodes visited: {}", outcome.steps);
        }
        BackendCli::Program => {
            let tree = BinaryTree::from_flow(&flow)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to build tree: {}", e)));
            let program = CompiledProgram::new(tree, load_lists(lists_path))
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to compile program: {}", e)));
            let ctx = EvalContext {
                inventory: inventory.as_ref().map(|i| i as &dyn InventoryLookup),
                catalog: catalog.as_ref().map(|c| c as &dyn CatalogLookup),
            };
            let run = program.execute(&order, &ctx);

            println!("\nRouting Finished!");
            match &run.terminal {
                Some(terminal) => println!(
                    "  -> Order fulfilled by node {}: {}",
                    terminal.node_id, terminal.label
                ),
                None => println!("  -> No fulfill node reached"),
            }
            for suppressed in &run.suppressed {
                println!(
                    "  !! Node {} '{}' counted as false: {}",
                    suppressed.node_id, suppressed.condition, suppressed.error
                );
            }
        }
    }

    println!("\n--- Performance Summary ---");
    println!("Routing:              {:?}", route_start.elapsed());
    println!("Total Execution:      {:?}", total_start.elapsed());
}

fn run_generate(flow_path: &str, lists_path: Option<String>, out: Option<String>) {
    let tree = load_tree(flow_path);
    let lists = load_lists(lists_path);

    let generated = generate(&tree, &lists);
    print!("{}", generated.text);
    for diagnostic in &generated.diagnostics {
        eprintln!("warning: node {}: {}", diagnostic.node_id, diagnostic.message);
    }

    if let Some(path) = out {
        let program = CompiledProgram::new(tree, lists)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to compile program: {}", e)));
        program
            .save(&path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to save program: {}", e)));
        eprintln!("Compiled program saved to '{}'", path);
    }
}

fn load_flow(path: &str) -> FlowDefinition {
    FlowDocument::from_file(path)
        .and_then(IntoFlow::into_flow)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load flow: {}", e)))
}

fn load_tree(path: &str) -> BinaryTree {
    BinaryTree::from_flow(&load_flow(path))
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to build tree: {}", e)))
}

fn load_lists(path: Option<String>) -> ItemLists {
    let Some(path) = path else {
        return ItemLists::default();
    };
    let json = fs::read_to_string(&path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read lists '{}': {}", path, e)));
    serde_json::from_str(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse lists JSON: {}", e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
