//! # Seed Data Generator
//!
//! Populates the database with a sample catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default catalog
//! cargo run -p circ-db --bin seed
//!
//! # Cap the number of titles
//! cargo run -p circ-db --bin seed -- --count 40
//!
//! # Specify database path
//! cargo run -p circ-db --bin seed -- --db ./data/circ.db
//! ```
//!
//! ## Generated Data
//! - Catalog items across fiction, non-fiction, reference and periodicals,
//!   with 1-8 copies each
//! - A handful of registered borrowers
//! - A default `admin` staff account (password `admin`, change it)

use std::env;

use circ_core::Role;
use circ_db::{Database, DbConfig};
use tracing_subscriber::EnvFilter;

/// (category, titles with authors) for realistic catalog data
const CATALOG: &[(&str, &[(&str, &str)])] = &[
    (
        "Fiction",
        &[
            ("The Remains of the Day", "Kazuo Ishiguro"),
            ("Beloved", "Toni Morrison"),
            ("One Hundred Years of Solitude", "Gabriel Garcia Marquez"),
            ("The Left Hand of Darkness", "Ursula K. Le Guin"),
            ("Things Fall Apart", "Chinua Achebe"),
            ("Snow Country", "Yasunari Kawabata"),
            ("My Brilliant Friend", "Elena Ferrante"),
            ("Kafka on the Shore", "Haruki Murakami"),
            ("Middlemarch", "George Eliot"),
            ("Invisible Cities", "Italo Calvino"),
        ],
    ),
    (
        "Non-fiction",
        &[
            ("The Making of the Atomic Bomb", "Richard Rhodes"),
            ("A Short History of Nearly Everything", "Bill Bryson"),
            ("The Emperor of All Maladies", "Siddhartha Mukherjee"),
            ("Thinking, Fast and Slow", "Daniel Kahneman"),
            ("The Silk Roads", "Peter Frankopan"),
            ("Guns, Germs, and Steel", "Jared Diamond"),
            ("The Sixth Extinction", "Elizabeth Kolbert"),
            ("Sapiens", "Yuval Noah Harari"),
        ],
    ),
    (
        "Reference",
        &[
            ("Oxford English Dictionary, Compact Edition", "Oxford University Press"),
            ("The Chicago Manual of Style", "University of Chicago Press"),
            ("Gray's Anatomy", "Henry Gray"),
            ("CRC Handbook of Chemistry and Physics", "CRC Press"),
        ],
    ),
    (
        "Periodical",
        &[
            ("National Geographic, Bound Volume 2025", "National Geographic Society"),
            ("The Economist, Bound Volume 2025", "The Economist Group"),
        ],
    ),
];

/// (name, email, phone) for sample borrowers
const BORROWERS: &[(&str, &str, Option<&str>)] = &[
    ("Alice Okafor", "alice.okafor@example.com", Some("555-0101")),
    ("Bob Lindqvist", "bob.lindqvist@example.com", None),
    ("Carol Mendes", "carol.mendes@example.com", Some("555-0144")),
    ("Dmitri Ivanov", "dmitri.ivanov@example.com", None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path = String::from("./circ_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(usize::MAX);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Circulation Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Cap the number of titles (default: full catalog)");
                println!("  -d, --db <PATH>    Database file path (default: ./circ_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Circulation Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("* Connected to database");
    println!("* Migrations applied");

    // Check existing items
    let existing = db.items().count().await?;
    if existing > 0 {
        println!("! Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    println!();
    println!("Seeding catalog...");

    let mut seeded = 0;
    'outer: for (category, titles) in CATALOG {
        for (idx, (title, author)) in titles.iter().enumerate() {
            if seeded >= count {
                break 'outer;
            }

            // 1-8 copies, deterministic per position
            let stock = 1 + ((idx * 3 + seeded) % 8) as i64;

            let item = db.items().create(title, author, category, stock).await?;
            println!("  {} x{}  {}", item.id, stock, title);
            seeded += 1;
        }
    }

    println!("* Seeded {} items", seeded);

    // Borrowers
    println!();
    println!("Registering borrowers...");
    for (name, email, phone) in BORROWERS {
        db.borrowers().create(name, email, *phone).await?;
        println!("  {}", name);
    }

    // Default staff account
    println!();
    println!("Creating default admin account...");
    db.accounts().create("admin", "admin", Role::Admin).await?;
    println!("  admin / admin (change this password)");

    println!();
    println!("* Seed complete!");

    Ok(())
}
