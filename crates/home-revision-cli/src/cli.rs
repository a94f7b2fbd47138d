//! Command definitions and dispatch.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use home_revision_core::utils::{format_stock, truncate_string};
use home_revision_core::{
    Config, CredentialStore, KeyringStore, MemoryStore, Notifier, Product, ProductForm, Services,
    Unit,
};

/// Width of the title column in `list`
const TITLE_WIDTH: usize = 28;

#[derive(Parser)]
#[command(name = "home-revision")]
#[command(version)]
#[command(about = "Track household stock against target quantities")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the API base URL from config
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Keep tokens in memory only (nothing touches the keychain)
    #[arg(long, global = true)]
    ephemeral: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the issued tokens
    Login(AuthArgs),

    /// Create an account and log in
    Register(AuthArgs),

    /// Forget stored tokens
    Logout,

    /// Show whether a session is stored
    Status,

    /// List tracked products
    List {
        /// Only show products below their target
        #[arg(long)]
        short: bool,
    },

    /// Add a product
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Current quantity
        #[arg(long, default_value = "0")]
        quantity: String,
        /// Desired quantity
        #[arg(long)]
        target: String,
        /// шт, кг, гр, л, мл (or piece, kg, gram, liter, milliliter)
        #[arg(long, default_value = "шт")]
        unit: Unit,
    },

    /// Change fields of a product; unspecified fields stay as they are
    Edit {
        #[arg(value_name = "ID")]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        unit: Option<Unit>,
    },

    /// Set current and target quantity in one go
    Adjust {
        #[arg(value_name = "ID")]
        id: i64,
        #[arg(value_name = "QUANTITY")]
        quantity: u32,
        #[arg(value_name = "TARGET")]
        target: u32,
    },

    /// Delete a product
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },
}

#[derive(clap::Args)]
struct AuthArgs {
    /// Phone number used as the login
    #[arg(long)]
    phone: Option<String>,

    /// Password (prompted if omitted)
    #[arg(long)]
    password: Option<String>,
}

pub async fn dispatch(cli: Cli, notifier: Notifier) -> Result<()> {
    let mut config = Config::load().context("load config")?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    let store: Arc<dyn CredentialStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(KeyringStore)
    };
    let services = Services::new(&config, store, notifier).context("build API client")?;

    match cli.command {
        Commands::Login(args) => {
            let (phone, password) = prompt_credentials(args)?;
            services.session.login(&phone, &password).await?;
        }
        Commands::Register(args) => {
            let (phone, password) = prompt_credentials(args)?;
            services.session.register(&phone, &password).await?;
            println!("Registered and logged in");
        }
        Commands::Logout => {
            services.logout();
            println!("Logged out");
        }
        Commands::Status => {
            let state = if services.session.is_authenticated() {
                "logged in"
            } else {
                "not logged in"
            };
            println!("{} ({})", state, config.api_base_url);
        }
        Commands::List { short } => {
            let products = services.products.list().await?;
            let shown: Vec<&Product> = products
                .iter()
                .filter(|p| !short || p.is_short())
                .collect();
            print_products(&shown);
        }
        Commands::Add {
            title,
            description,
            quantity,
            target,
            unit,
        } => {
            let form = ProductForm {
                title,
                description,
                quantity,
                target_quantity: target,
                unit,
            };
            services.products.create(&form).await?;
            // The new id is only known after a fresh listing
            services.products.list().await?;
            println!("Added {}", form.title.trim());
        }
        Commands::Edit {
            id,
            title,
            description,
            quantity,
            target,
            unit,
        } => {
            let current = find_product(&services, id).await?;
            let base = ProductForm::from_product(&current);
            let form = ProductForm {
                title: title.unwrap_or(base.title),
                description: description.unwrap_or(base.description),
                quantity: quantity.unwrap_or(base.quantity),
                target_quantity: target.unwrap_or(base.target_quantity),
                unit: unit.unwrap_or(base.unit),
            };
            let edit = form.to_edit()?;
            let updated = services.products.update(id, &edit).await?;
            print_products(&[&updated]);
        }
        Commands::Adjust {
            id,
            quantity,
            target,
        } => {
            find_product(&services, id).await?;
            let updated = services.products.adjust(id, quantity, target).await?;
            print_products(&[&updated]);
        }
        Commands::Delete { id } => {
            services.products.delete(id).await?;
            println!("Deleted product {}", id);
        }
    }
    Ok(())
}

/// Updates diff against the listed product, so load the list first
async fn find_product(services: &Services, id: i64) -> Result<Product> {
    services.products.list().await?;
    services
        .products
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("No product with id {}", id))
}

fn prompt_credentials(args: AuthArgs) -> Result<(String, String)> {
    let phone = match args.phone {
        Some(phone) => phone,
        None => {
            print!("Phone number: ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim().to_string()
        }
    };
    let password = match args.password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };
    if phone.is_empty() || password.is_empty() {
        anyhow::bail!("Phone number and password required");
    }
    Ok((phone, password))
}

fn print_products(products: &[&Product]) {
    if products.is_empty() {
        println!("No products");
        return;
    }
    for p in products {
        let marker = if p.is_short() { "!" } else { " " };
        println!(
            "{:>5} {} {:<width$} {:>12}",
            p.id,
            marker,
            truncate_string(&p.title, TITLE_WIDTH),
            format_stock(p),
            width = TITLE_WIDTH
        );
    }
}
