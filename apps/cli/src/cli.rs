//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gomarket_core::Product;

/// Inspect and edit the GoMarketplace cart stored on this device.
#[derive(Debug, Parser)]
#[command(name = "gomarket", version, about)]
pub struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database file, overriding config and environment.
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the cart.
    Show,

    /// Add a product (or bump its quantity if already in the cart).
    Add(AddArgs),

    /// Increase a product's quantity by one.
    Increment {
        /// Product id.
        id: String,
    },

    /// Decrease a product's quantity by one, removing it at zero.
    Decrement {
        /// Product id.
        id: String,
    },

    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// Product id.
    #[arg(long)]
    pub id: String,

    /// Display title.
    #[arg(long)]
    pub title: String,

    /// Image location.
    #[arg(long, default_value = "")]
    pub image_url: String,

    /// Unit price.
    #[arg(long, allow_hyphen_values = true)]
    pub price: f64,
}

impl From<&AddArgs> for Product {
    fn from(args: &AddArgs) -> Self {
        Product::new(
            args.id.clone(),
            args.title.clone(),
            args.image_url.clone(),
            args.price,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "gomarket", "--pretty", "add", "--id", "a", "--title", "T", "--image-url", "u",
            "--price", "10",
        ])
        .unwrap();

        assert!(cli.pretty);
        match cli.command {
            Command::Add(args) => {
                assert_eq!(Product::from(&args), Product::new("a", "T", "u", 10.0));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_db_after_subcommand() {
        let cli = Cli::try_parse_from(["gomarket", "increment", "a", "--db", "/tmp/c.db"]).unwrap();

        assert_eq!(cli.db, Some(PathBuf::from("/tmp/c.db")));
        assert!(matches!(cli.command, Command::Increment { ref id } if id == "a"));
    }

    #[test]
    fn test_negative_price_reaches_validation() {
        let cli = Cli::try_parse_from([
            "gomarket", "add", "--id", "a", "--title", "T", "--price", "-1",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Add(ref args) if args.price == -1.0));
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["gomarket"]).is_err());
    }
}
