use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::{Category, CategoryFilter, OrderStatus, OrderType};

/// Restaurant back-office console
/// Manage the menu, track orders and print table QR codes against the
/// back-office REST API.
#[derive(Parser, Debug)]
#[command(
    name = "dinedesk",
    version = env!("CARGO_PKG_VERSION"),
    about = "Restaurant back-office console: dashboard, menu, orders and table QR codes",
    long_about = None
)]
pub struct Cli {
    /// Back-office API base URL (default: $DINEDESK_API_URL or http://localhost:5000/api)
    #[arg(global = true, long = "api-url")]
    pub api_url: Option<String>,

    /// Directory for the local database and logs (default: $DINEDESK_DATA_DIR)
    #[arg(global = true, long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(global = true, short = 'y', long = "yes")]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an administrator account and sign in
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in as an administrator
    Login {
        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in administrator
    Whoami,

    /// Show version and build information
    Version,

    /// Today's figures, recent orders and popular items
    Dashboard,

    /// Manage menu items (lists items when no action is given)
    Menu {
        #[command(subcommand)]
        action: Option<MenuCommand>,
    },

    /// Track and update orders (lists orders when no action is given)
    Orders {
        #[command(subcommand)]
        action: Option<OrdersCommand>,
    },

    /// Manage tables and their QR codes (lists tables when no action is given)
    Tables {
        #[command(subcommand)]
        action: Option<TablesCommand>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MenuCommand {
    /// List menu items
    List {
        /// All, Starters, "Main Course", Desserts, Drinks or Others
        #[arg(long)]
        category: Option<CategoryFilter>,

        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
    },

    /// Add a menu item
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        price: String,

        #[arg(long, default_value = "Main Course")]
        category: Category,

        #[arg(long, default_value = "")]
        description: String,

        /// Create the item as unavailable
        #[arg(long)]
        unavailable: bool,

        /// Image file (max 5MB)
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Edit a menu item; omitted fields keep their current value
    Edit {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        price: Option<String>,

        #[arg(long)]
        category: Option<Category>,

        #[arg(long)]
        description: Option<String>,

        /// true or false
        #[arg(long)]
        available: Option<bool>,

        /// Replace the image (max 5MB)
        #[arg(long, conflicts_with = "remove_image")]
        image: Option<PathBuf>,

        /// Remove the current image
        #[arg(long)]
        remove_image: bool,
    },

    /// Delete a menu item
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum OrdersCommand {
    /// List orders
    List {
        /// pending, preparing, served, completed, out-for-delivery or delivered
        #[arg(long)]
        status: Option<OrderStatus>,

        /// dine-in or home-delivery
        #[arg(long = "type")]
        order_type: Option<OrderType>,

        /// Show line items and delivery details for one order
        #[arg(long)]
        expand: Option<String>,
    },

    /// Move an order to a new status
    Status { id: String, status: OrderStatus },

    /// Delete an order
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TablesCommand {
    /// List tables
    List,

    /// Create a table and generate its QR code
    Add { table_number: String },

    /// Delete a table
    Delete { id: String },

    /// Show a table's QR code, optionally saving it as a PNG
    Qr {
        id: String,

        /// Directory to save table-<number>-qr.png into
        #[arg(long)]
        download: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_typed_arguments() {
        let cli = Cli::try_parse_from([
            "dinedesk",
            "orders",
            "list",
            "--status",
            "out-for-delivery",
            "--type",
            "delivery",
        ])
        .expect("parse");
        match cli.command {
            Commands::Orders {
                action:
                    Some(OrdersCommand::List {
                        status, order_type, ..
                    }),
            } => {
                assert_eq!(status, Some(OrderStatus::OutForDelivery));
                assert_eq!(order_type, Some(OrderType::HomeDelivery));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn menu_category_accepts_loose_spelling() {
        let cli = Cli::try_parse_from([
            "dinedesk", "--yes", "menu", "add", "--name", "Tea", "--price", "20",
            "--category", "drinks",
        ])
        .expect("parse");
        assert!(cli.yes);
        match cli.command {
            Commands::Menu {
                action: Some(MenuCommand::Add { category, .. }),
            } => assert_eq!(category, Category::Drinks),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(Cli::try_parse_from(["dinedesk", "orders", "status", "o1", "lost"]).is_err());
    }
}
