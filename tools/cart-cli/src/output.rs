//! Output formatting for the CLI.

use console::style;
use turbo_cart::Cart;

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            let body = serde_json::json!({ "error": msg });
            eprintln!("{}", body);
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a table row.
    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", col, width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Print the cart as a table, or as JSON in JSON mode.
    pub fn cart(&self, cart: &Cart) {
        if self.json {
            self.json(cart);
            return;
        }

        if cart.is_empty() {
            self.info("Cart is empty.");
            return;
        }

        let rows: Vec<[String; 4]> = cart
            .items()
            .iter()
            .map(|item| {
                [
                    item.id.to_string(),
                    item.title.clone(),
                    format!("{:.2}", item.price),
                    item.quantity.to_string(),
                ]
            })
            .collect();

        let header = ["ID", "TITLE", "PRICE", "QTY"];
        let mut widths = header.map(str::len);
        for row in &rows {
            for (width, col) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(col.chars().count());
            }
        }

        self.table_row(&header, &widths);
        for row in &rows {
            let cols: Vec<&str> = row.iter().map(String::as_str).collect();
            self.table_row(&cols, &widths);
        }
        println!(
            "\n  {} line(s), {} item(s)",
            style(cart.len()).bold(),
            style(cart.item_count()).bold()
        );
    }

    /// Check if verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}
