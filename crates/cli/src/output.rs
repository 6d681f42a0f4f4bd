//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use vyconsole_common::{Toast, ToastVariant};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

fn table<T: TableDisplay>(items: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(T::headers());
    for item in items {
        table.add_row(item.row());
    }
    table
}

fn print_plain<T: TableDisplay>(item: &T) {
    for (header, value) in T::headers().iter().zip(item.row()) {
        println!("{}: {}", header, value);
    }
}

/// Print a single item
pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", table(std::slice::from_ref(item))),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
        }
        OutputFormat::Plain => print_plain(item),
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        _ if items.is_empty() => println!("No items found."),
        OutputFormat::Table => println!("{}", table(items)),
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                print_plain(item);
            }
        }
    }
}

/// Render an optional cell
pub fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    eprintln!("{}", message.dimmed());
}

/// One line per toast, without colour
pub fn toast_line(toast: &Toast) -> String {
    match &toast.description {
        Some(description) => format!("{}: {}", toast.title, description),
        None => toast.title.clone(),
    }
}

/// Print the notifications a command raised.
///
/// Toasts go to stderr so JSON output on stdout stays parseable.
pub fn print_toasts(toasts: &[Toast]) {
    for toast in toasts {
        let line = toast_line(toast);
        match toast.variant {
            ToastVariant::Success => eprintln!("{} {}", "✔".green(), line.green()),
            ToastVariant::Destructive => eprintln!("{} {}", "✖".red(), line.red()),
            ToastVariant::Default => eprintln!("{}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct Row(&'static str, u32);

    impl TableDisplay for Row {
        fn headers() -> Vec<&'static str> {
            vec!["Name", "Rules"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.0.to_string(), self.1.to_string()]
        }
    }

    #[test]
    fn test_table_has_headers_and_rows() {
        let rendered = table(&[Row("WAN_IN", 3), Row("LAN_LOCAL", 0)]).to_string();
        assert!(rendered.contains("Name"));
        assert!(rendered.contains("WAN_IN"));
        assert!(rendered.contains("LAN_LOCAL"));
    }

    #[test]
    fn test_toast_line() {
        let toast = Toast {
            id: Uuid::new_v4(),
            title: "Failed to create chain".into(),
            description: Some("chain exists".into()),
            variant: ToastVariant::Destructive,
        };
        assert_eq!(toast_line(&toast), "Failed to create chain: chain exists");

        let toast = Toast {
            description: None,
            ..toast
        };
        assert_eq!(toast_line(&toast), "Failed to create chain");
    }

    #[test]
    fn test_cell() {
        assert_eq!(cell(&None), "-");
        assert_eq!(cell(&Some("lan".into())), "lan");
    }
}
