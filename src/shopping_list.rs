//! Plain-text rendering of a user's consolidated shopping list.

use chrono::{DateTime, Utc};

use crate::models::CartLine;

const RULE_WIDTH: usize = 40;

pub const EMPTY_SHOPPING_LIST: &str =
    "Your shopping list is empty!\nAdd recipes to your shopping list.";

/// Source of the "Generated" timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingList {
    lines: Vec<CartLine>,
}

impl ShoppingList {
    pub fn new(mut lines: Vec<CartLine>) -> Self {
        // Byte order on UTF-8 matches SQLite's BINARY collation.
        lines.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.measurement_unit.cmp(&b.measurement_unit))
        });
        ShoppingList { lines }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn render(&self, clock: &dyn Clock) -> String {
        if self.is_empty() {
            return EMPTY_SHOPPING_LIST.to_string();
        }
        let rule = "=".repeat(RULE_WIDTH);
        let mut document = format!("SHOPPING LIST\n{rule}\n\n");
        for (index, line) in self.lines.iter().enumerate() {
            document.push_str(&format!(
                "{}. {} - {} {}\n",
                index + 1,
                line.name,
                line.total_amount,
                line.measurement_unit
            ));
        }
        document.push_str(&format!("\n{rule}\n"));
        document.push_str(&format!("Total: {} items\n", self.lines.len()));
        document.push_str(&format!(
            "Generated: {}",
            clock.now().format("%d.%m.%Y %H:%M")
        ));
        document
    }
}
