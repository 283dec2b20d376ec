use tabled::{
    Table, Tabled,
    settings::{Panel, Style},
};

/// Roster table builder with optional header and footer panels.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl Formatter {
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn build<T: Tabled, I: IntoIterator<Item = T>>(self, rows: I) -> Table {
        let mut table = Table::new(rows);
        if let Some(header) = self.header {
            table.with(Panel::header(header));
        }
        if let Some(footer) = self.footer {
            table.with(Panel::footer(footer));
        }

        table.with(Style::blank());
        table
    }
}
