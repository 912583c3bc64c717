use std::fmt::Display;

/// The one query shape the store depends on: a projection, equality filters
/// and ascending ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQuery {
    pub table: String,
    /// Empty means every column.
    pub select: Vec<String>,
    pub filters: Vec<(String, String)>,
    pub order: Vec<String>,
}

impl TableQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self { table: table.into(), ..Self::default() }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order_by(mut self, column: &str) -> Self {
        self.order.push(column.to_string());
        self
    }

    /// PostgREST query parameters, e.g. `select=a,b`, `col=eq.1`, `order=a.asc,b.asc`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let select = if self.select.is_empty() { "*".to_string() } else { self.select.join(",") };
        let mut params = vec![("select".to_string(), select)];
        params.extend(self.filters.iter().map(|(col, v)| (col.clone(), format!("eq.{v}"))));
        if !self.order.is_empty() {
            let order = self.order.iter().map(|c| format!("{c}.asc")).collect::<Vec<_>>().join(",");
            params.push(("order".to_string(), order));
        }
        params
    }
}
