//! FILENAME: core/table-core/tests/common/mod.rs
//! Test harness and fixtures for table-core integration tests.

#![allow(dead_code)]

use table_core::{
    stock_features, CellValue, ColumnDef, RowData, Table, TableOptions, TableSettings, TableState,
};

/// A record with a fixed shape, read by key path.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub age: f64,
    pub visits: f64,
    pub status: String,
}

impl Person {
    pub fn new(first_name: &str, last_name: &str, age: f64, visits: f64, status: &str) -> Self {
        Person {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age,
            visits,
            status: status.to_string(),
        }
    }
}

impl RowData for Person {
    fn value_at(&self, path: &[String]) -> Result<CellValue, String> {
        match path.first().map(String::as_str) {
            Some("firstName") => Ok(self.first_name.as_str().into()),
            Some("lastName") => Ok(self.last_name.as_str().into()),
            Some("age") => Ok(self.age.into()),
            Some("visits") => Ok(self.visits.into()),
            Some("status") => Ok(self.status.as_str().into()),
            _ => Ok(CellValue::Empty),
        }
    }
}

/// Six people, two statuses.
pub fn people() -> Vec<Person> {
    vec![
        Person::new("Tanner", "Linsley", 33.0, 100.0, "single"),
        Person::new("Kevin", "Vandy", 27.0, 200.0, "complicated"),
        Person::new("Joe", "Dirte", 45.0, 20.0, "single"),
        Person::new("Ann", "Lee", 27.0, 75.0, "complicated"),
        Person::new("Bea", "Moss", 61.0, 5.0, "single"),
        Person::new("Cal", "Ng", 19.0, 140.0, "complicated"),
    ]
}

/// `n` generated people, ages cycling through 18..=77.
pub fn many_people(n: usize) -> Vec<Person> {
    (0..n)
        .map(|i| {
            let status = if i % 3 == 0 { "single" } else { "relationship" };
            Person::new(
                &format!("First{}", i),
                &format!("Last{}", i),
                (18 + i % 60) as f64,
                (i * 7 % 1000) as f64,
                status,
            )
        })
        .collect()
}

/// Name group over first and last name, then the three data columns.
pub fn person_columns() -> Vec<ColumnDef<Person>> {
    vec![
        ColumnDef::group(
            "Name",
            vec![
                ColumnDef::accessor("firstName").header("First Name"),
                ColumnDef::accessor("lastName").header("Last Name"),
            ],
        )
        .id("name"),
        ColumnDef::accessor("age").header("Age"),
        ColumnDef::accessor("visits").header("Visits"),
        ColumnDef::accessor("status").header("Status"),
    ]
}

/// Test harness wrapping a table built with every stock feature.
pub struct TestHarness {
    pub table: Table<Person>,
}

impl TestHarness {
    /// The sample people with every stock feature.
    pub fn new() -> Self {
        Self::with_options(Self::options(people()))
    }

    pub fn with_data(data: Vec<Person>) -> Self {
        Self::with_options(Self::options(data))
    }

    pub fn with_settings(settings: TableSettings) -> Self {
        Self::with_options(Self::options(people()).settings(settings))
    }

    pub fn with_initial_state(state: TableState) -> Self {
        Self::with_options(Self::options(people()).initial_state(state))
    }

    pub fn with_options(options: TableOptions<Person>) -> Self {
        TestHarness {
            table: Table::new(options).expect("table should build"),
        }
    }

    pub fn options(data: Vec<Person>) -> TableOptions<Person> {
        TableOptions::new(person_columns(), data).features(stock_features())
    }

    /// Ids of the final row model's top-level rows.
    pub fn row_ids(&self) -> Vec<String> {
        self.table
            .get_row_model()
            .rows
            .iter()
            .map(|row| row.id.clone())
            .collect()
    }

    /// Values of one column over the final row model's top-level rows.
    pub fn column_values(&self, column_id: &str) -> Vec<CellValue> {
        self.table
            .get_row_model()
            .rows
            .iter()
            .map(|row| row.get_value(&self.table, column_id))
            .collect()
    }

    /// Ids of the visible leaf columns, in display order.
    pub fn visible_column_ids(&self) -> Vec<String> {
        self.table
            .get_visible_leaf_columns()
            .iter()
            .map(|column| column.id.clone())
            .collect()
    }
}
