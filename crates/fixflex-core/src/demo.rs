//! Sample data for trying the tracker without a statement

use chrono::{Datelike, NaiveDate};

use crate::models::NewTransaction;

/// (day of month, description, amount, category, memo)
const DEMO_ROWS: &[(u32, &str, f64, &str, &str)] = &[
    (1, "ACME Grocery Store", -85.47, "Food & Dining", "Weekly groceries"),
    (2, "Coffee Shop", -4.50, "Food & Dining", "Morning coffee"),
    (3, "Electricity Company", -124.32, "Bills & Utilities", "Monthly electricity bill"),
    (5, "ACME Apartment Homes", -1350.00, "Home", "Monthly rent"),
    (7, "Local Restaurant", -56.92, "Food & Dining", "Dinner with friends"),
    (10, "Online Retailer", -35.97, "Shopping", "Household items"),
    (12, "Gas Station", -42.50, "Auto & Transport", "Fuel"),
    (15, "Internet Provider", -75.00, "Bills & Utilities", "Monthly internet"),
    (18, "Mobile Phone Company", -89.99, "Bills & Utilities", "Monthly phone bill"),
    (20, "Online Streaming", -14.99, "Entertainment", "Monthly subscription"),
    (22, "Pharmacy", -28.45, "Health & Fitness", "Medication"),
    (25, "Unknown Charge", -19.99, "Uncategorized", "Need to review"),
];

/// Twelve sample transactions dated in the month of `today`
pub fn demo_transactions(today: NaiveDate) -> Vec<NewTransaction> {
    DEMO_ROWS
        .iter()
        .map(|&(day, description, amount, category, memo)| {
            let date = format!("{}/{:02}/{}", today.month(), day, today.year());
            NewTransaction::new(&date, description, amount)
                .with_category(category)
                .with_kind("Sale")
                .with_memo(memo)
        })
        .collect()
}
