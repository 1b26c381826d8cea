//! Demo customers, invoices and account loaded when `seed_demo_data` is set

use crate::config::SeedUser;
use crate::core::invoice::{Customer, Invoice};
use chrono::NaiveDate;
use uuid::Uuid;

pub const DEMO_USER_NAME: &str = "User";
pub const DEMO_USER_EMAIL: &str = "user@nextmail.com";

/// Argon2id PHC string of the demo password `123456`
pub const DEMO_USER_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$EBESExQVFhcYGRobHB0eHw$s5PZBErN318Ya8bAONDaPhgS2L+JQXkRiQTzai0asw8";

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("d6e15727-9fe1-4961-8c5b-ea44a9bd81aa", "Evil Rabbit", "evil@rabbit.com"),
    ("3958dc9e-712f-4377-85e9-fec4b6a6442a", "Delba de Oliveira", "delba@oliveira.com"),
    ("3958dc9e-742f-4377-85e9-fec4b6a6442a", "Lee Robinson", "lee@robinson.com"),
    ("76d65c26-f784-44a2-ac19-586678f7c2f2", "Michael Novotny", "michael@novotny.com"),
    ("cc27c14a-0acf-4f4a-a6c9-d45682c144b9", "Amy Burns", "amy@burns.com"),
    ("13d07535-c59e-4157-a011-f8d2ef4e0cbb", "Balazs Orban", "balazs@orban.com"),
];

// (customer index, cents, status, date)
const INVOICES: &[(usize, i64, &str, &str)] = &[
    (0, 15795, "pending", "2022-12-06"),
    (1, 20348, "pending", "2022-11-14"),
    (4, 3040, "paid", "2022-10-29"),
    (3, 44800, "paid", "2023-09-10"),
    (5, 34577, "pending", "2023-08-05"),
    (2, 54246, "pending", "2023-07-16"),
    (0, 666, "pending", "2023-06-27"),
    (3, 32545, "paid", "2023-06-09"),
    (4, 1250, "paid", "2023-06-17"),
    (5, 8546, "paid", "2023-06-07"),
    (1, 500, "paid", "2023-08-19"),
    (5, 8945, "paid", "2023-06-03"),
    (2, 1000, "paid", "2022-06-05"),
];

/// The demo account, `user@nextmail.com` / `123456`
pub fn user() -> SeedUser {
    SeedUser {
        name: DEMO_USER_NAME.to_string(),
        email: DEMO_USER_EMAIL.to_string(),
        password: DEMO_USER_PASSWORD_HASH.to_string(),
    }
}

pub fn customers() -> Vec<Customer> {
    CUSTOMERS
        .iter()
        .map(|(id, name, email)| Customer {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            image_url: format!("/customers/{}.png", name.to_lowercase().replace(' ', "-")),
        })
        .collect()
}

/// Demo invoices with fresh ids
pub fn invoices() -> Vec<Invoice> {
    INVOICES
        .iter()
        .filter_map(|(customer, amount, status, date)| {
            Some(Invoice {
                id: Uuid::new_v4(),
                customer_id: CUSTOMERS.get(*customer)?.0.to_string(),
                amount: *amount,
                status: status.parse().ok()?,
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?,
            })
        })
        .collect()
}
