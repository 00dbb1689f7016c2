use chrono::{Duration, NaiveDate};

pub const HEADER: &str = concat!(
    "order_id,order_date,delivery_forecast,delivery_date,",
    "subtotal,discount,total,freight_price,product_price,",
    "is_confirmed,category,subcategory,delivery_service"
);

const CATEGORIES: [&str; 3] = ["books", "toys", "games"];
const SERVICES: [&str; 2] = ["express", "standard"];

/// Deterministic orders CSV spanning `months` consecutive months from January 2023
pub fn sample_orders_csv(months: u32) -> String {
    let mut lines = vec![HEADER.to_string()];
    let mut id = 0;

    for m in 0..months {
        let year = 2023 + (m / 12) as i32;
        let month = m % 12 + 1;
        let per_month = 5 + (m * 3) % 7;

        for j in 0..per_month {
            id += 1;
            let order_date = NaiveDate::from_ymd_opt(year, month, j + 1).unwrap();
            let forecast = order_date + Duration::days(5);
            let delivered = order_date + Duration::days(3 + (j % 5) as i64);

            let price = 50.0 + ((m * 31 + j * 17) % 40) as f64 * 2.5;
            let freight = price / 10.0 + j as f64;
            let subtotal = price + 5.0;
            let confirmed = if j % 6 == 0 { 0 } else { 1 };

            lines.push(format!(
                "O{},{},{},{},{},{},{},{},{},{},{},{}-{},{}",
                id,
                order_date.format("%Y-%m-%d"),
                forecast.format("%Y-%m-%d"),
                delivered.format("%Y-%m-%d"),
                subtotal,
                5.0,
                price,
                freight,
                price,
                confirmed,
                CATEGORIES[(j % 3) as usize],
                CATEGORIES[(j % 3) as usize],
                j % 2,
                SERVICES[((m + j) % 2) as usize],
            ));
        }
    }

    lines.join("\n") + "\n"
}
