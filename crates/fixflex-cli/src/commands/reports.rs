//! Report command implementations

use anyhow::{bail, Result};
use chrono::NaiveDate;
use fixflex_core::{trends::MAX_TREND_MONTHS, Session};
use serde_json::json;

use super::{print_json, truncate};

fn range_label(session: &Session) -> String {
    let range = session.range();
    match (range.start, range.end) {
        (Some(start), Some(end)) => format!("{} to {}", start, end),
        _ => "all dates".to_string(),
    }
}

pub fn cmd_summary(session: &Session, json: bool) -> Result<()> {
    let breakdown = session.breakdown();
    let ranked = session.ranked_categories();

    if json {
        return print_json(&json!({
            "range": session.range(),
            "total": breakdown.total(),
            "fixed_total": breakdown.fixed_total,
            "flexible_total": breakdown.flexible_total,
            "categories": ranked,
        }));
    }

    println!();
    println!("📊 Spending Summary");
    println!("   Period: {}", range_label(session));
    println!("   ─────────────────────────────────────────────────────────────");

    if ranked.is_empty() {
        println!("   No spending found in this period.");
        return Ok(());
    }

    let total = breakdown.total();
    let share = |amount: f64| if total > 0.0 { amount / total * 100.0 } else { 0.0 };
    println!("   Total:    ${:.2}", total);
    println!(
        "   Fixed:    ${:.2} ({:.1}%)",
        breakdown.fixed_total,
        share(breakdown.fixed_total)
    );
    println!(
        "   Flexible: ${:.2} ({:.1}%)",
        breakdown.flexible_total,
        share(breakdown.flexible_total)
    );
    println!();
    println!(
        "   {:25} │ {:>10} │ {:>6} │ {:>8}",
        "Category", "Amount", "%", "Kind"
    );
    println!("   ──────────────────────────┼────────────┼────────┼──────────");

    for cat in &ranked {
        println!(
            "   {:25} │ {:>10.2} │ {:>5.1}% │ {:>8}",
            truncate(&cat.name, 25),
            cat.amount,
            cat.percentage,
            cat.kind.as_str()
        );
    }

    Ok(())
}

pub fn cmd_transactions(session: &Session, category: Option<&str>, json: bool) -> Result<()> {
    let rows: Vec<_> = match category {
        Some(name) => session.in_category(name),
        None => session.filtered().into_iter().enumerate().collect(),
    };

    if json {
        let items: Vec<_> = rows
            .iter()
            .map(|(index, tx)| json!({ "index": index, "transaction": tx }))
            .collect();
        return print_json(&items);
    }

    println!();
    match category {
        Some(name) => println!("📋 Transactions in {}", name),
        None => println!("📋 Transactions"),
    }
    println!("   Period: {}", range_label(session));
    println!("   ─────────────────────────────────────────────────────────────");

    if rows.is_empty() {
        println!("   No transactions found.");
        return Ok(());
    }

    println!(
        "   {:>4} │ {:10} │ {:30} │ {:>10} │ {:20}",
        "#", "Date", "Description", "Amount", "Category"
    );
    println!("   ─────┼────────────┼────────────────────────────────┼────────────┼──────────────────────");

    for (index, tx) in &rows {
        println!(
            "   {:>4} │ {:10} │ {:30} │ {:>10.2} │ {:20}",
            index,
            truncate(&tx.transaction_date, 10),
            truncate(&tx.description, 30),
            tx.amount,
            truncate(tx.category(), 20)
        );
        if let Some(memo) = tx.memo.as_deref() {
            println!("        │ \x1b[2m{}\x1b[0m", truncate(memo, 60));
        }
    }

    println!();
    println!("   {} transaction(s)", rows.len());
    Ok(())
}

pub fn cmd_trends(
    session: &Session,
    today: NaiveDate,
    months: Option<u32>,
    json: bool,
) -> Result<()> {
    if let Some(n) = months {
        if n == 0 || n > MAX_TREND_MONTHS {
            bail!("--months must be between 1 and {}", MAX_TREND_MONTHS);
        }
    }
    let report = session.monthly_report(today);
    let shown = match months {
        Some(n) => report.recent(n as usize),
        None => &report.months[..],
    };

    if json {
        return print_json(&json!({
            "months": shown,
            "trends": report.trends,
            "change": report.change,
        }));
    }

    println!();
    println!("📈 Monthly Spending");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:10} │ {:>10} │ {:>10} │ {:>10} │ {:>5}",
        "Month", "Total", "Fixed", "Flexible", "Count"
    );
    println!("   ───────────┼────────────┼────────────┼────────────┼───────");
    for bucket in shown {
        println!(
            "   {:10} │ {:>10.2} │ {:>10.2} │ {:>10.2} │ {:>5}",
            bucket.label,
            bucket.total,
            bucket.fixed_total,
            bucket.flexible_total,
            bucket.transaction_count
        );
    }

    let fmt_change = |change: Option<f64>| match change {
        Some(pct) => format!("{:+.1}%", pct),
        None => "n/a".to_string(),
    };
    println!();
    println!(
        "   vs. previous month: total {}, fixed {}, flexible {}",
        fmt_change(report.change.total),
        fmt_change(report.change.fixed),
        fmt_change(report.change.flexible)
    );

    let increases = report.top_increases(5);
    let decreases = report.top_decreases(5);
    if increases.is_empty() && decreases.is_empty() {
        return Ok(());
    }

    println!();
    println!("   Top Category Changes (vs. Previous Month)");
    for trend in increases.iter().chain(decreases.iter()) {
        let arrow = if trend.percent_change > 0.0 { "▲" } else { "▼" };
        println!(
            "   {} {:25} {:>10.2} → {:>10.2}  ({:+.1}%)",
            arrow,
            truncate(&trend.name, 25),
            trend.previous_month,
            trend.current_month,
            trend.percent_change
        );
    }

    Ok(())
}

pub fn cmd_recurring(session: &Session, today: NaiveDate, json: bool) -> Result<()> {
    let candidates = session.recurring(today);

    if json {
        return print_json(&candidates);
    }

    println!();
    println!("🔁 Recurring Payments");
    println!("   ─────────────────────────────────────────────────────────────");

    if candidates.is_empty() {
        println!("   No recurring payments detected.");
        return Ok(());
    }

    println!(
        "   {:25} │ {:>10} │ {:>5} │ {:10} │ {:20}",
        "Description", "Average", "Count", "Last", "Category"
    );
    println!("   ──────────────────────────┼────────────┼───────┼────────────┼──────────────────────");

    for c in &candidates {
        let marker = if c.amount_consistent { "" } else { " ~" };
        println!(
            "   {:25} │ {:>10.2} │ {:>5} │ {:10} │ {:20}{}",
            truncate(&c.description, 25),
            c.average_amount,
            c.occurrences,
            c.last_date,
            truncate(&c.category, 20),
            marker
        );
    }

    let combined: f64 = candidates.iter().map(|c| c.average_amount).sum();
    println!();
    println!("   Combined average charge: ${:.2}", combined);
    Ok(())
}

pub fn cmd_categories(session: &Session, json: bool) -> Result<()> {
    let categories = session.category_list();

    if json {
        return print_json(&categories);
    }

    println!();
    println!("🏷️  Categories");
    println!("   ─────────────────────────────────────────────────────────────");
    for cat in &categories {
        let amount = session.breakdown().amount_for(&cat.name);
        println!(
            "   {:30} {:>8}  {:>10.2}",
            truncate(&cat.name, 30),
            cat.kind.as_str(),
            amount
        );
    }
    Ok(())
}
