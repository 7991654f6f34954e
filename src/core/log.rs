use crate::db::log::{LogRow, load_log};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::table::strip_ansi;
use ansi_term::Colour;

const OP_MAX: usize = 60;

/// ANSI colour for an audit operation.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "toil_add" | "hours_add" => Colour::Green,
        "toil_del" | "hours_del" => Colour::Red,
        "toil_submit" | "timesheet_submit" => Colour::Cyan,
        "toil_approve" | "timesheet_approve" => Colour::Blue,
        "toil_reject" | "timesheet_reject" | "toil_cancel" => Colour::Yellow,
        "toil_settings" | "toil_recalc" | "user_add" => Colour::RGB(255, 153, 51),
        "migration_applied" | "init" => Colour::Purple,
        _ => Colour::White,
    }
}

/// Operation plus target, the operation word coloured, cut to `OP_MAX` visible chars.
fn op_label(row: &LogRow) -> String {
    let plain = if row.target.is_empty() {
        row.operation.clone()
    } else {
        format!("{} ({})", row.operation, row.target)
    };

    let visible = if plain.chars().count() > OP_MAX {
        let mut s: String = plain.chars().take(OP_MAX - 3).collect();
        s.push_str("...");
        s
    } else {
        plain
    };

    let color = color_for_operation(&row.operation);
    match visible.split_once(' ') {
        Some((op, rest)) => format!("{} {}", color.paint(op), rest),
        None => color.paint(visible.as_str()).to_string(),
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(pool: &DbPool) -> AppResult<()> {
        let rows = pool.run(load_log)?;
        if rows.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let labels: Vec<String> = rows.iter().map(op_label).collect();
        let dates: Vec<String> = rows
            .iter()
            .map(|r| {
                chrono::DateTime::parse_from_rfc3339(&r.date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or_else(|_| r.date.clone())
            })
            .collect();

        let op_w = labels
            .iter()
            .map(|l| strip_ansi(l).chars().count())
            .max()
            .unwrap_or(10);
        let id_w = rows.iter().map(|r| r.id.to_string().len()).max().unwrap_or(1);
        let date_w = dates.iter().map(String::len).max().unwrap_or(10);

        println!("📜 Internal log:\n");

        for ((row, label), date) in rows.iter().zip(&labels).zip(&dates) {
            let padding = " ".repeat(op_w.saturating_sub(strip_ansi(label).chars().count()));
            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                row.id, date, label, padding, row.message
            );
        }

        Ok(())
    }
}
