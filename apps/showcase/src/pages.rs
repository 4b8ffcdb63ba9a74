use chrono::Datelike;
use engine::{
    ui::{AlertStyle, Theme},
    PageRegistry, Ui,
};
use serde_json::{json, Map, Value};
use shared::domain::{Number, WidgetValue};

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

pub fn registry() -> PageRegistry {
    PageRegistry::new()
        .interactive("/", home)
        .interactive("/dashboard", dashboard)
        .static_page("/about", about)
}

fn nav(ui: &mut Ui<'_>) {
    ui.navbar(|nav| {
        nav.brand("Trellis")
            .link("Home", "/")
            .link("Dashboard", "/dashboard")
            .link("About", "/about");
    });
}

fn home(ui: &mut Ui<'_>) -> anyhow::Result<()> {
    nav(ui);

    ui.sidebar(|ui| {
        ui.heading(4, "Preferences");
        let theme = ui.theme_toggle("dark_mode", "Dark mode", Theme::Light);
        ui.paragraph(&format!("Theme: {}", theme.as_str()));
        Ok(())
    })?;

    ui.heading(1, "Welcome");
    let name = ui.text_input("name", "Your name", "");
    if name.trim().is_empty() {
        ui.paragraph("Type your name to get a greeting.");
    } else {
        ui.alert(&format!("Hello, {}!", name.trim()), AlertStyle::Success);
    }

    ui.divider();
    ui.heading(3, "Counter");
    let count = match ui.value("clicks") {
        Some(WidgetValue::Integer(n)) => *n,
        _ => 0,
    };
    let count = if ui.button("increment", "Add one") {
        ui.set_value("clicks", count + 1);
        count + 1
    } else {
        count
    };
    ui.paragraph(&format!("Clicked {count} times."));

    ui.columns(|cols| {
        cols.column(|ui| {
            ui.form_group("Sign up", |ui| {
                let age = ui.number_input("age", "Age", Number::Integer(18));
                if age.as_f64() < 0.0 {
                    ui.mark_invalid("age", "Age cannot be negative");
                }
                ui.password_input("secret", "Password", "");
                ui.date_input("birthday", "Birthday", None);
                Ok(())
            })
        })?;
        cols.column(|ui| {
            let level = ui.slider("level", "Level", 0.0..=10.0, 0.5, Some(5.0));
            let size = ui.radio_group("size", "Size", &["small", "medium", "large"], None);
            ui.paragraph(&format!("Level {level} at size {size}"));
            ui.textarea("notes", "Notes", "", 4);
            Ok(())
        })
    })?;

    ui.expander("Show details", false, |ui| {
        ui.code("fn main() {\n    println!(\"hi\");\n}", Some("rust"));
        ui.latex(r"e^{i\pi} + 1 = 0");
        Ok(())
    })?;
    Ok(())
}

/// Deterministic pseudo-random series so the cached data looks plausible.
fn sales_series(seed: u64, len: usize) -> Vec<u64> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            100 + (state >> 33) % 900
        })
        .collect()
}

fn dashboard(ui: &mut Ui<'_>) -> anyhow::Result<()> {
    nav(ui);
    ui.heading(1, "Sales dashboard");

    let mut selected = Vec::new();
    ui.sidebar(|ui| {
        selected = ui.multi_select("regions", "Regions", &REGIONS, &REGIONS[..2]);
        Ok(())
    })?;
    let cumulative = ui.checkbox("cumulative", "Cumulative totals");
    let range = ui.date_range_picker("period", "Period", None);
    if let [start, end] = range.as_slice() {
        ui.paragraph(&format!(
            "{} days selected, starting in {}",
            (*end - *start).num_days(),
            start.year()
        ));
    }

    let series: Vec<(String, Vec<u64>)> = ui.memoize("sales", || {
        REGIONS
            .iter()
            .enumerate()
            .map(|(i, region)| (region.to_string(), sales_series(i as u64 + 7, 6)))
            .collect()
    })?;

    let visible: Vec<(String, Vec<u64>)> = series
        .into_iter()
        .filter(|(region, _)| selected.contains(region))
        .map(|(region, values)| {
            if cumulative {
                let totals: Vec<u64> = values
                    .iter()
                    .scan(0u64, |acc, v| {
                        *acc += v;
                        Some(*acc)
                    })
                    .collect();
                (region, totals)
            } else {
                (region, values)
            }
        })
        .collect();

    if visible.is_empty() {
        ui.alert("Pick at least one region.", AlertStyle::Warning);
        return Ok(());
    }

    let months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];
    ui.tabs(&["Chart", "Data"], |ui, active| {
        match active {
            "Chart" => {
                let datasets: Vec<Value> = visible
                    .iter()
                    .map(|(region, values)| json!({ "label": region, "data": values }))
                    .collect();
                ui.chart(
                    "sales_chart",
                    json!({ "labels": months, "datasets": datasets }),
                    json!({ "type": "line", "plugins": { "legend": { "position": "bottom" } } }),
                );
            }
            _ => {
                let columns: Vec<Value> = std::iter::once(json!("Region"))
                    .chain(months.iter().map(|m| json!(m)))
                    .collect();
                let rows: Vec<Map<String, Value>> = visible
                    .iter()
                    .map(|(region, values)| {
                        let mut row = Map::new();
                        row.insert("Region".into(), json!(region));
                        for (month, value) in months.iter().zip(values) {
                            row.insert((*month).into(), json!(value));
                        }
                        row
                    })
                    .collect();
                ui.data_table("sales_table", columns, rows);
            }
        }
        Ok(())
    })?;
    Ok(())
}

fn about(ui: &mut Ui<'_>) -> anyhow::Result<()> {
    nav(ui);
    ui.heading(1, "About");
    ui.paragraph("Pages are plain Rust functions rebuilt on every interaction.");
    ui.table(
        &["Page", "Kind"],
        &[
            vec!["/", "interactive"],
            vec!["/dashboard", "interactive"],
            vec!["/about", "static"],
        ],
    );
    ui.image("https://www.rust-lang.org/logos/rust-logo-128x128.png", Some("Built with Rust"));
    ui.link("Back home", "/");
    Ok(())
}
