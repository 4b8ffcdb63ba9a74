use std::ops::RangeInclusive;

use chrono::{Duration, NaiveDate};
use shared::{
    domain::{format_float, Number},
    protocol::Element,
};

use super::Ui;

const DATE_FORMAT: &str = "%Y-%m-%d";
const RANGE_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

fn input(kind: &str, id: &str, label: &str) -> Element {
    Element::new(kind).with("id", id).with("label", label)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

impl Ui<'_> {
    /// True exactly once per press.
    pub fn button(&mut self, id: &str, text: &str) -> bool {
        self.add(Element::new("button").with("id", id).with("text", text));
        self.take_action(id)
    }

    pub fn text_input(&mut self, id: &str, label: &str, default: &str) -> String {
        let value = self.text_value(id, default);
        self.add(input("text_input", id, label).with("value", value.clone()));
        value
    }

    pub fn password_input(&mut self, id: &str, label: &str, default: &str) -> String {
        let value = self.text_value(id, default);
        self.add(input("password_input", id, label).with("value", value.clone()));
        value
    }

    pub fn textarea(&mut self, id: &str, label: &str, default: &str, rows: u32) -> String {
        let value = self.text_value(id, default);
        self.add(
            input("textarea", id, label)
                .with("value", value.clone())
                .with("rows", rows),
        );
        value
    }

    /// The stored text decides the variant: a `.` reads as a float.
    pub fn number_input(&mut self, id: &str, label: &str, default: Number) -> Number {
        let text = self
            .stored(id)
            .map(|value| value.as_text())
            .unwrap_or_else(|| default.to_string());
        self.add(input("number_input", id, label).with("value", text.clone()));
        Number::from_text(&text)
    }

    pub fn slider(
        &mut self,
        id: &str,
        label: &str,
        range: RangeInclusive<f64>,
        step: f64,
        default: Option<f64>,
    ) -> f64 {
        let fallback = default.unwrap_or(*range.start());
        let value = self
            .stored(id)
            .map(|value| value.as_f64())
            .unwrap_or(fallback);
        self.add(
            input("slider", id, label)
                .with("value", format_float(value))
                .with("min", *range.start())
                .with("max", *range.end())
                .with("step", step),
        );
        value
    }

    pub fn checkbox(&mut self, id: &str, label: &str) -> bool {
        self.toggle(id, label, false)
    }

    fn toggle(&mut self, id: &str, label: &str, default: bool) -> bool {
        let checked = self.stored(id).map_or(default, |value| value.as_bool());
        self.add(input("checkbox", id, label).with("value", checked));
        checked
    }

    /// Falls back to the first option; empty `options` yields an empty string.
    pub fn selectbox<O: AsRef<str>>(&mut self, id: &str, label: &str, options: &[O]) -> String {
        let options: Vec<String> = options.iter().map(|o| o.as_ref().to_string()).collect();
        let fallback = options.first().cloned().unwrap_or_default();
        let value = self.text_value(id, &fallback);
        self.add(
            input("selectbox", id, label)
                .with("value", value.clone())
                .with("options", options),
        );
        value
    }

    pub fn multi_select<O: AsRef<str>>(
        &mut self,
        id: &str,
        label: &str,
        options: &[O],
        default: &[O],
    ) -> Vec<String> {
        let options: Vec<String> = options.iter().map(|o| o.as_ref().to_string()).collect();
        let selection = match self.stored(id) {
            Some(value) => value.as_list(),
            None => default.iter().map(|o| o.as_ref().to_string()).collect(),
        };
        self.add(
            input("multi_select", id, label)
                .with("value", selection.clone())
                .with("options", options),
        );
        selection
    }

    pub fn radio_group<O: AsRef<str>>(
        &mut self,
        id: &str,
        label: &str,
        options: &[O],
        default: Option<&str>,
    ) -> String {
        let options: Vec<String> = options.iter().map(|o| o.as_ref().to_string()).collect();
        let fallback = default
            .map(str::to_string)
            .or_else(|| options.first().cloned())
            .unwrap_or_default();
        let value = self.text_value(id, &fallback);
        self.add(
            input("radio_group", id, label)
                .with("value", value.clone())
                .with("options", options),
        );
        value
    }

    /// Unparsable stored text falls back to the default, which is
    /// [`Ui::today`] unless given.
    pub fn date_input(&mut self, id: &str, label: &str, default: Option<NaiveDate>) -> NaiveDate {
        let fallback = default.unwrap_or(self.today());
        let text = self.text_value(id, &format_date(fallback));
        self.add(input("date_input", id, label).with("value", text.clone()));
        parse_date(&text).unwrap_or(fallback)
    }

    /// Stored as `"start - end"`. Halves that fail to parse are dropped. The
    /// default spans the week from [`Ui::today`].
    pub fn date_range_picker(
        &mut self,
        id: &str,
        label: &str,
        default: Option<(NaiveDate, NaiveDate)>,
    ) -> Vec<NaiveDate> {
        let (start, end) = default.unwrap_or_else(|| {
            let today = self.today();
            (today, today + Duration::days(7))
        });
        let fallback = format!("{}{RANGE_SEPARATOR}{}", format_date(start), format_date(end));
        let text = self.text_value(id, &fallback);
        self.add(input("date_range_picker", id, label).with("value", text.clone()));
        text.split(RANGE_SEPARATOR).filter_map(parse_date).collect()
    }

    /// A checkbox followed by a `theme_setter` the client applies to the page.
    /// `initial` applies until the user flips the checkbox.
    pub fn theme_toggle(&mut self, id: &str, label: &str, initial: Theme) -> Theme {
        let theme = if self.toggle(id, label, initial == Theme::Dark) {
            Theme::Dark
        } else {
            Theme::Light
        };
        self.add(Element::new("theme_setter").with("theme", theme.as_str()));
        theme
    }

    fn text_value(&self, id: &str, default: &str) -> String {
        self.stored(id)
            .map(|value| value.as_text())
            .unwrap_or_else(|| default.to_string())
    }
}
