//! Presentation helpers: label humanization, choices, array moves.
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z\d])([A-Z]+)").expect("valid regex"));
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").expect("valid regex"));
static ID_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"_id$").expect("valid regex"));

/// `firstName`, `first-name`, `first name` → `first_name`
pub fn underscored(s: &str) -> String {
    let s = CAMEL_BOUNDARY.replace_all(s.trim(), "${1}_${2}");
    SEPARATORS.replace_all(&s, "_").to_lowercase()
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `userId` → `User`, `first_name` → `First name`
pub fn humanize(s: &str) -> String {
    let underscored = underscored(s);
    capitalize(&ID_SUFFIX.replace(&underscored, "").replace('_', " "))
}

// ------------------------------- Choices --------------------------------- //

/// One `<option>` / radio button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub text: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self { value: value.into(), text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceOrder {
    Asc,
    Desc,
}

/// Choices of an enumeration map. Declaration order unless `order` is given;
/// `empty` always goes first.
pub fn choices(values: &IndexMap<String, String>, order: Option<ChoiceOrder>, empty: Option<&Choice>) -> Vec<Choice> {
    let mut out: Vec<Choice> = values.iter().map(|(v, t)| Choice::new(v, t)).collect();
    match order {
        Some(ChoiceOrder::Asc) => out.sort_by(|a, b| a.text.cmp(&b.text)),
        Some(ChoiceOrder::Desc) => out.sort_by(|a, b| b.text.cmp(&a.text)),
        None => {}
    }
    if let Some(empty) = empty {
        out.insert(0, empty.clone());
    }
    out
}

// ---------------------------- Array moves -------------------------------- //

pub fn remove<T: Clone>(xs: &[T], index: usize) -> Vec<T> {
    let mut out = xs.to_vec();
    if index < out.len() {
        out.remove(index);
    }
    out
}

pub fn move_item<T: Clone>(xs: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = xs.to_vec();
    if from == to || from >= out.len() || to >= out.len() {
        return out;
    }
    let element = out.remove(from);
    out.insert(to, element);
    out
}

pub fn move_up<T: Clone>(xs: &[T], i: usize) -> Vec<T> {
    if i == 0 { xs.to_vec() } else { move_item(xs, i, i - 1) }
}

pub fn move_down<T: Clone>(xs: &[T], i: usize) -> Vec<T> {
    move_item(xs, i, i + 1)
}
