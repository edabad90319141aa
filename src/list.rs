//! Variable-length composite over a sequence type.
//!
//! The list keeps a committed `state` (the last all-rows-valid value) and one
//! mounted row per element. Structural mutations are gated on the current
//! value being valid; `remove` alone falls back to the committed state so an
//! invalid row can always be deleted.
use std::sync::Arc;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::FormError;
use crate::html::{Element, Node};
use crate::input::{group_classes, Blueprint, Class, Input, Outcome};
use crate::options::{expect_kind, render_help, Label, Options};
use crate::registry::Factory;
use crate::settings::Settings;
use crate::ty::Ty;
use crate::util;
use crate::validate::{validate, Errors};

#[derive(Debug, Clone, Default)]
pub struct ListOpts {
    pub disable_add: bool,
    pub disable_remove: bool,
    pub disable_order: bool,
    /// options for every row's input
    pub item: Option<Box<Options>>,
    /// bypasses registry dispatch for the rows
    pub input: Option<Factory>,
}

/// A list button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    Add,
    Remove(usize),
    MoveUp(usize),
    MoveDown(usize),
}

impl ListAction {
    /// From a rendered button's `data-action` / `data-index`.
    pub fn parse(action: &str, index: Option<usize>) -> Option<Self> {
        match (action, index) {
            ("add", _) => Some(ListAction::Add),
            ("remove", Some(i)) => Some(ListAction::Remove(i)),
            ("up", Some(i)) => Some(ListAction::MoveUp(i)),
            ("down", Some(i)) => Some(ListAction::MoveDown(i)),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ListAction::Add => "add",
            ListAction::Remove(_) => "remove",
            ListAction::MoveUp(_) => "up",
            ListAction::MoveDown(_) => "down",
        }
    }
}

#[derive(Debug)]
struct ListSpec {
    ty: Ty,
    label: Option<Label>,
    help: Option<String>,
    group_classes: Vec<String>,
    disable_add: bool,
    disable_remove: bool,
    disable_order: bool,
    item: Class,
    default_value: Vec<Value>,
}

#[derive(Debug)]
struct ListClass(Arc<ListSpec>);

/// List factory. Only sequences, possibly wrapped.
pub fn create_list(ty: &Ty, options: Options, settings: &Settings) -> Result<Class, FormError> {
    Ok(Arc::new(ListClass(list_spec(ty, options, settings)?)))
}

fn list_spec(ty: &Ty, options: Options, settings: &Settings) -> Result<Arc<ListSpec>, FormError> {
    let Some(item_ty) = ty.item() else {
        return Err(FormError::InvalidType { input: "list", expected: "a sequence", actual: ty.name() });
    };
    let Options { value, label, help, group_classes, kind } = options;
    let opts: ListOpts = expect_kind!(kind, List, "list");

    let default_value = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(FormError::InvalidOptions { input: "list", reason: format!("value {other} is not an array") });
        }
    };

    // rows see the bare element type; its wrappers are checked list-wide
    let item_ty = item_ty.strip_wrappers();
    let factory = opts.input.unwrap_or_else(|| settings.inputs.resolve(item_ty));
    debug!(list = %ty.name(), input = factory.name(), "building rows");
    let item = factory.build(item_ty, opts.item.map(|o| *o).unwrap_or_default(), settings)?;

    Ok(Arc::new(ListSpec {
        ty: ty.clone(),
        label,
        help,
        group_classes,
        disable_add: opts.disable_add,
        disable_remove: opts.disable_remove,
        disable_order: opts.disable_order,
        item,
        default_value,
    }))
}

impl ListClass {
    fn instance(&self, initial: Option<&Value>) -> List {
        let spec = Arc::clone(&self.0);
        let state = match initial {
            None => spec.default_value.clone(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => Vec::new(),
        };
        let rows = mount_rows(&spec.item, &state);
        List { spec, state, rows, has_error: false }
    }
}

impl Blueprint for ListClass {
    fn ty(&self) -> &Ty {
        &self.0.ty
    }
    fn mount(&self, initial: Option<&Value>) -> Box<dyn Input> {
        Box::new(self.instance(initial))
    }
}

fn mount_rows(item: &Class, state: &[Value]) -> Vec<Box<dyn Input>> {
    state.iter().map(|v| item.mount(Some(v))).collect()
}

#[derive(Debug)]
pub struct List {
    spec: Arc<ListSpec>,
    state: Vec<Value>,
    /// parallel to `state`
    rows: Vec<Box<dyn Input>>,
    has_error: bool,
}

impl List {
    /// Last committed value.
    pub fn state(&self) -> &[Value] {
        &self.state
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Current rows, if the whole list validates.
    fn valid_items(&mut self) -> Option<Vec<Value>> {
        match self.get_value(0) {
            Outcome::Valid(Value::Array(items)) => Some(items),
            _ => None,
        }
    }

    fn commit(&mut self, action: ListAction, items: Vec<Value>) -> bool {
        debug!(list = %self.spec.ty.name(), action = action.name(), len = items.len(), "list updated");
        self.rows = mount_rows(&self.spec.item, &items);
        self.state = items;
        true
    }

    fn gated(&self, action: ListAction) -> bool {
        warn!(list = %self.spec.ty.name(), action = action.name(), "list is invalid, ignoring");
        false
    }

    /// Append an empty row.
    pub fn add(&mut self) -> bool {
        let action = ListAction::Add;
        match self.valid_items() {
            Some(mut items) => {
                items.push(Value::Null);
                self.commit(action, items)
            }
            None => self.gated(action),
        }
    }

    pub fn remove(&mut self, index: usize) -> bool {
        let action = ListAction::Remove(index);
        let items = match self.valid_items() {
            Some(items) => items,
            None => {
                debug!(list = %self.spec.ty.name(), "list is invalid, removing from the last committed value");
                self.state.clone()
            }
        };
        if index >= items.len() {
            return false;
        }
        self.commit(action, util::remove(&items, index))
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        let action = ListAction::MoveUp(index);
        let Some(items) = self.valid_items() else {
            return self.gated(action);
        };
        if index == 0 || index >= items.len() {
            return false;
        }
        self.commit(action, util::move_up(&items, index))
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        let action = ListAction::MoveDown(index);
        let Some(items) = self.valid_items() else {
            return self.gated(action);
        };
        if index >= items.len().saturating_sub(1) {
            return false;
        }
        self.commit(action, util::move_down(&items, index))
    }

    /// A button press. Presses on suppressed buttons are ignored.
    pub fn apply(&mut self, action: ListAction) -> bool {
        let spec = Arc::clone(&self.spec);
        match action {
            ListAction::Add if !spec.disable_add => self.add(),
            ListAction::Remove(i) if !spec.disable_remove => self.remove(i),
            ListAction::MoveUp(i) if !spec.disable_order => self.move_up(i),
            ListAction::MoveDown(i) if !spec.disable_order => self.move_down(i),
            _ => false,
        }
    }

    fn render_row(&self, index: usize, row: &dyn Input) -> Node {
        let spec = &self.spec;
        let mut buttons = Vec::new();
        if !spec.disable_remove {
            buttons.push(button("remove", Some(index), "Remove"));
        }
        if !spec.disable_order {
            buttons.push(button("up", Some(index), "Up"));
            buttons.push(button("down", Some(index), "Down"));
        }
        let controls = (!buttons.is_empty()).then(|| {
            Element::new("div")
                .class("col-md-5")
                .child(Element::new("div").class("btn-group").children(buttons))
                .into()
        });
        Element::new("div")
            .class("row")
            .child(Element::new("div").class("col-md-7").child(row.render()))
            .opt_child(controls)
            .into()
    }
}

fn button(action: &'static str, index: Option<usize>, text: &str) -> Node {
    let class = match action {
        "up" => "btn btn-default btn-move-up".to_string(),
        "down" => "btn btn-default btn-move-down".to_string(),
        other => format!("btn btn-default btn-{other}"),
    };
    Element::new("button")
        .attr("type", "button")
        .class(class)
        .attr("data-action", action)
        .opt_attr("data-index", index.map(|i| i.to_string()))
        .child(Node::text(text))
        .into()
}

impl Input for List {
    fn ty(&self) -> &Ty {
        &self.spec.ty
    }
    fn has_error(&self) -> bool {
        self.has_error
    }

    fn raw_value(&self) -> Value {
        Value::Array(self.rows.iter().map(|r| r.raw_value()).collect())
    }

    fn get_value(&mut self, depth: usize) -> Outcome {
        let mut errors = Errors::default();
        let mut items = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter_mut().enumerate() {
            match row.get_value(depth + 1) {
                Outcome::Valid(v) => items.push(v),
                Outcome::Invalid(e) => {
                    trace!(row = i, errors = e.len(), "row invalid");
                    errors.extend(e.within(i.to_string()));
                }
                Outcome::Absent => items.push(Value::Null),
            }
        }
        if !errors.is_empty() {
            self.has_error = true;
            return Outcome::failed(errors, depth);
        }
        self.state = items.clone();
        let validation = validate(&Value::Array(items), &self.spec.ty);
        self.has_error = !validation.is_valid();
        Outcome::settle(validation, depth)
    }

    fn child_mut(&mut self, segment: &str) -> Option<&mut (dyn Input + 'static)> {
        let i: usize = segment.parse().ok()?;
        Some(self.rows.get_mut(i)?.as_mut())
    }

    fn act(&mut self, action: ListAction) -> Result<bool, FormError> {
        Ok(self.apply(action))
    }

    fn render(&self) -> Node {
        let spec = &self.spec;
        let rows = self.rows.iter().enumerate().map(|(i, row)| self.render_row(i, row.as_ref()));
        let add = (!spec.disable_add).then(|| {
            Element::new("div")
                .class("row")
                .child(Element::new("div").class("col-md-12").child(button("add", None, "Add")))
                .into()
        });
        Element::new("div")
            .class(group_classes(self.has_error, &spec.group_classes))
            .opt_child(Label::render(spec.label.as_ref()))
            .children(rows)
            .opt_child(add)
            .opt_child(render_help(spec.help.as_deref()))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{at_mut, Entry};
    use crate::options::KindOptions;
    use serde_json::json;

    fn build(ty: &Ty, opts: ListOpts, value: Option<Value>) -> List {
        let mut options = Options::new().kind(KindOptions::List(opts));
        options.value = value;
        ListClass(list_spec(ty, options, &Settings::default()).unwrap()).instance(None)
    }

    fn ints(value: Value) -> List {
        build(&Ty::sequence(Ty::int()), ListOpts::default(), Some(value))
    }

    fn type_into(list: &mut List, index: &str, text: &str) {
        at_mut(list, &[index]).unwrap().enter(Entry::Text(text.into())).unwrap();
    }

    #[test]
    fn round_trip() {
        let mut list = ints(json!([1, 2, 3]));
        assert_eq!(list.value(), Some(json!([1, 2, 3])));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn errors_are_prefixed_with_the_row_index() {
        let mut list = ints(json!([1, 2, 3]));
        type_into(&mut list, "2", "x");
        type_into(&mut list, "0", "y");
        assert_eq!(list.get_value(0), Outcome::Absent);
        assert!(list.has_error());
        let Outcome::Invalid(errors) = list.get_value(1) else { panic!() };
        assert_eq!(errors.paths(), vec!["/0", "/2"]);
    }

    #[test]
    fn add_is_gated_on_validity() {
        let mut list = ints(json!([1]));
        type_into(&mut list, "0", "x");
        assert!(!list.add());
        assert_eq!(list.len(), 1);
        type_into(&mut list, "0", "5");
        assert!(list.add());
        assert_eq!(list.len(), 2);
        assert_eq!(list.state(), &[json!(5), Value::Null]);
        // the new row is empty and Int is required
        assert_eq!(list.value(), None);
    }

    #[test]
    fn remove_falls_back_to_the_committed_state() {
        let mut list = ints(json!([1, 2, 3]));
        type_into(&mut list, "1", "x");
        assert!(list.remove(2));
        // rows were remounted from the committed state, so row 1 is back to 2
        assert_eq!(list.value(), Some(json!([1, 2])));
    }

    #[test]
    fn removing_the_invalid_row_itself() {
        let mut list = ints(json!([1, 2]));
        type_into(&mut list, "1", "x");
        assert!(list.remove(1));
        assert_eq!(list.state(), &[json!(1)]);
        assert_eq!(list.value(), Some(json!([1])));
    }

    #[test]
    fn remove_uses_the_current_value_when_valid() {
        let mut list = ints(json!([1, 2, 3]));
        type_into(&mut list, "0", "9");
        assert!(list.remove(1));
        assert_eq!(list.value(), Some(json!([9, 3])));
        assert!(!list.remove(5));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn moves_are_gated_and_bounded() {
        let mut list = ints(json!([1, 2, 3]));
        assert!(list.move_up(1));
        assert_eq!(list.state(), &[json!(2), json!(1), json!(3)]);
        assert!(list.move_down(0));
        assert_eq!(list.state(), &[json!(1), json!(2), json!(3)]);
        assert!(!list.move_up(0));
        assert!(!list.move_down(2));
        type_into(&mut list, "1", "x");
        assert!(!list.move_up(1));
        assert!(!list.move_down(1));
        assert_eq!(list.raw_value(), json!([1, "x", 3]));
    }

    #[test]
    fn out_of_range_moves_are_no_ops() {
        let mut list = ints(json!([1, 2]));
        assert!(!list.act(ListAction::MoveDown(usize::MAX)).unwrap());
        assert!(!list.act(ListAction::MoveUp(usize::MAX)).unwrap());
        assert_eq!(list.state(), &[json!(1), json!(2)]);
        let mut empty = ints(json!([]));
        assert!(!empty.move_down(0));
    }

    #[test]
    fn rows_are_built_over_the_bare_element_type() {
        let mut list = build(&Ty::sequence(Ty::optional(Ty::str())), ListOpts::default(), Some(json!(["a"])));
        assert!(list.add());
        // the empty row fails as `Str`, so the list cannot grow further
        assert_eq!(at_mut(&mut list, &["1"]).unwrap().ty().name(), "Str");
        assert!(!list.add());
        assert_eq!(list.raw_value(), json!(["a", null]));
    }

    #[test]
    fn element_refinements_are_checked_list_wide() {
        let positive = Ty::refinement("Positive", Ty::int(), |v| v.as_i64().is_some_and(|n| n > 0));
        let mut list = build(&Ty::sequence(positive), ListOpts::default(), Some(json!([1, 2])));
        type_into(&mut list, "1", "-5");
        let Outcome::Invalid(errors) = list.get_value(1) else { panic!() };
        assert_eq!(errors.paths(), vec!["/1"]);
        assert_eq!(errors.as_slice()[0].expected, "Positive");
        assert!(!list.add());
    }

    #[test]
    fn list_level_refinement() {
        let short = Ty::refinement("Pair", Ty::sequence(Ty::int()), |v| v.as_array().is_some_and(|a| a.len() == 2));
        let mut list = build(&short, ListOpts::default(), Some(json!([1])));
        assert_eq!(list.get_value(0), Outcome::Absent);
        assert!(list.has_error());
        // rows were valid, so the state still moved on
        assert_eq!(list.state(), &[json!(1)]);
        assert!(!list.add());
        assert!(list.remove(0));
        assert!(list.is_empty());
    }

    #[test]
    fn rows_of_products_report_nested_paths() {
        let point = Ty::product("Point", [("x", Ty::int()), ("y", Ty::int())]);
        let mut list = build(&Ty::sequence(point), ListOpts::default(), Some(json!([{"x": 1, "y": 2}, {"x": 3, "y": 4}])));
        assert_eq!(list.value(), Some(json!([{"x": 1, "y": 2}, {"x": 3, "y": 4}])));
        at_mut(&mut list, &["1", "y"]).unwrap().enter(Entry::Text("oops".into())).unwrap();
        let Outcome::Invalid(errors) = list.get_value(1) else { panic!() };
        assert_eq!(errors.paths(), vec!["/1/y"]);
    }

    #[test]
    fn rendering_and_button_suppression() {
        let list = ints(json!([1, 2]));
        let node = list.render();
        let buttons = node.find_all(&|e| e.tag == "button");
        assert_eq!(buttons.len(), 7);
        assert_eq!(buttons[3].get_attr("data-action"), Some("remove"));
        assert_eq!(buttons[3].get_attr("data-index"), Some("1"));
        assert_eq!(buttons[6].get_attr("data-action"), Some("add"));
        assert_eq!(buttons[6].get_attr("data-index"), None);

        let opts = ListOpts { disable_add: true, disable_order: true, ..Default::default() };
        let list = build(&Ty::sequence(Ty::int()), opts, Some(json!([1, 2])));
        let node = list.render();
        let actions: Vec<_> = node.find_all(&|e| e.tag == "button").iter().filter_map(|b| b.get_attr("data-action")).collect();
        assert_eq!(actions, vec!["remove", "remove"]);
    }

    #[test]
    fn apply_respects_suppressed_buttons() {
        let opts = ListOpts { disable_add: true, ..Default::default() };
        let mut list = build(&Ty::sequence(Ty::int()), opts, Some(json!([1, 2])));
        assert!(!list.apply(ListAction::Add));
        assert!(list.act(ListAction::parse("down", Some(0)).unwrap()).unwrap());
        assert_eq!(list.state(), &[json!(2), json!(1)]);
        assert_eq!(ListAction::parse("remove", None), None);
    }

    #[test]
    fn construction_errors() {
        let err = create_list(&Ty::str(), Options::new(), &Settings::default()).unwrap_err();
        assert!(matches!(err, FormError::InvalidType { input: "list", .. }));
        let options = Options::new().value(json!({"not": "a list"}));
        let err = create_list(&Ty::sequence(Ty::str()), options, &Settings::default()).unwrap_err();
        assert!(matches!(err, FormError::InvalidOptions { input: "list", .. }));
    }

    #[test]
    fn item_options_and_input_override() {
        let colors = Ty::enumeration("Color", [("r", "Red"), ("g", "Green")]);
        let opts = ListOpts {
            input: Some(Factory::Radio),
            item: Some(Box::new(Options::new().help("pick one"))),
            ..Default::default()
        };
        let mut list = build(&Ty::sequence(colors), opts, Some(json!(["g"])));
        let html = list.render().to_html();
        assert!(html.contains(r#"type="radio""#));
        assert!(html.contains("pick one"));
        assert_eq!(list.value(), Some(json!(["g"])));
    }
}
