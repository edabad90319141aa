//! Fixed-arity composite over a product type.
//!
//! Every field's input is resolved and built when the form class is built;
//! mounting a form mounts one child per field, in `order`.
use std::sync::Arc;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::FormError;
use crate::html::{Element, Node};
use crate::input::{group_classes, Blueprint, Class, Input, Outcome};
use crate::options::{expect_kind, render_help, Label, Options};
use crate::registry::Factory;
use crate::settings::Settings;
use crate::ty::{Kind, Ty};
use crate::util::{humanize, Choice};
use crate::validate::{validate, Errors};

/// Automatic label / placeholder synthesis for fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Auto {
    None,
    #[default]
    Placeholders,
    Labels,
}

/// Per-field overrides.
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    /// bypasses registry dispatch
    pub input: Option<Factory>,
    pub options: Options,
}

#[derive(Debug, Clone, Default)]
pub struct FormOpts {
    pub auto: Option<Auto>,
    /// permutation of the product's field names
    pub order: Option<Vec<String>>,
    pub fields: IndexMap<String, FieldOptions>,
}

#[derive(Debug)]
struct FieldSpec {
    name: String,
    class: Class,
}

#[derive(Debug)]
struct FormSpec {
    ty: Ty,
    label: Option<Label>,
    help: Option<String>,
    group_classes: Vec<String>,
    fields: Vec<FieldSpec>,
}

#[derive(Debug)]
struct FormClass(Arc<FormSpec>);

/// Form factory. Only products or refinements of them; a form always
/// yields an object, so an optional type is rejected.
pub fn create_form(ty: &Ty, options: Options, settings: &Settings) -> Result<Class, FormError> {
    let Ty::Product { fields: props, .. } = ty.strip_refinements() else {
        return Err(FormError::InvalidType { input: "form", expected: "a product", actual: ty.name() });
    };
    let Options { value, label, help, group_classes, kind } = options;
    let FormOpts { auto, order, mut fields } = expect_kind!(kind, Form, "form");

    let defaults = match &value {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            return Err(FormError::InvalidOptions { input: "form", reason: format!("value {other} is not an object") });
        }
    };
    let order = match order {
        Some(order) => check_order(ty, props, order)?,
        None => props.keys().cloned().collect(),
    };
    if let Some(unknown) = fields.keys().find(|name| !props.contains_key(*name)) {
        return Err(FormError::UnknownField { ty: ty.name(), field: unknown.clone() });
    }
    let auto = auto.unwrap_or_default();

    let mut specs = Vec::with_capacity(order.len());
    for name in order {
        let field_ty = &props[&name];
        let FieldOptions { input, mut options } = fields.shift_remove(&name).unwrap_or_default();
        let factory = input.unwrap_or_else(|| settings.inputs.resolve(field_ty));
        if options.value.is_none() {
            options.value = defaults.and_then(|d| d.get(&name)).cloned();
        }
        let optional = if field_ty.kind() == Kind::Optional { settings.optional_text.as_str() } else { "" };
        apply_auto(&factory, &mut options, &name, optional, auto);
        debug!(form = %ty.name(), field = %name, input = factory.name(), "building field");
        let class = factory.build(field_ty, options, settings)?;
        specs.push(FieldSpec { name, class });
    }

    Ok(Arc::new(FormClass(Arc::new(FormSpec {
        ty: ty.clone(),
        label,
        help,
        group_classes,
        fields: specs,
    }))))
}

fn check_order(ty: &Ty, props: &IndexMap<String, Ty>, order: Vec<String>) -> Result<Vec<String>, FormError> {
    let mut seen = std::collections::HashSet::with_capacity(order.len());
    let is_permutation = order.len() == props.len()
        && order.iter().all(|name| props.contains_key(name) && seen.insert(name.as_str()));
    if is_permutation {
        Ok(order)
    } else {
        Err(FormError::InvalidOrder { ty: ty.name(), order, fields: props.keys().cloned().collect() })
    }
}

/// Fill in what the user left unset, depending on the field's input.
fn apply_auto(factory: &Factory, options: &mut Options, name: &str, optional: &str, auto: Auto) {
    let field_label = || Label::decorated(humanize(name), optional);

    // these never render without a label
    if matches!(factory, Factory::List | Factory::Form | Factory::Checkbox | Factory::Radio) {
        options.label.get_or_insert_with(field_label);
    }

    if let Factory::Form = factory {
        if let Some(form) = options.kind.form_mut() {
            form.auto = Some(auto);
        }
        return;
    }

    match auto {
        Auto::Labels => {
            options.label.get_or_insert_with(field_label);
            if let Factory::Select = factory {
                if let Some(select) = options.kind.select_mut() {
                    select.empty_option.get_or_insert_with(|| Choice::new("", "-"));
                }
            }
        }
        Auto::Placeholders if options.label.is_none() => match factory {
            Factory::Select => {
                if let Some(select) = options.kind.select_mut() {
                    select
                        .empty_option
                        .get_or_insert_with(|| Choice::new("", humanize(&format!("Select your {name}{optional}"))));
                }
            }
            Factory::Textbox => {
                if let Some(textbox) = options.kind.textbox_mut() {
                    textbox.placeholder.get_or_insert_with(|| humanize(&format!("{name}{optional}")));
                }
            }
            _ => {}
        },
        Auto::Placeholders | Auto::None => {}
    }
}

impl Blueprint for FormClass {
    fn ty(&self) -> &Ty {
        &self.0.ty
    }
    fn mount(&self, initial: Option<&Value>) -> Box<dyn Input> {
        let spec = Arc::clone(&self.0);
        let children = spec
            .fields
            .iter()
            .map(|f| f.class.mount(initial.map(|v| v.get(&f.name).unwrap_or(&Value::Null))))
            .collect();
        Box::new(Form { spec, children, has_error: false })
    }
}

#[derive(Debug)]
pub struct Form {
    spec: Arc<FormSpec>,
    /// parallel to `spec.fields`
    children: Vec<Box<dyn Input>>,
    has_error: bool,
}

impl Form {
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.spec.fields.iter().map(|f| f.name.as_str())
    }
}

impl Input for Form {
    fn ty(&self) -> &Ty {
        &self.spec.ty
    }
    fn has_error(&self) -> bool {
        self.has_error
    }

    fn raw_value(&self) -> Value {
        let map: Map<String, Value> = self
            .spec
            .fields
            .iter()
            .zip(&self.children)
            .map(|(f, child)| (f.name.clone(), child.raw_value()))
            .collect();
        Value::Object(map)
    }

    fn get_value(&mut self, depth: usize) -> Outcome {
        let mut errors = Errors::default();
        let mut value = Map::with_capacity(self.children.len());
        for (field, child) in self.spec.fields.iter().zip(self.children.iter_mut()) {
            match child.get_value(depth + 1) {
                Outcome::Valid(v) => {
                    value.insert(field.name.clone(), v);
                }
                Outcome::Invalid(e) => {
                    trace!(field = %field.name, errors = e.len(), "field invalid");
                    errors.extend(e.within(field.name.as_str()));
                }
                Outcome::Absent => {
                    value.insert(field.name.clone(), Value::Null);
                }
            }
        }
        if !errors.is_empty() {
            self.has_error = true;
            return Outcome::failed(errors, depth);
        }
        // second pass: refinements spanning several fields
        let validation = validate(&Value::Object(value), &self.spec.ty);
        self.has_error = !validation.is_valid();
        Outcome::settle(validation, depth)
    }

    fn child_mut(&mut self, segment: &str) -> Option<&mut (dyn Input + 'static)> {
        let i = self.spec.fields.iter().position(|f| f.name == segment)?;
        Some(self.children[i].as_mut())
    }

    fn render(&self) -> Node {
        let spec = &self.spec;
        Element::new("div")
            .class(group_classes(self.has_error, &spec.group_classes))
            .opt_child(Label::render(spec.label.as_ref()))
            .children(self.children.iter().map(|c| c.render()))
            .opt_child(render_help(spec.help.as_deref()))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{at_mut, Entry};
    use crate::input::select::SelectOpts;
    use crate::options::KindOptions;
    use serde_json::json;

    fn person() -> Ty {
        Ty::product("Person", [
            ("name", Ty::str()),
            ("surname", Ty::optional(Ty::str())),
            ("age", Ty::int()),
            ("rememberMe", Ty::bool()),
            ("gender", Ty::optional(Ty::enumeration("Gender", [("M", "Male"), ("F", "Female")]))),
        ])
    }

    fn build(ty: &Ty, form: FormOpts, value: Option<Value>) -> Box<dyn Input> {
        let mut options = Options::new().kind(KindOptions::Form(form));
        options.value = value;
        create_form(ty, options, &Settings::default()).unwrap().mount(None)
    }

    fn enter(input: &mut Box<dyn Input>, path: &[&str], entry: Entry) {
        at_mut(input.as_mut(), path).unwrap().enter(entry).unwrap();
    }

    #[test]
    fn round_trip() {
        let v = json!({"name": "Giulio", "surname": null, "age": 41, "rememberMe": true, "gender": "M"});
        let mut form = build(&person(), FormOpts::default(), Some(v.clone()));
        assert_eq!(form.value(), Some(v));
        assert!(!form.has_error());
    }

    #[test]
    fn errors_keep_field_order() {
        let ty = Ty::product("Abc", [("a", Ty::int()), ("b", Ty::str()), ("c", Ty::int())]);
        let mut form = build(&ty, FormOpts::default(), Some(json!({"a": 1, "b": "ok", "c": 2})));
        enter(&mut form, &["c"], Entry::Text("x".into()));
        enter(&mut form, &["a"], Entry::Text("y".into()));
        let Outcome::Invalid(errors) = form.get_value(1) else { panic!("expected errors") };
        assert_eq!(errors.paths(), vec!["/a", "/c"]);
        assert!(form.has_error());
    }

    #[test]
    fn custom_order_drives_evaluation() {
        let ty = Ty::product("Abc", [("a", Ty::int()), ("b", Ty::int())]);
        let form = FormOpts { order: Some(vec!["b".into(), "a".into()]), ..Default::default() };
        let mut form = build(&ty, form, None);
        let Outcome::Invalid(errors) = form.get_value(1) else { panic!() };
        assert_eq!(errors.paths(), vec!["/b", "/a"]);
    }

    #[test]
    fn depth_contract() {
        let mut form = build(&person(), FormOpts::default(), None);
        assert_eq!(form.get_value(0), Outcome::Absent);
        assert!(form.has_error());
        assert!(matches!(form.get_value(2), Outcome::Invalid(_)));
    }

    #[test]
    fn whole_value_refinement_runs_after_fields() {
        let range = Ty::product("Range", [("min", Ty::int()), ("max", Ty::int())]);
        let ordered = Ty::refinement("OrderedRange", range, |v| v["min"].as_i64() <= v["max"].as_i64());
        let mut form = build(&ordered, FormOpts::default(), Some(json!({"min": 5, "max": 1})));
        assert_eq!(form.get_value(0), Outcome::Absent);
        assert!(form.has_error());
        let Outcome::Invalid(errors) = form.get_value(1) else { panic!() };
        assert_eq!(errors.as_slice()[0].expected, "OrderedRange");
        enter(&mut form, &["max"], Entry::Text("9".into()));
        assert_eq!(form.value(), Some(json!({"min": 5, "max": 9})));
        assert!(!form.has_error());
    }

    #[test]
    fn order_must_be_a_permutation() {
        let ty = Ty::product("Abc", [("a", Ty::int()), ("b", Ty::int())]);
        for order in [vec!["a"], vec!["a", "a"], vec!["a", "z"], vec!["a", "b", "c"]] {
            let opts = FormOpts { order: Some(order.into_iter().map(String::from).collect()), ..Default::default() };
            let err = create_form(&ty, Options::new().kind(KindOptions::Form(opts)), &Settings::default()).unwrap_err();
            assert!(matches!(err, FormError::InvalidOrder { .. }));
        }
    }

    #[test]
    fn construction_errors() {
        let err = create_form(&Ty::str(), Options::new(), &Settings::default()).unwrap_err();
        assert!(matches!(err, FormError::InvalidType { input: "form", .. }));
        let err = create_form(&Ty::optional(person()), Options::new(), &Settings::default()).unwrap_err();
        assert!(matches!(err, FormError::InvalidType { input: "form", .. }));

        let mut fields = IndexMap::new();
        fields.insert("nope".to_string(), FieldOptions::default());
        let opts = FormOpts { fields, ..Default::default() };
        let err = create_form(&person(), Options::new().kind(KindOptions::Form(opts)), &Settings::default()).unwrap_err();
        assert!(matches!(err, FormError::UnknownField { .. }));

        // checkbox options on an enumeration field
        let mut fields = IndexMap::new();
        fields.insert("gender".to_string(), FieldOptions { input: None, options: Options::new().kind(KindOptions::Checkbox) });
        let opts = FormOpts { fields, ..Default::default() };
        let err = create_form(&person(), Options::new().kind(KindOptions::Form(opts)), &Settings::default()).unwrap_err();
        assert!(matches!(err, FormError::OptionsMismatch { .. }));
    }

    #[test]
    fn placeholders_by_default() {
        let form = build(&person(), FormOpts::default(), None);
        let html = form.render().to_html();
        assert!(html.contains(r#"placeholder="Name""#));
        assert!(html.contains(r#"placeholder="Surname (optional)""#));
        assert!(html.contains(r#"<option value="" selected>Select your gender (optional)</option>"#));
        // checkboxes always get a label
        assert!(html.contains("Remember me"));
    }

    #[test]
    fn labels_mode() {
        let form = build(&person(), FormOpts { auto: Some(Auto::Labels), ..Default::default() }, None);
        let html = form.render().to_html();
        assert!(!html.contains("placeholder"));
        assert!(html.contains(r#"<span>Surname<small class="text-muted"> (optional)</small></span>"#));
        assert!(html.contains(r#"<option value="" selected>-</option>"#));
    }

    #[test]
    fn none_mode_and_user_overrides() {
        let mut fields = IndexMap::new();
        fields.insert(
            "gender".to_string(),
            FieldOptions {
                input: Some(Factory::Radio),
                options: Options::new().label("Sex"),
            },
        );
        fields.insert(
            "name".to_string(),
            FieldOptions { input: None, options: Options::new().value(json!("Override")) },
        );
        let opts = FormOpts { auto: Some(Auto::None), fields, ..Default::default() };
        let mut form = build(&person(), opts, Some(json!({"name": "Giulio"})));
        let html = form.render().to_html();
        assert!(!html.contains("placeholder"));
        assert!(html.contains(r#"type="radio""#));
        assert!(html.contains("Sex"));
        let name = at_mut(form.as_mut(), &["name"]).unwrap();
        assert_eq!(name.raw_value(), json!("Override"));
    }

    #[test]
    fn user_empty_option_wins() {
        let mut fields = IndexMap::new();
        let select = SelectOpts { empty_option: Some(Choice::new("", "Pick one")), order: None };
        fields.insert("gender".to_string(), FieldOptions { input: None, options: Options::new().kind(KindOptions::Select(select)) });
        let form = build(&person(), FormOpts { fields, ..Default::default() }, None);
        assert!(form.render().to_html().contains(r#"<option value="" selected>Pick one</option>"#));
    }

    #[test]
    fn nested_forms_inherit_auto_and_report_nested_paths() {
        let address = Ty::product("Address", [("street", Ty::str()), ("zip", Ty::int())]);
        let ty = Ty::product("Customer", [("name", Ty::str()), ("address", address)]);
        let mut form = build(&ty, FormOpts { auto: Some(Auto::Labels), ..Default::default() }, Some(json!({"name": "x", "address": {"street": "Main", "zip": 1}})));
        assert_eq!(form.value(), Some(json!({"name": "x", "address": {"street": "Main", "zip": 1}})));
        let html = form.render().to_html();
        assert!(html.contains("<span>Street</span>"));
        enter(&mut form, &["address", "zip"], Entry::Text("nope".into()));
        let Outcome::Invalid(errors) = form.get_value(1) else { panic!() };
        assert_eq!(errors.paths(), vec!["/address/zip"]);
        assert!(at_mut(form.as_mut(), &["address"]).unwrap().has_error());
    }

    #[test]
    fn not_a_list() {
        let mut form = build(&person(), FormOpts::default(), None);
        assert!(matches!(form.act(crate::list::ListAction::Add), Err(FormError::NotAList(_))));
    }
}
