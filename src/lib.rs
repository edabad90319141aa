//! Headless form engine: a runtime type descriptor drives the construction of
//! a tree of inputs that validate, aggregate and render themselves.
//!
//! ```no_run
//! use struct_form::{Factory, Input, Options, Settings, Ty};
//!
//! let ty = Ty::product("Person", [("name", Ty::str()), ("age", Ty::optional(Ty::int()))]);
//! let settings = Settings::default();
//! let class = Factory::Form.build(&ty, Options::new(), &settings)?;
//! let mut form = class.mount(None);
//! println!("{}", form.render());
//! let value = form.value();
//! # Ok::<(), struct_form::FormError>(())
//! ```
pub mod descriptor;
pub mod error;
pub mod form;
pub mod html;
pub mod input;
pub mod list;
pub mod logging;
pub mod options;
pub mod path_de;
pub mod registry;
pub mod settings;
pub mod ty;
pub mod util;
pub mod validate;

pub use error::FormError;
pub use form::{Auto, FieldOptions, FormOpts};
pub use input::{at_mut, Blueprint, Class, Entry, Input, Outcome};
pub use list::{ListAction, ListOpts};
pub use options::{KindOptions, Label, Options};
pub use registry::{CustomFactory, Entry as RegistryEntry, Factory, Registry};
pub use settings::Settings;
pub use ty::{Kind, Ty};
pub use validate::{validate, Errors, Validation, ValidationError};
