//! form-store - reactive form-state engine
//!
//! Tracks field values, dirtiness, validation errors and suggested
//! corrections for a set of input fields. A presentation layer reads field
//! state, forwards raw input and triggers submit.
//!
//! ```
//! use form_store::{validators, FieldDescriptor, FieldGroup, FormOptions, FormStore};
//!
//! let group = FieldGroup::new()
//!     .field("name", FieldDescriptor::new("").validator(validators::min_length(3)))
//!     .group(
//!         "postalOffice",
//!         FieldGroup::new()
//!             .field("address", FieldDescriptor::new("").validator(validators::required())),
//!     );
//! let mut form = FormStore::new(group, FormOptions::default()).unwrap();
//!
//! form.on_blur("name", "abc").unwrap();
//! form.on_blur("postalOffice.address", "Main St 1").unwrap();
//! assert!(form.submit_with(|values| println!("{values:?}")).is_submitted());
//! ```

pub mod state;

pub use state::*;
