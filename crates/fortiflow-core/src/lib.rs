//! fortiflow core
//!
//! Everything that does not talk to a device:
//!
//! - [`schema`]: declarative field/block model for FortiOS objects
//! - [`data`]: [`ResourceData`], the per-resource attribute bag
//! - [`transform`]: the generic flatten/expand engine
//! - [`helpers`]: mask/CIDR conversion, int coercion, table sorting
//! - [`parser`]: `fortiflow.kdl` desired-state parser
//!
//! FortiOS names fields with hyphens (`ssh-kex-algo`) while the schema uses
//! underscores (`ssh_kex_algo`). Expanding turns schema values into the map
//! the REST API expects; flattening goes the other way.

pub mod data;
pub mod error;
pub mod helpers;
pub mod model;
pub mod parser;
pub mod schema;
pub mod transform;

pub use data::{ResourceData, is_set};
pub use error::{CoreError, Result};
pub use model::{DesiredState, ProviderBlock, ResourceConfig};
pub use parser::{parse_kdl_file, parse_kdl_string};
pub use schema::{Block, Diagnostic, Field, FieldKind, Validator, ValueFormat};
pub use transform::{FlattenOptions, expand_object, flatten_object, refresh};
