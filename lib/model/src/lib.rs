mod error;
mod filter;
mod form;
mod parts;
mod term;
mod triple;

pub use error::*;
pub use filter::*;
pub use form::*;
pub use parts::*;
pub use term::*;
pub use triple::*;

// Re-export the XSD vocabulary used for inferred literal datatypes.
pub use oxrdf::vocab::xsd;

/// Namespace root shared by all XSD datatype IRIs.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";
