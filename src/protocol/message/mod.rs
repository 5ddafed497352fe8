//! Concrete message payloads, one submodule per message family.
//!
//! Each type implements [`super::codec::MessageDecode`]/[`super::codec::MessageEncode`]
//! directly against [`super::codec::ProtoReader`]/[`super::codec::ProtoWriter`].

pub mod capabilities;
pub mod crud;
pub mod expect;
pub mod notice;
pub mod ok;
pub mod resultset;
pub mod server_error;
pub mod session;
pub mod sql;

pub use capabilities::*;
pub use crud::*;
pub use expect::*;
pub use notice::*;
pub use ok::*;
pub use resultset::*;
pub use server_error::*;
pub use session::*;
pub use sql::*;
