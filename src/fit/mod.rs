//! FIT container decoding: message model, profile tables, and the
//! streaming decoder.

pub mod decoder;
pub mod mesg;
pub mod profile;

pub use decoder::{Decoder, MesgHandler};
pub use mesg::{BaseType, Field, FileIdMesg, Mesg, Value};
