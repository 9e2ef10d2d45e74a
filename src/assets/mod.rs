pub mod bundle;
pub mod decode;
