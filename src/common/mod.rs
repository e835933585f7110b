pub mod consts;
pub mod crypt;
