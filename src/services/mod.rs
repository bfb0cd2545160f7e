pub mod authz;
pub mod gallery;
pub mod storage;
