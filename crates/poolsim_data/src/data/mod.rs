pub mod particle;
pub mod timing;
pub mod vector;
