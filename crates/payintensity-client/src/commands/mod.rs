pub mod codes;
pub mod normalize;
pub mod publish;
