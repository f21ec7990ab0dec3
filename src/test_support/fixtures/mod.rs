pub mod principals;
pub mod records;
pub mod roster;
