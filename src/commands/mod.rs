pub mod check;
pub mod glue;
