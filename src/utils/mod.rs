pub mod dates;
pub mod jalali;
pub mod validation;
