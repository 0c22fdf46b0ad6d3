pub mod portfolio;
pub mod price;
pub mod report;
pub mod rows;
pub mod settings;
pub mod ticker;
pub mod validation;
