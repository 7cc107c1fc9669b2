mod document;
pub mod labels;
pub mod model;
