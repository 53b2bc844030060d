pub mod completion;
pub mod prompt_builder;
