pub mod constructor;
pub mod tables;

pub use constructor::{GenerationRequest, PromptConstructor, ResolvedSlots, Slot, Template};
