mod action;
pub mod actions;
mod catalog;

pub use action::*;
pub use catalog::*;

/// Builds a registry pre-loaded with the built-in demo actions (spec §4.1). Real codec /
/// ffmpeg / LLM backed actions are out of scope (spec §1) and would be registered here by
/// the process embedding this crate.
#[must_use]
pub fn default_registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    registry.register(actions::img_metadata::ImgMetadataAction::descriptor());
    registry.register(actions::img_resize::ImgResizeAction::descriptor());
    registry.register(actions::aud_format_convert::AudFormatConvertAction::descriptor());
    registry
}
