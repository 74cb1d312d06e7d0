pub mod aud_format_convert;
pub mod img_metadata;
pub mod img_resize;
