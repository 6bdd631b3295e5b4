/// Filesystem collaborators: directory scan, image decoding and crop export
pub mod decoder;
pub mod export;
pub mod scan;
